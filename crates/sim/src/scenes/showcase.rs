//! The instrument showcase: two rows of display tables, an info button above
//! every item, and the mascot asking when the player is ready to practice.

use super::{spawn_scenery, Scene, SceneKind};
use crate::assets::AssetLibrary;
use crate::catalog::{PropDefinition, SHOWCASE_PROPS};
use crate::config::SimConfig;
use crate::dialogue::{DialogueDirector, DialogueStep, SceneRequest, StepKind};
use crate::grab::GrabSystem;
use crate::info_panel::InfoPanel;
use crate::mascot::Mascot;
use crate::overlay::Overlay;
use crate::player::CameraRig;
use crate::props::{spawn_prop, PropNodes};
use crate::targets::ExamSequencer;
use crate::ui::{UiAction, UiButtons};
use engine_core::{BillboardMode, Entity, SceneGraph, Vec3, World};
use physics::PhysicsWorld;

const SHOWCASE_SCRIPT: &[DialogueStep] = &[
    DialogueStep {
        title: "Welcome to the OpenCare showcase!",
        body: "Along the way you'll find the medical instruments used in practice, each with its own information display. Use this chance to observe and get to know every tool on show.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Once you know these instruments, get ready to enter the practice simulation. There you'll be tested on applying what you learned in a situation close to the real thing. If anything is unclear, don't hesitate to ask me!",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Ready to run the simulation?",
        kind: StepKind::Choice {
            ready_text: "Since you're ready for the simulation, let me take you to the examination room!",
            destination: SceneRequest::Exam,
            not_ready_text: Some(
                "Since you're not ready yet, you can't move on to the next room. Take another walk around the showcase; it will help you feel prepared for the simulation!",
            ),
            exit: Some(SceneRequest::Menu),
        },
    },
];

pub fn build(assets: &AssetLibrary, _cfg: &SimConfig) -> Scene {
    let mut world = World::new();
    let mut graph = SceneGraph::new();
    let mut physics = PhysicsWorld::new();
    let mut ui = UiButtons::new();

    physics.add_ground_plane();
    let camera = CameraRig::new(&mut graph, Vec3::new(0.0, 2.0, 0.0));

    spawn_scenery(
        &mut graph,
        assets,
        "showcase_room.glb",
        Vec3::new(0.0, 0.0, 8.0),
        Vec3::new(0.5, 0.5, 0.5),
    );

    // Room bounds and display tables, all invisible static colliders.
    let walls = [
        // left, right, far, entrance
        (Vec3::new(-2.42, 2.5, 10.8), Vec3::new(0.5, 2.5, 10.0)),
        (Vec3::new(3.46, 2.5, 8.0), Vec3::new(0.5, 2.5, 10.0)),
        (Vec3::new(0.0, 2.5, 18.4), Vec3::new(5.0, 2.5, 0.5)),
        (Vec3::new(-2.0, 2.5, -2.3), Vec3::new(5.0, 2.5, 0.5)),
    ];
    for (position, half_extents) in walls {
        physics.add_static_cuboid(position, 0.0, half_extents);
    }
    let tables = [
        (Vec3::new(-1.5, 0.47, 12.0), Vec3::new(0.35, 0.8, 5.0)),
        (Vec3::new(2.5, 0.47, 12.0), Vec3::new(0.35, 0.8, 5.0)),
    ];
    for (position, half_extents) in tables {
        physics.add_static_cuboid(position, 0.0, half_extents);
    }

    // Every catalog item, isolated per prop: one broken asset must not stop
    // the rest of the room from building.
    for def in SHOWCASE_PROPS {
        match spawn_prop(&mut world, &mut graph, &mut physics, assets, def) {
            Ok(entity) => add_info_button(&mut world, &mut graph, &mut ui, entity, def),
            Err(e) => log::warn!("skipping prop {}: {e}", def.id),
        }
    }

    // The mascot follows the player around the room and takes questions.
    let pivot = graph.create_node("mascot_pivot");
    graph.set_local_position(pivot, Vec3::new(-1.6, 0.5, 1.2));
    if let Err(e) = assets.instantiate(&mut graph, pivot, "avatar.glb") {
        log::warn!("mascot model unavailable: {e}");
    }
    ui.add(pivot, "ask", 0.5, UiAction::AskMascot);
    let mascot = Mascot::new(pivot);

    // Info panel plane rides with the camera.
    let mut info_panel = InfoPanel::new();
    if let Ok(panel) = graph.create_child(camera.node, "info_panel") {
        graph.set_local_position(panel, Vec3::new(0.0, 0.0, -1.5));
        graph.set_visible(panel, false);
        info_panel.set_node(panel);
    }

    Scene {
        kind: SceneKind::Showcase,
        world,
        graph,
        physics,
        camera,
        grab: GrabSystem::new(),
        ui,
        overlay: Overlay::new(),
        info_panel,
        dialogue: DialogueDirector::new(SHOWCASE_SCRIPT),
        credits: None,
        mascot: Some(mascot),
        targets: Vec::new(),
        sequencer: ExamSequencer::new(),
        pending: None,
        ticks: 0,
    }
}

/// Float an "i" disc above a prop's wrapper, always facing the camera.
fn add_info_button(
    world: &mut World,
    graph: &mut SceneGraph,
    ui: &mut UiButtons,
    entity: Entity,
    def: &'static PropDefinition,
) {
    let Ok(nodes) = world.get::<&PropNodes>(entity).map(|n| *n) else {
        return;
    };
    let Ok(button) = graph.create_child(nodes.wrapper, format!("btn_{}", def.id)) else {
        return;
    };
    graph.set_local_position(button, Vec3::new(0.0, def.half_extents.y + 0.3, 0.0));
    graph.set_billboard(button, BillboardMode::All);
    ui.add(button, "i", 0.12, UiAction::OpenInfo(def));
}
