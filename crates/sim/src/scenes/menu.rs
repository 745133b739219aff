//! The lobby scene: the mascot greets the player, explains the training, and
//! asks whether they are ready to visit the instrument showcase.

use super::{spawn_scenery, CreditsPanel, Scene, SceneKind};
use crate::assets::AssetLibrary;
use crate::config::SimConfig;
use crate::dialogue::{DialogueDirector, DialogueStep, SceneRequest, StepKind};
use crate::grab::GrabSystem;
use crate::info_panel::InfoPanel;
use crate::overlay::Overlay;
use crate::player::CameraRig;
use crate::targets::ExamSequencer;
use crate::ui::UiButtons;
use engine_core::{SceneGraph, Vec3, World};
use physics::PhysicsWorld;

const MENU_SCRIPT: &[DialogueStep] = &[
    DialogueStep {
        title: "Hello, future doctor!",
        body: "I'm MEDIBOT! Welcome to OpenCare, a virtual world built to bring you closer to real medical practice.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "You're standing in the OpenCare lobby, the starting point of your training. Every interaction and every step brings you closer to working like a real clinician.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Ready to run the simulation?",
        kind: StepKind::Choice {
            ready_text: "Before the simulation you'll be taken to the instrument showcase. Every tool on display carries a short explanation of what it does and how it works, so you can study each one before practice begins.",
            destination: SceneRequest::Showcase,
            not_ready_text: None,
            exit: Some(SceneRequest::Quit),
        },
    },
];

const CREDITS_TEXT: &str = "\
OpenCare

An open training environment for basic clinical examination.

Built with the OpenCare engine crates: scene graph, physics wrapper,
input sources, and audio cues.

Thanks to everyone who reported rough edges in the grab tuning.
";

pub fn build(assets: &AssetLibrary, _cfg: &SimConfig) -> Scene {
    let world = World::new();
    let mut graph = SceneGraph::new();
    let mut physics = PhysicsWorld::new();

    physics.add_ground_plane();
    let camera = CameraRig::new(&mut graph, Vec3::new(0.0, 2.0, 0.0));

    spawn_scenery(
        &mut graph,
        assets,
        "exam_room.glb",
        Vec3::new(-2.0, 0.0, 7.5),
        Vec3::new(-0.43, 0.43, 0.43),
    );
    spawn_scenery(
        &mut graph,
        assets,
        "avatar.glb",
        Vec3::new(0.0, 0.7, 2.4),
        Vec3::new(0.3, 0.3, 0.3),
    );

    // Narration panel floats ahead of the spawn point.
    let panel = graph.create_node("dialogue_panel");
    graph.set_local_position(panel, Vec3::new(0.0, 2.8, 2.5));

    Scene {
        kind: SceneKind::Menu,
        world,
        graph,
        physics,
        camera,
        grab: GrabSystem::new(),
        ui: UiButtons::new(),
        overlay: Overlay::new(),
        info_panel: InfoPanel::new(),
        dialogue: DialogueDirector::new(MENU_SCRIPT),
        credits: Some(CreditsPanel::new(CREDITS_TEXT)),
        mascot: None,
        targets: Vec::new(),
        sequencer: ExamSequencer::new(),
        pending: None,
        ticks: 0,
    }
}
