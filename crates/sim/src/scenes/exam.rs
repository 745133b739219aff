//! The examination room: a patient on a bed, three instruments on the side
//! table, three measurement targets, and the narrated examination script.

use super::{spawn_scenery, Scene, SceneKind};
use crate::assets::AssetLibrary;
use crate::catalog::EXAM_PROPS;
use crate::config::SimConfig;
use crate::dialogue::{DialogueDirector, DialogueStep, SceneRequest, StepKind};
use crate::grab::GrabSystem;
use crate::info_panel::InfoPanel;
use crate::overlay::Overlay;
use crate::player::CameraRig;
use crate::props::spawn_prop;
use crate::targets::{BodySite, CueKind, ExamSequencer, InteractionTarget};
use crate::ui::{UiAction, UiButtons};
use engine_core::{SceneGraph, Vec3, World};
use physics::PhysicsWorld;

/// Target volume centers over the mannequin.
pub const HEAD_TARGET_CENTER: Vec3 = Vec3::new(-14.6, 1.15, 27.5);
pub const CHEST_TARGET_CENTER: Vec3 = Vec3::new(-14.6, 1.2, 27.0);
pub const ARM_TARGET_CENTER: Vec3 = Vec3::new(-14.25, 1.1, 27.0);

const TARGET_RADIUS: f32 = 0.25;

const EXAM_SCRIPT: &[DialogueStep] = &[
    DialogueStep {
        title: "Hello, future doctor!",
        body: "Welcome to the patient examination simulation.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "The patient has just come into the examination room complaining of dizziness and weakness after standing for a long time. Run the basic examination to find the cause.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "SIMULATION",
        body: "Let's begin!",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Step 1: listen to the patient's heart and lungs using the stethoscope.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Step 2: continue with a blood pressure measurement using the digital monitor.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "Step 3: make sure the patient has no infection by checking body temperature with the digital thermometer.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "After examining the patient, the initial assessment is mild hypotension brought on by fatigue and poor nutrition. An electrolyte IV drip will help stabilise the patient's blood pressure.",
        kind: StepKind::Continue,
    },
    DialogueStep {
        title: "",
        body: "The simulation is complete! Congratulations, you examined the patient using the basic medical instruments.",
        kind: StepKind::Finish(SceneRequest::Menu),
    },
];

pub fn build(assets: &AssetLibrary, _cfg: &SimConfig) -> Scene {
    let mut world = World::new();
    let mut graph = SceneGraph::new();
    let mut physics = PhysicsWorld::new();
    let mut ui = UiButtons::new();

    physics.add_ground_plane();
    let camera = CameraRig::new(&mut graph, Vec3::new(-17.0, 2.0, 22.0));

    spawn_scenery(
        &mut graph,
        assets,
        "exam_room.glb",
        Vec3::new(-22.5, 0.0, 8.0),
        Vec3::new(-0.5, 0.5, 0.5),
    );
    spawn_scenery(
        &mut graph,
        assets,
        "bed.glb",
        Vec3::new(-21.9, 0.0, 9.7),
        Vec3::new(-0.46, 0.46, 0.46),
    );
    spawn_scenery(
        &mut graph,
        assets,
        "patient.glb",
        Vec3::new(-14.7, 1.1, 27.3),
        Vec3::new(1.2, 1.2, 1.2),
    );
    spawn_scenery(
        &mut graph,
        assets,
        "iv_stand.glb",
        Vec3::new(-11.0, 0.1, 27.5),
        Vec3::new(0.04, 0.04, 0.04),
    );

    // Invisible room colliders: instrument tables, walls, bed, patient, floor.
    let statics = [
        (Vec3::new(-17.0, 1.0, 27.5), Vec3::new(0.35, 0.2, 0.35)),
        (Vec3::new(-17.7, 1.0, 27.5), Vec3::new(0.35, 0.3, 0.35)),
        (Vec3::new(-16.3, 1.0, 27.5), Vec3::new(0.35, 0.3, 0.35)),
        (Vec3::new(-22.6, 1.0, 27.5), Vec3::new(0.1, 5.0, 9.5)),
        (Vec3::new(-12.5, 1.0, 27.5), Vec3::new(0.1, 5.0, 9.5)),
        (Vec3::new(-14.57, 0.8, 27.5), Vec3::new(0.5, 0.2, 2.0)),
        (Vec3::new(-14.6, 0.9, 27.3), Vec3::new(0.3, 0.15, 0.9)),
        (Vec3::new(-14.57, 0.0, 27.5), Vec3::new(8.0, 0.2, 9.5)),
    ];
    for (position, half_extents) in statics {
        physics.add_static_cuboid(position, 0.0, half_extents);
    }

    for def in EXAM_PROPS {
        if let Err(e) = spawn_prop(&mut world, &mut graph, &mut physics, assets, def) {
            log::warn!("skipping prop {}: {e}", def.id);
        }
    }

    let targets = vec![
        InteractionTarget {
            site: BodySite::Chest,
            expected: "stethoscope",
            center: CHEST_TARGET_CENTER,
            radius: TARGET_RADIUS,
            requires_held: true,
            reading: "50 BPM",
            reading_color: [0.5, 0.0, 0.0, 1.0],
            result_image: "heart_rate.png",
            board_position: Vec3::new(-17.5, 2.5, 28.15),
            snap_rotation_deg: Vec3::new(90.0, 0.0, 0.0),
            cue: CueKind::HeartbeatLoop,
            inside: false,
        },
        InteractionTarget {
            site: BodySite::Head,
            expected: "thermometer",
            center: HEAD_TARGET_CENTER,
            radius: TARGET_RADIUS,
            requires_held: false,
            reading: "36.4°C",
            reading_color: [1.0, 1.0, 0.2, 1.0],
            result_image: "body_temperature.png",
            board_position: Vec3::new(-16.5, 2.5, 28.15),
            snap_rotation_deg: Vec3::ZERO,
            cue: CueKind::Beep,
            inside: false,
        },
        InteractionTarget {
            site: BodySite::Arm,
            expected: "tensimeter",
            center: ARM_TARGET_CENTER,
            radius: TARGET_RADIUS,
            requires_held: true,
            reading: "110/70 mmHg",
            reading_color: [0.2, 1.0, 1.0, 1.0],
            result_image: "blood_pressure.png",
            board_position: Vec3::new(-17.0, 2.0, 28.15),
            snap_rotation_deg: Vec3::new(0.0, 180.0, 0.0),
            cue: CueKind::Beep,
            inside: false,
        },
    ];

    // Reset and lobby buttons on the back wall.
    let reset = graph.create_node("reset_button");
    graph.set_local_position(reset, Vec3::new(-15.5, 1.8, 28.2));
    ui.add(reset, "RESET ITEMS", 0.2, UiAction::ResetItems);
    let lobby = graph.create_node("lobby_button");
    graph.set_local_position(lobby, Vec3::new(-13.5, 1.8, 28.2));
    ui.add(lobby, "TO LOBBY", 0.2, UiAction::GoToLobby);

    Scene {
        kind: SceneKind::Exam,
        world,
        graph,
        physics,
        camera,
        grab: GrabSystem::new(),
        ui,
        overlay: Overlay::new(),
        info_panel: InfoPanel::new(),
        dialogue: DialogueDirector::new(EXAM_SCRIPT),
        credits: None,
        mascot: None,
        targets,
        sequencer: ExamSequencer::new(),
        pending: None,
        ticks: 0,
    }
}
