//! Scenes: one self-contained world per stage (menu lobby, instrument
//! showcase, examination room).
//!
//! A `Scene` owns everything disposable: ECS world, scene graph, physics
//! world, overlay, interaction state. Dropping the struct IS the teardown:
//! there are no per-frame callbacks registered anywhere that could outlive
//! it. All per-tick logic runs in the single explicit `update` phase below,
//! in a fixed order.

pub mod exam;
pub mod menu;
pub mod showcase;

use crate::config::SimConfig;
use crate::dialogue::{DialogueDirector, SceneRequest};
use crate::grab::{GrabSystem, PressOutcome};
use crate::info_panel::InfoPanel;
use crate::mascot::Mascot;
use crate::overlay::Overlay;
use crate::player::CameraRig;
use crate::props::{self, Grabbable, Prop};
use crate::targets::{ExamSequencer, InteractionTarget};
use crate::ui::{UiAction, UiButtons};
use crate::assets::AssetLibrary;
use audio::AudioSystem;
use engine_core::{Entity, SceneGraph, Vec3, World};
use input::{InputState, SourceId, SourceRegistry};
use physics::{PhysicsBody, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Menu,
    Showcase,
    Exam,
}

/// The lobby's credits overlay.
#[derive(Debug)]
pub struct CreditsPanel {
    pub open: bool,
    pub text: &'static str,
}

impl CreditsPanel {
    pub fn new(text: &'static str) -> Self {
        Self { open: false, text }
    }

    pub fn show(&mut self) {
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
    }
}

/// One loaded stage of the application.
pub struct Scene {
    pub kind: SceneKind,
    pub world: World,
    pub graph: SceneGraph,
    pub physics: PhysicsWorld,
    pub camera: CameraRig,
    pub grab: GrabSystem,
    pub ui: UiButtons,
    pub overlay: Overlay,
    pub info_panel: InfoPanel,
    pub dialogue: DialogueDirector,
    pub credits: Option<CreditsPanel>,
    pub mascot: Option<Mascot>,
    pub targets: Vec<InteractionTarget>,
    pub sequencer: ExamSequencer,
    /// Scene switch requested by a UI button (lobby).
    pending: Option<SceneRequest>,
    /// Frames this scene has lived. Fresh scenes start at zero.
    pub ticks: u64,
}

impl Scene {
    /// One simulation tick. The phase order is fixed: input edges, grab seek,
    /// physics, node sync, measurement, companions, dialogue, overlay.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputState,
        sources: &mut SourceRegistry,
        audio: &mut Option<AudioSystem>,
        cfg: &SimConfig,
    ) {
        self.ticks += 1;

        // Desktop camera drives the pointer source's pose.
        self.camera.update_from_input(&mut self.graph, input, dt, cfg);
        let camera_position = self.camera.position(&self.graph);
        let anchor = self.camera.pointer_anchor(&self.graph, cfg.pointer_reach);
        sources.set_pose(SourceId::Pointer, anchor, self.camera.rotation(), dt);
        if input.is_grab_pressed() {
            sources.press(SourceId::Pointer);
        }
        if input.is_grab_released() {
            sources.release(SourceId::Pointer);
        }
        if input.is_reset_pressed() {
            self.dispatch(UiAction::ResetItems, audio, cfg);
        }
        if input.is_interact_pressed() {
            if let Some(action) = self.ui.hit_test(
                &self.graph,
                camera_position,
                self.camera.forward(),
                cfg.ui_ray_max_distance,
            ) {
                self.dispatch(action, audio, cfg);
            }
        }

        // Press/release edges, any source.
        let mut ui_actions = Vec::new();
        for id in sources.ids() {
            let Some(source) = sources.get(id).copied() else {
                continue;
            };
            if source.pressed_this_frame() {
                if let PressOutcome::Ui(action) = self.grab.press(
                    &source,
                    &mut self.world,
                    &mut self.graph,
                    &mut self.physics,
                    &self.ui,
                    cfg,
                ) {
                    ui_actions.push(action);
                }
            }
            if source.released_this_frame() {
                self.grab.release(
                    id,
                    Some(source.velocity()),
                    &mut self.world,
                    &mut self.graph,
                    &mut self.physics,
                    cfg,
                );
            }
        }
        for action in ui_actions {
            self.dispatch(action, audio, cfg);
        }

        // Grab lifecycle and simulation.
        props::tick_cooldowns(&mut self.world, dt);
        self.grab
            .update(sources, &self.world, &mut self.physics, cfg);
        self.physics.integration_parameters.dt = dt;
        self.physics.step();
        props::sync_prop_nodes(&mut self.world, &mut self.graph, &self.physics);

        // Measurement targets.
        self.sequencer.update(
            dt,
            &mut self.targets,
            &mut self.world,
            &mut self.graph,
            &mut self.physics,
            &mut self.grab,
            &mut self.overlay,
            audio,
            cfg,
        );

        // Companions and camera-facing elements.
        if let Some(mascot) = &self.mascot {
            mascot.update(&mut self.graph, camera_position);
        }
        self.graph.apply_billboards(camera_position);

        // Narration and overlay timers.
        self.dialogue.update(dt, cfg);
        self.overlay.update(dt);
        if let Some(audio) = audio {
            audio.cleanup();
        }
    }

    /// Perform a clicked UI action.
    pub fn dispatch(&mut self, action: UiAction, audio: &mut Option<AudioSystem>, cfg: &SimConfig) {
        match action {
            UiAction::OpenInfo(def) => {
                log::info!("info panel opened for {}", def.id);
                self.info_panel.open(def, &mut self.graph);
            }
            UiAction::ResetItems => self.reset_items(audio, cfg),
            UiAction::GoToLobby => {
                self.pending = Some(SceneRequest::Menu);
            }
            UiAction::AskMascot => {
                let reply = Mascot::reply(&mut rand::thread_rng());
                self.overlay.messages.info(format!("Mascot: {reply}"));
            }
        }
    }

    /// Return every instrument to its start pose, aborting any in-flight
    /// measurement and clearing results.
    pub fn reset_items(&mut self, audio: &mut Option<AudioSystem>, cfg: &SimConfig) {
        self.sequencer.cancel(
            &mut self.world,
            &mut self.graph,
            &mut self.physics,
            audio,
            cfg,
        );
        self.grab
            .release_all(&mut self.world, &mut self.graph, &mut self.physics, cfg);
        let entities: Vec<Entity> = self
            .world
            .query::<&Grabbable>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        for entity in entities {
            props::reset_prop(&mut self.world, &mut self.graph, &mut self.physics, entity);
        }
        self.overlay.clear_results(&mut self.graph);
        self.overlay
            .messages
            .info("All instruments returned to their places.");
    }

    /// Scene switch requested by dialogue or a UI button, if any.
    pub fn take_transition(&mut self) -> Option<SceneRequest> {
        self.dialogue.take_transition().or_else(|| self.pending.take())
    }

    pub fn prop_entity(&self, id: &str) -> Option<Entity> {
        self.world
            .query::<&Prop>()
            .iter()
            .find(|(_, prop)| prop.def.id == id)
            .map(|(entity, _)| entity)
    }

    pub fn prop_position(&self, id: &str) -> Option<Vec3> {
        let entity = self.prop_entity(id)?;
        let body = self.world.get::<&PhysicsBody>(entity).ok()?;
        self.physics.body_position(body.rigid_body)
    }

    /// Explicit teardown before the struct drops: silence audio and empty the
    /// world so nothing created by this scene survives the switch.
    pub fn dispose(&mut self, audio: &mut Option<AudioSystem>) {
        if let Some(audio) = audio {
            audio.stop_all();
        }
        log::info!(
            "disposing {:?}: {} entities, {} bodies, {} nodes",
            self.kind,
            self.world.len(),
            self.physics.body_count(),
            self.graph.alive_count(),
        );
        self.world.clear();
    }
}

/// Place a purely visual asset in the world. Failure to load logs and skips;
/// one broken model never takes the scene down.
pub(crate) fn spawn_scenery(
    graph: &mut SceneGraph,
    assets: &AssetLibrary,
    asset: &str,
    position: Vec3,
    scale: Vec3,
) {
    let root = graph.create_node(format!("scenery_{asset}"));
    graph.set_local_position(root, position);
    match assets.instantiate(graph, root, asset) {
        Ok(node) => graph.set_scale(node, scale),
        Err(e) => {
            log::warn!("failed to load scenery {asset}: {e}");
            graph.dispose(root);
        }
    }
}
