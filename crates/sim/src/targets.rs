//! Interaction targets and the measurement sequencer.
//!
//! Invisible spheres sit over the mannequin's head, chest, and arm. When the
//! matching instrument's wrapper enters one, a scripted feedback sequence
//! runs: park the instrument on the target, wait, reveal the reading (sound,
//! label, result image), wait again, then drop the instrument with its grab
//! re-armed. One `processing` flag serializes sequences across all targets;
//! the scripted pacing allows a single measurement at a time.
//!
//! Timers always run to completion once a sequence starts; pulling the
//! instrument away cannot truncate the feedback.

use crate::config::SimConfig;
use crate::grab::{drop_in_place, GrabSystem};
use crate::props::{GrabPhase, Grabbable, Prop, SavedBodyParams};
use crate::overlay::Overlay;
use audio::AudioSystem;
use engine_core::{Entity, SceneGraph, Vec3, World};
use glam::{EulerRot, Quat};
use physics::{PhysicsBody, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySite {
    Head,
    Chest,
    Arm,
}

impl BodySite {
    pub fn key(&self) -> &'static str {
        match self {
            BodySite::Head => "head",
            BodySite::Chest => "chest",
            BodySite::Arm => "arm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodySite::Head => "Body temperature",
            BodySite::Chest => "Heart rate",
            BodySite::Arm => "Blood pressure",
        }
    }
}

/// Audio feedback for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// One-shot beep when the reading appears.
    Beep,
    /// Heartbeat loop for the duration of the reading.
    HeartbeatLoop,
}

/// A fixed invisible volume near the mannequin, bound to one instrument.
#[derive(Debug, Clone, Copy)]
pub struct InteractionTarget {
    pub site: BodySite,
    /// Catalog id of the instrument this target reacts to.
    pub expected: &'static str,
    pub center: Vec3,
    pub radius: f32,
    /// Whether the instrument must currently be held to trigger.
    pub requires_held: bool,
    /// Placeholder reading shown when the measurement lands.
    pub reading: &'static str,
    pub reading_color: [f32; 4],
    pub result_image: &'static str,
    /// Where the result billboard appears.
    pub board_position: Vec3,
    /// Pose the instrument snaps to on the target, degrees.
    pub snap_rotation_deg: Vec3,
    pub cue: CueKind,
    /// Entry latch: true while the instrument is inside the volume.
    pub inside: bool,
}

impl InteractionTarget {
    fn snap_rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.snap_rotation_deg.x.to_radians(),
            self.snap_rotation_deg.y.to_radians(),
            self.snap_rotation_deg.z.to_radians(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencePhase {
    /// Instrument parked; waiting for the reading to land.
    Measuring,
    /// Reading visible; waiting to clean up.
    Showing,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSequence {
    target_index: usize,
    entity: Entity,
    phase: SequencePhase,
    timer: f32,
}

/// Runs at most one measurement sequence at a time.
#[derive(Debug, Default)]
pub struct ExamSequencer {
    processing: bool,
    active: Option<ActiveSequence>,
}

impl ExamSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        targets: &mut [InteractionTarget],
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        grab: &mut GrabSystem,
        overlay: &mut Overlay,
        audio: &mut Option<AudioSystem>,
        cfg: &SimConfig,
    ) {
        self.advance_active(dt, targets, world, graph, physics, overlay, audio, cfg);
        self.detect_entries(targets, world, physics, grab, cfg);
    }

    /// Edge-detect instruments entering their target volumes.
    fn detect_entries(
        &mut self,
        targets: &mut [InteractionTarget],
        world: &mut World,
        physics: &mut PhysicsWorld,
        grab: &mut GrabSystem,
        cfg: &SimConfig,
    ) {
        for index in 0..targets.len() {
            let target = targets[index];
            let Some((entity, position)) = find_prop(world, physics, target.expected) else {
                targets[index].inside = false;
                continue;
            };
            let inside_now = (position - target.center).length() < target.radius;
            let entered = inside_now && !target.inside;
            targets[index].inside = inside_now;
            if !entered {
                continue;
            }
            if self.processing {
                log::debug!(
                    "{} entered {:?} while a measurement is running, ignored",
                    target.expected,
                    target.site
                );
                continue;
            }
            if target.requires_held && grab.holder_of(entity).is_none() {
                continue;
            }
            self.begin(index, entity, &target, world, physics, grab, cfg);
        }
    }

    fn begin(
        &mut self,
        target_index: usize,
        entity: Entity,
        target: &InteractionTarget,
        world: &mut World,
        physics: &mut PhysicsWorld,
        grab: &mut GrabSystem,
        cfg: &SimConfig,
    ) {
        let Ok(body) = world.get::<&PhysicsBody>(entity).map(|b| *b) else {
            return;
        };
        self.processing = true;
        grab.take_for_sequence(entity);

        if let Ok(mut grabbable) = world.get::<&mut Grabbable>(entity) {
            // An instrument can arrive without ever being grabbed (thrown in);
            // snapshot its params now so the final drop restores something.
            if grabbable.saved.is_none() {
                grabbable.saved = Some(SavedBodyParams {
                    linear_damping: physics.linear_damping(body.rigid_body).unwrap_or(0.0),
                    angular_damping: physics.angular_damping(body.rigid_body).unwrap_or(0.0),
                    gravity_scale: physics.gravity_scale(body.rigid_body).unwrap_or(1.0),
                });
            }
            grabbable.phase = GrabPhase::Resting;
            grabbable.locked = true;
            grabbable.highlighted = false;
        }

        // Park the instrument on the target for the duration.
        physics.set_gravity_scale(body.rigid_body, 0.0);
        physics.set_body_pose(body.rigid_body, target.center, target.snap_rotation());

        log::info!("measuring {:?} with {}", target.site, target.expected);
        self.active = Some(ActiveSequence {
            target_index,
            entity,
            phase: SequencePhase::Measuring,
            timer: cfg.result_delay,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn advance_active(
        &mut self,
        dt: f32,
        targets: &[InteractionTarget],
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        overlay: &mut Overlay,
        audio: &mut Option<AudioSystem>,
        cfg: &SimConfig,
    ) {
        let Some(mut active) = self.active else {
            return;
        };
        active.timer -= dt;
        if active.timer > 0.0 {
            self.active = Some(active);
            return;
        }
        let target = targets[active.target_index];
        match active.phase {
            SequencePhase::Measuring => {
                overlay.show_reading(target.site.key(), target.reading, target.reading_color);
                overlay.show_billboard(
                    graph,
                    &format!("{}_result", target.site.key()),
                    target.result_image,
                    target.board_position,
                );
                overlay
                    .messages
                    .success(format!("{}: {}", target.site.label(), target.reading));
                if let Some(audio) = audio {
                    let result = match target.cue {
                        CueKind::Beep => audio.play("beep"),
                        CueKind::HeartbeatLoop => audio.play_loop("heartbeat"),
                    };
                    if let Err(e) = result {
                        log::warn!("audio cue failed: {e}");
                    }
                }
                active.phase = SequencePhase::Showing;
                active.timer = cfg.result_display;
                self.active = Some(active);
            }
            SequencePhase::Showing => {
                overlay.hide_reading(target.site.key());
                if target.cue == CueKind::HeartbeatLoop {
                    if let Some(audio) = audio {
                        audio.stop_loop("heartbeat");
                    }
                }
                // Return the instrument to the world: params restored, grab
                // re-armed after the cooldown, gentle downward drop.
                drop_in_place(
                    active.entity,
                    Vec3::new(0.0, -0.5, 0.0),
                    world,
                    graph,
                    physics,
                    cfg,
                );
                log::info!("{:?} measurement complete", target.site);
                self.active = None;
                self.processing = false;
            }
        }
    }

    /// Abort an in-flight sequence (reset button, scene teardown). The
    /// instrument's physics params are restored; the caller clears overlay
    /// state and repositions props.
    pub fn cancel(
        &mut self,
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        audio: &mut Option<AudioSystem>,
        cfg: &SimConfig,
    ) {
        if let Some(active) = self.active.take() {
            if let Some(audio) = audio {
                audio.stop_loop("heartbeat");
            }
            drop_in_place(active.entity, Vec3::ZERO, world, graph, physics, cfg);
        }
        self.processing = false;
    }
}

/// Locate a prop entity and its body position by catalog id.
fn find_prop(world: &World, physics: &PhysicsWorld, id: &str) -> Option<(Entity, Vec3)> {
    for (entity, (prop, body)) in world.query::<(&Prop, &PhysicsBody)>().iter() {
        if prop.def.id != id {
            continue;
        }
        let position = physics.body_position(body.rigid_body)?;
        return Some((entity, position));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLibrary;
    use crate::catalog::{find, EXAM_PROPS};
    use crate::props::spawn_prop;

    struct Rig {
        world: World,
        graph: SceneGraph,
        physics: PhysicsWorld,
        grab: GrabSystem,
        overlay: Overlay,
        audio: Option<AudioSystem>,
        cfg: SimConfig,
        targets: Vec<InteractionTarget>,
        thermometer: Entity,
    }

    fn head_target() -> InteractionTarget {
        InteractionTarget {
            site: BodySite::Head,
            expected: "thermometer",
            center: Vec3::new(-14.6, 1.15, 27.5),
            radius: 0.25,
            requires_held: false,
            reading: "36.4°C",
            reading_color: [1.0, 1.0, 0.2, 1.0],
            result_image: "body_temperature.png",
            board_position: Vec3::new(-16.5, 2.5, 28.15),
            snap_rotation_deg: Vec3::ZERO,
            cue: CueKind::Beep,
            inside: false,
        }
    }

    fn rig() -> Rig {
        let mut world = World::new();
        let mut graph = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let assets = AssetLibrary::with_standard_assets();
        let thermometer = spawn_prop(
            &mut world,
            &mut graph,
            &mut physics,
            &assets,
            find(EXAM_PROPS, "thermometer").unwrap(),
        )
        .unwrap();
        Rig {
            world,
            graph,
            physics,
            grab: GrabSystem::new(),
            overlay: Overlay::new(),
            audio: None,
            cfg: SimConfig::default(),
            targets: vec![head_target()],
            thermometer,
        }
    }

    fn step(rig: &mut Rig, seq: &mut ExamSequencer, dt: f32) {
        seq.update(
            dt,
            &mut rig.targets,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &mut rig.grab,
            &mut rig.overlay,
            &mut rig.audio,
            &rig.cfg,
        );
    }

    fn move_prop_to(rig: &mut Rig, position: Vec3) {
        let body = *rig.world.get::<&PhysicsBody>(rig.thermometer).unwrap();
        rig.physics
            .set_body_pose(body.rigid_body, position, glam::Quat::IDENTITY);
    }

    #[test]
    fn sequence_times_match_the_script() {
        let mut rig = rig();
        let mut seq = ExamSequencer::new();
        assert!(!seq.is_processing());

        let center = rig.targets[0].center;
        move_prop_to(&mut rig, center);
        step(&mut rig, &mut seq, 0.016);
        assert!(seq.is_processing());
        assert!(!rig.overlay.is_reading_visible("head"));

        // 0.983 s into the delay: reading not yet shown.
        step(&mut rig, &mut seq, 0.983);
        assert!(!rig.overlay.is_reading_visible("head"));
        // Past 1.0 s: reading and result image appear.
        step(&mut rig, &mut seq, 0.02);
        assert!(rig.overlay.is_reading_visible("head"));
        assert_eq!(rig.overlay.reading("head").unwrap().text, "36.4°C");
        assert!(rig.overlay.has_billboard("head_result"));

        // 2 s later everything cleans up and the prop is re-arming.
        step(&mut rig, &mut seq, 2.01);
        assert!(!rig.overlay.is_reading_visible("head"));
        assert!(!seq.is_processing());
        let grabbable = *rig.world.get::<&Grabbable>(rig.thermometer).unwrap();
        assert!(grabbable.cooldown > 0.0);
        assert!(!grabbable.locked);
    }

    #[test]
    fn processing_excludes_a_second_sequence() {
        let mut rig = rig();
        // A second target that also reacts to the thermometer.
        let mut arm = head_target();
        arm.site = BodySite::Arm;
        arm.center = Vec3::new(0.0, 1.0, 0.0);
        rig.targets.push(arm);

        let mut seq = ExamSequencer::new();
        let target0 = rig.targets[0].center;
        move_prop_to(&mut rig, target0);
        step(&mut rig, &mut seq, 0.016);
        assert!(seq.is_processing());

        // Parked prop teleported into the second target mid-sequence: entry
        // is detected but rejected while processing.
        let target1 = rig.targets[1].center;
        move_prop_to(&mut rig, target1);
        step(&mut rig, &mut seq, 0.016);
        // Still exactly one sequence; finishing it clears the flag once.
        step(&mut rig, &mut seq, 1.1);
        step(&mut rig, &mut seq, 2.1);
        assert!(!seq.is_processing());
    }

    #[test]
    fn requires_held_blocks_unheld_instruments() {
        let mut rig = rig();
        rig.targets[0].requires_held = true;
        let mut seq = ExamSequencer::new();
        let target0 = rig.targets[0].center;
        move_prop_to(&mut rig, target0);
        step(&mut rig, &mut seq, 0.016);
        assert!(!seq.is_processing());
    }

    #[test]
    fn sequence_runs_to_completion_if_prop_is_moved_away() {
        let mut rig = rig();
        let mut seq = ExamSequencer::new();
        let target0 = rig.targets[0].center;
        move_prop_to(&mut rig, target0);
        step(&mut rig, &mut seq, 0.016);

        // Yank the prop far away before the reading lands.
        move_prop_to(&mut rig, Vec3::new(10.0, 1.0, 10.0));
        step(&mut rig, &mut seq, 1.1);
        assert!(rig.overlay.is_reading_visible("head"));
        step(&mut rig, &mut seq, 2.1);
        assert!(!seq.is_processing());
    }

    #[test]
    fn cancel_clears_processing_and_unlocks() {
        let mut rig = rig();
        let mut seq = ExamSequencer::new();
        let target0 = rig.targets[0].center;
        move_prop_to(&mut rig, target0);
        step(&mut rig, &mut seq, 0.016);
        assert!(seq.is_processing());

        seq.cancel(
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &mut rig.audio,
            &rig.cfg,
        );
        assert!(!seq.is_processing());
        let grabbable = *rig.world.get::<&Grabbable>(rig.thermometer).unwrap();
        assert!(!grabbable.locked);
    }
}
