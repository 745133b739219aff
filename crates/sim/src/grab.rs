//! Grab controller: translates press/release edges on input sources into
//! physics-affecting transitions on props.
//!
//! One strategy everywhere: the held body is driven by a target-seeking
//! velocity toward the source's hold point (offset clamp, static-geometry
//! raycast guard, speed cap). UI raycasting runs before any pick-up attempt,
//! so clicking a button never grabs the prop behind it. At most one prop is
//! held per source; a press on an already-held prop is ignored (first request
//! wins).

use crate::config::SimConfig;
use crate::props::{GrabPhase, Grabbable, Prop, PropNodes, SavedBodyParams};
use crate::ui::{UiAction, UiButtons};
use engine_core::{Entity, SceneGraph, Vec3, World};
use input::{SourceId, SourceRegistry, TrackedSource};
use physics::{PhysicsBody, PhysicsWorld};
use std::collections::HashMap;

/// Result of a press: a UI action to dispatch, a grabbed prop, or nothing.
#[derive(Debug, Clone, Copy)]
pub enum PressOutcome {
    Ui(UiAction),
    Grabbed(Entity),
    None,
}

#[derive(Debug, Default)]
pub struct GrabSystem {
    held: HashMap<SourceId, Entity>,
}

impl GrabSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held_by(&self, source: SourceId) -> Option<Entity> {
        self.held.get(&source).copied()
    }

    pub fn holder_of(&self, entity: Entity) -> Option<SourceId> {
        self.held
            .iter()
            .find(|(_, e)| **e == entity)
            .map(|(id, _)| *id)
    }

    /// Handle a press edge from one source.
    pub fn press(
        &mut self,
        source: &TrackedSource,
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        ui: &UiButtons,
        cfg: &SimConfig,
    ) -> PressOutcome {
        if self.held.contains_key(&source.id) {
            return PressOutcome::None;
        }

        // UI takes priority over grabbing.
        if let Some(action) = ui.hit_test(
            graph,
            source.position(),
            source.forward(),
            cfg.ui_ray_max_distance,
        ) {
            log::debug!("press on {:?} hit UI, grab skipped", source.id);
            return PressOutcome::Ui(action);
        }

        let mut best: Option<(f32, Entity)> = None;
        for (entity, (prop, grabbable, body)) in
            world.query::<(&Prop, &Grabbable, &PhysicsBody)>().iter()
        {
            if !grabbable.is_pickable() {
                continue;
            }
            let Some(position) = physics.body_position(body.rigid_body) else {
                continue;
            };
            let distance = (position - source.position()).length();
            if distance >= cfg.capture_radius(prop.def.class) {
                continue;
            }
            if best.map(|(d, _)| distance < d).unwrap_or(true) {
                best = Some((distance, entity));
            }
        }
        let Some((_, entity)) = best else {
            return PressOutcome::None;
        };

        if self.acquire(source.id, entity, world, graph, physics, cfg) {
            PressOutcome::Grabbed(entity)
        } else {
            PressOutcome::None
        }
    }

    fn acquire(
        &mut self,
        source: SourceId,
        entity: Entity,
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        cfg: &SimConfig,
    ) -> bool {
        let Ok(body) = world.get::<&PhysicsBody>(entity).map(|b| *b) else {
            return false;
        };
        // Snapshot before mutating; a body lost to a scene switch aborts the
        // whole operation.
        let Some(linear_damping) = physics.linear_damping(body.rigid_body) else {
            return false;
        };
        let angular_damping = physics.angular_damping(body.rigid_body).unwrap_or(0.0);
        let gravity_scale = physics.gravity_scale(body.rigid_body).unwrap_or(1.0);

        if let Ok(mut grabbable) = world.get::<&mut Grabbable>(entity) {
            grabbable.saved = Some(SavedBodyParams {
                linear_damping,
                angular_damping,
                gravity_scale,
            });
            grabbable.phase = GrabPhase::Held(source);
            grabbable.highlighted = true;
        }

        physics.set_linear_damping(body.rigid_body, cfg.held_linear_damping);
        physics.set_angular_damping(body.rigid_body, cfg.held_angular_damping);
        physics.set_gravity_scale(body.rigid_body, 0.0);
        physics.set_linear_velocity(body.rigid_body, Vec3::ZERO);
        physics.set_angular_velocity(body.rigid_body, Vec3::ZERO);

        // Chestpiece swap: hide the full model, show the held part.
        if let Ok(nodes) = world.get::<&PropNodes>(entity) {
            if let Some(swap) = nodes.held_swap {
                graph.set_visible(nodes.visual, false);
                graph.set_visible(swap, true);
            }
        }

        if let Ok(prop) = world.get::<&Prop>(entity) {
            log::info!("grabbed {} with {:?}", prop.def.id, source);
        }
        self.held.insert(source, entity);
        true
    }

    /// Drive every held prop toward its source's hold point. Stale entities
    /// and lost bodies silently drop out of the held set.
    pub fn update(
        &mut self,
        sources: &SourceRegistry,
        world: &World,
        physics: &mut PhysicsWorld,
        cfg: &SimConfig,
    ) {
        let pairs: Vec<(SourceId, Entity)> =
            self.held.iter().map(|(id, e)| (*id, *e)).collect();
        for (source_id, entity) in pairs {
            let Some(source) = sources.get(source_id) else {
                continue;
            };
            let Ok(body) = world.get::<&PhysicsBody>(entity).map(|b| *b) else {
                self.held.remove(&source_id);
                continue;
            };
            let Some(current) = physics.body_position(body.rigid_body) else {
                self.held.remove(&source_id);
                continue;
            };

            let mut target = source.position();
            let offset = target - current;
            let distance = offset.length();
            if distance > cfg.max_seek_distance {
                target = current + offset * (cfg.max_seek_distance / distance);
            }
            let target =
                physics.clamp_seek_target(current, target, cfg.wall_margin, Some(body.rigid_body));

            let mut velocity = (target - current) * cfg.seek_response;
            let speed = velocity.length();
            if speed > cfg.max_seek_speed {
                velocity *= cfg.max_seek_speed / speed;
            }
            physics.set_linear_velocity(body.rigid_body, velocity);
            physics.set_angular_velocity(body.rigid_body, Vec3::ZERO);
        }
    }

    /// Handle a release edge: restore the prop's pre-grab physics exactly and
    /// optionally impart the source's velocity as a throw.
    pub fn release(
        &mut self,
        source: SourceId,
        throw_velocity: Option<Vec3>,
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        cfg: &SimConfig,
    ) {
        let Some(entity) = self.held.remove(&source) else {
            return;
        };
        let velocity = throw_velocity
            .map(|v| v * cfg.throw_multiplier)
            .unwrap_or(Vec3::ZERO);
        drop_in_place(entity, velocity, world, graph, physics, cfg);
        if let Ok(prop) = world.get::<&Prop>(entity) {
            log::info!("released {} from {:?}", prop.def.id, source);
        }
    }

    /// Release everything currently held, with no throw. Used by the reset
    /// action and scene teardown.
    pub fn release_all(
        &mut self,
        world: &mut World,
        graph: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        cfg: &SimConfig,
    ) {
        let sources: Vec<SourceId> = self.held.keys().copied().collect();
        for source in sources {
            self.release(source, None, world, graph, physics, cfg);
        }
    }

    /// Take a prop out of a hand without the release bookkeeping; the
    /// measurement sequencer parks it and finishes the release itself later.
    /// Returns whether the prop was actually held.
    pub fn take_for_sequence(&mut self, entity: Entity) -> bool {
        let Some(source) = self.holder_of(entity) else {
            return false;
        };
        self.held.remove(&source);
        true
    }
}

/// Restore a prop's saved physics parameters, re-arm its grab cooldown, and
/// let it fall with the given velocity. Shared by manual release and the end
/// of a measurement sequence.
pub fn drop_in_place(
    entity: Entity,
    velocity: Vec3,
    world: &mut World,
    graph: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    cfg: &SimConfig,
) {
    let Ok(body) = world.get::<&PhysicsBody>(entity).map(|b| *b) else {
        return;
    };
    if let Ok(mut grabbable) = world.get::<&mut Grabbable>(entity) {
        if let Some(saved) = grabbable.saved.take() {
            physics.set_linear_damping(body.rigid_body, saved.linear_damping);
            physics.set_angular_damping(body.rigid_body, saved.angular_damping);
            physics.set_gravity_scale(body.rigid_body, saved.gravity_scale);
        }
        grabbable.phase = GrabPhase::Resting;
        grabbable.cooldown = cfg.grab_cooldown;
        grabbable.locked = false;
        grabbable.highlighted = false;
    }
    physics.set_linear_velocity(body.rigid_body, velocity);
    physics.set_angular_velocity(body.rigid_body, Vec3::ZERO);

    // Swap back to the full model at the drop position.
    if let Ok(nodes) = world.get::<&PropNodes>(entity) {
        if let Some(swap) = nodes.held_swap {
            graph.set_visible(nodes.visual, true);
            graph.set_visible(swap, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLibrary;
    use crate::catalog::{find, EXAM_PROPS};
    use crate::props::{spawn_prop, tick_cooldowns};
    use glam::Quat;
    use input::Handedness;

    struct Rig {
        world: World,
        graph: SceneGraph,
        physics: PhysicsWorld,
        sources: SourceRegistry,
        ui: UiButtons,
        cfg: SimConfig,
        thermometer: Entity,
    }

    fn rig() -> Rig {
        let mut world = World::new();
        let mut graph = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let assets = AssetLibrary::with_standard_assets();
        let def = find(EXAM_PROPS, "thermometer").unwrap();
        let thermometer =
            spawn_prop(&mut world, &mut graph, &mut physics, &assets, def).unwrap();
        physics.update_query_pipeline();
        Rig {
            world,
            graph,
            physics,
            sources: SourceRegistry::new(),
            ui: UiButtons::new(),
            cfg: SimConfig::default(),
            thermometer,
        }
    }

    fn prop_position(rig: &Rig) -> Vec3 {
        let body = *rig.world.get::<&PhysicsBody>(rig.thermometer).unwrap();
        rig.physics.body_position(body.rigid_body).unwrap()
    }

    #[test]
    fn concurrent_presses_resolve_first_wins() {
        let mut rig = rig();
        let left = rig.sources.add_controller(Handedness::Left);
        let right = rig.sources.add_controller(Handedness::Right);
        let at = prop_position(&rig);
        rig.sources.set_pose(left, at, Quat::IDENTITY, 0.016);
        rig.sources.set_pose(right, at, Quat::IDENTITY, 0.016);

        let mut grab = GrabSystem::new();
        let first = *rig.sources.get(left).unwrap();
        let second = *rig.sources.get(right).unwrap();
        let a = grab.press(
            &first,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        let b = grab.press(
            &second,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        assert!(matches!(a, PressOutcome::Grabbed(_)));
        assert!(matches!(b, PressOutcome::None));
        assert_eq!(grab.held_by(left), Some(rig.thermometer));
        assert_eq!(grab.held_by(right), None);
    }

    #[test]
    fn release_restores_pre_grab_params_exactly() {
        let mut rig = rig();
        let hand = rig.sources.add_controller(Handedness::Right);
        rig.sources
            .set_pose(hand, prop_position(&rig), Quat::IDENTITY, 0.016);
        let body = *rig.world.get::<&PhysicsBody>(rig.thermometer).unwrap();

        let before = (
            rig.physics.linear_damping(body.rigid_body).unwrap(),
            rig.physics.angular_damping(body.rigid_body).unwrap(),
            rig.physics.gravity_scale(body.rigid_body).unwrap(),
        );

        let mut grab = GrabSystem::new();
        let source = *rig.sources.get(hand).unwrap();
        grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        assert_eq!(
            rig.physics.gravity_scale(body.rigid_body).unwrap(),
            0.0
        );

        grab.release(
            hand,
            None,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.cfg,
        );
        let after = (
            rig.physics.linear_damping(body.rigid_body).unwrap(),
            rig.physics.angular_damping(body.rigid_body).unwrap(),
            rig.physics.gravity_scale(body.rigid_body).unwrap(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn released_prop_honors_cooldown_window() {
        let mut rig = rig();
        let hand = rig.sources.add_controller(Handedness::Right);
        rig.sources
            .set_pose(hand, prop_position(&rig), Quat::IDENTITY, 0.016);
        let mut grab = GrabSystem::new();
        let source = *rig.sources.get(hand).unwrap();
        grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        grab.release(
            hand,
            None,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.cfg,
        );

        // Cooldown is 1.5 s: at 1.499 s the prop is still not pickable.
        tick_cooldowns(&mut rig.world, 1.499);
        let retry = grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        assert!(matches!(retry, PressOutcome::None));

        tick_cooldowns(&mut rig.world, 0.002);
        let retry = grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        assert!(matches!(retry, PressOutcome::Grabbed(_)));
    }

    #[test]
    fn ui_hit_aborts_the_grab() {
        let mut rig = rig();
        let hand = rig.sources.add_controller(Handedness::Right);
        let at = prop_position(&rig);
        rig.sources.set_pose(hand, at, Quat::IDENTITY, 0.016);

        // Button directly ahead of the source's forward ray.
        let button = rig.graph.create_node("info_button");
        rig.graph
            .set_local_position(button, at + Vec3::new(0.0, 0.0, -0.5));
        rig.ui.add(
            button,
            "i",
            0.3,
            UiAction::OpenInfo(find(EXAM_PROPS, "thermometer").unwrap()),
        );

        let mut grab = GrabSystem::new();
        let source = *rig.sources.get(hand).unwrap();
        let outcome = grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        assert!(matches!(outcome, PressOutcome::Ui(UiAction::OpenInfo(_))));
        assert_eq!(grab.held_by(hand), None);
    }

    #[test]
    fn seek_drives_velocity_toward_the_hold_point() {
        let mut rig = rig();
        let hand = rig.sources.add_controller(Handedness::Right);
        let start = prop_position(&rig);
        rig.sources.set_pose(hand, start, Quat::IDENTITY, 0.016);
        let mut grab = GrabSystem::new();
        let source = *rig.sources.get(hand).unwrap();
        grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );

        // Move the hand away; the prop should chase it, capped in speed.
        let goal = start + Vec3::new(2.0, 0.5, 0.0);
        rig.sources.set_pose(hand, goal, Quat::IDENTITY, 0.016);
        grab.update(&rig.sources, &rig.world, &mut rig.physics, &rig.cfg);

        let body = *rig.world.get::<&PhysicsBody>(rig.thermometer).unwrap();
        let velocity = rig.physics.linear_velocity(body.rigid_body).unwrap();
        assert!(velocity.length() <= rig.cfg.max_seek_speed + 1e-3);
        assert!(velocity.normalize().dot((goal - start).normalize()) > 0.99);
    }

    #[test]
    fn despawned_prop_drops_out_of_the_held_set() {
        let mut rig = rig();
        let hand = rig.sources.add_controller(Handedness::Right);
        rig.sources
            .set_pose(hand, prop_position(&rig), Quat::IDENTITY, 0.016);
        let mut grab = GrabSystem::new();
        let source = *rig.sources.get(hand).unwrap();
        grab.press(
            &source,
            &mut rig.world,
            &mut rig.graph,
            &mut rig.physics,
            &rig.ui,
            &rig.cfg,
        );
        rig.world.despawn(rig.thermometer).unwrap();
        // Must not panic; the hold is silently discarded.
        grab.update(&rig.sources, &rig.world, &mut rig.physics, &rig.cfg);
        assert_eq!(grab.held_by(hand), None);
    }
}
