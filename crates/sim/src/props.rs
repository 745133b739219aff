//! Prop instances: the runtime pairing of an invisible physics wrapper and the
//! visual model parented beneath it.
//!
//! Imported visual meshes have arbitrary scale and pivots, so physics always
//! runs on a plain box "wrapper" body and the model hangs under the wrapper
//! node with a local offset.

use crate::assets::AssetLibrary;
use crate::catalog::PropDefinition;
use anyhow::Result;
use engine_core::{Entity, NodeId, SceneGraph, Vec3, World};
use glam::Quat;
use input::SourceId;
use physics::{PhysicsBody, PhysicsWorld, PropBodyParams};

/// Marker linking an entity back to its catalog definition.
#[derive(Debug, Clone, Copy)]
pub struct Prop {
    pub def: &'static PropDefinition,
}

/// Scene-graph nodes belonging to a prop.
#[derive(Debug, Clone, Copy)]
pub struct PropNodes {
    /// Invisible wrapper carrying the physics pose.
    pub wrapper: NodeId,
    /// Visual model under the wrapper.
    pub visual: NodeId,
    /// Alternate held visual (chestpiece swap), hidden while resting.
    pub held_swap: Option<NodeId>,
}

/// Body parameters captured at grab time and restored verbatim on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedBodyParams {
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
}

/// The two-state grab lifecycle of a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabPhase {
    Resting,
    Held(SourceId),
}

/// Grab bookkeeping attached to every grabbable prop.
#[derive(Debug, Clone, Copy)]
pub struct Grabbable {
    pub phase: GrabPhase,
    /// Seconds until the prop is pickable again after a release.
    pub cooldown: f32,
    /// Set while a measurement sequence owns the prop.
    pub locked: bool,
    pub saved: Option<SavedBodyParams>,
    pub highlighted: bool,
    /// Scripted landing pose the reset action returns the prop to.
    pub home_position: Vec3,
    pub home_rotation: Quat,
}

impl Grabbable {
    pub fn new(home_position: Vec3, home_rotation: Quat) -> Self {
        Self {
            phase: GrabPhase::Resting,
            cooldown: 0.0,
            locked: false,
            saved: None,
            highlighted: false,
            home_position,
            home_rotation,
        }
    }

    pub fn is_pickable(&self) -> bool {
        self.phase == GrabPhase::Resting && self.cooldown <= 0.0 && !self.locked
    }
}

/// Spawn one prop from its definition. Fixtures get a node tree only; physical
/// props also get a wrapper body. Errors (unknown asset) are returned so the
/// scene builder can skip the prop without aborting the rest of the scene.
pub fn spawn_prop(
    world: &mut World,
    graph: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    assets: &AssetLibrary,
    def: &'static PropDefinition,
) -> Result<Entity> {
    let wrapper = graph.create_node(def.id);
    graph.set_local_position(wrapper, def.position);
    graph.set_local_rotation(wrapper, def.rotation());
    graph.set_visible(wrapper, false);

    let visual = match assets.instantiate(graph, wrapper, def.asset) {
        Ok(node) => node,
        Err(e) => {
            graph.dispose(wrapper);
            return Err(e);
        }
    };
    graph.set_local_position(visual, def.visual_offset);
    graph.set_scale(visual, def.scale);

    let held_swap = match def.held_swap_asset {
        Some(asset) => {
            let node = assets.instantiate(graph, wrapper, asset)?;
            graph.set_scale(node, def.scale);
            graph.set_visible(node, false);
            Some(node)
        }
        None => None,
    };

    let nodes = PropNodes {
        wrapper,
        visual,
        held_swap,
    };

    let entity = match def.physics {
        Some(params) => {
            let (body, collider) = physics.add_prop_body(
                def.position,
                def.rotation(),
                def.half_extents,
                PropBodyParams {
                    mass: params.mass,
                    restitution: params.restitution,
                    friction: params.friction,
                },
            );
            world.spawn((
                Prop { def },
                nodes,
                PhysicsBody::new(body, collider),
                Grabbable::new(def.position, def.rotation()),
            ))
        }
        None => world.spawn((Prop { def }, nodes)),
    };
    log::debug!("spawned prop {}", def.id);
    Ok(entity)
}

/// Copy body poses onto wrapper nodes so visuals, info buttons, and UI anchors
/// track the simulation. Runs after the physics step.
pub fn sync_prop_nodes(world: &mut World, graph: &mut SceneGraph, physics: &PhysicsWorld) {
    for (_, (nodes, body)) in world.query_mut::<(&PropNodes, &PhysicsBody)>() {
        let Some(position) = physics.body_position(body.rigid_body) else {
            continue;
        };
        let Some(rotation) = physics.body_rotation(body.rigid_body) else {
            continue;
        };
        graph.set_local_position(nodes.wrapper, position);
        graph.set_local_rotation(nodes.wrapper, rotation);
    }
}

/// Teleport a prop back to its scripted landing pose with physics state
/// restored and the grab immediately re-armed.
pub fn reset_prop(
    world: &mut World,
    graph: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    entity: Entity,
) {
    let Ok((grabbable, body, nodes)) = world
        .query_one_mut::<(&mut Grabbable, &PhysicsBody, &PropNodes)>(entity)
    else {
        return;
    };
    if let Some(saved) = grabbable.saved.take() {
        physics.set_linear_damping(body.rigid_body, saved.linear_damping);
        physics.set_angular_damping(body.rigid_body, saved.angular_damping);
        physics.set_gravity_scale(body.rigid_body, saved.gravity_scale);
    }
    physics.set_body_pose(body.rigid_body, grabbable.home_position, grabbable.home_rotation);
    grabbable.phase = GrabPhase::Resting;
    grabbable.cooldown = 0.0;
    grabbable.locked = false;
    grabbable.highlighted = false;
    graph.set_visible(nodes.visual, true);
    if let Some(swap) = nodes.held_swap {
        graph.set_visible(swap, false);
    }
}

/// Tick release cooldowns toward re-arming.
pub fn tick_cooldowns(world: &mut World, dt: f32) {
    for (_, grabbable) in world.query_mut::<&mut Grabbable>() {
        if grabbable.cooldown > 0.0 {
            grabbable.cooldown = (grabbable.cooldown - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EXAM_PROPS;

    #[test]
    fn spawn_creates_wrapper_and_body() {
        let mut world = World::new();
        let mut graph = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let assets = AssetLibrary::with_standard_assets();
        let def = crate::catalog::find(EXAM_PROPS, "thermometer").unwrap();

        let entity = spawn_prop(&mut world, &mut graph, &mut physics, &assets, def).unwrap();
        let body = *world.get::<&PhysicsBody>(entity).unwrap();
        assert_eq!(physics.body_position(body.rigid_body), Some(def.position));
        let nodes = *world.get::<&PropNodes>(entity).unwrap();
        assert!(graph.is_alive(nodes.wrapper));
        assert!(graph.is_alive(nodes.visual));
    }

    #[test]
    fn stethoscope_spawns_hidden_chestpiece() {
        let mut world = World::new();
        let mut graph = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let assets = AssetLibrary::with_standard_assets();
        let def = crate::catalog::find(EXAM_PROPS, "stethoscope").unwrap();

        let entity = spawn_prop(&mut world, &mut graph, &mut physics, &assets, def).unwrap();
        let nodes = *world.get::<&PropNodes>(entity).unwrap();
        let swap = nodes.held_swap.expect("chestpiece node");
        assert!(!graph.is_visible(swap));
        assert!(graph.is_visible(nodes.visual));
    }

    #[test]
    fn cooldown_ticks_to_zero_and_rearms() {
        let mut world = World::new();
        let entity = world.spawn((Grabbable::new(Vec3::ZERO, Quat::IDENTITY),));
        {
            let mut g = world.get::<&mut Grabbable>(entity).unwrap();
            g.cooldown = 1.5;
            assert!(!g.is_pickable());
        }
        // 1499 ms: still cooling down.
        tick_cooldowns(&mut world, 1.499);
        assert!(!world.get::<&Grabbable>(entity).unwrap().is_pickable());
        // 1501 ms total: pickable again.
        tick_cooldowns(&mut world, 0.002);
        assert!(world.get::<&Grabbable>(entity).unwrap().is_pickable());
    }
}
