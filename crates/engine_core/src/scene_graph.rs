//! Scene graph: a minimal transform hierarchy.
//!
//! Visual models, physics-wrapper anchors, UI button planes, and the camera rig
//! are all nodes in this graph. It deliberately stops at spatial structure
//! (parenting, world poses, visibility, billboard facing); rendering is the
//! host's job. Node handles are generational, so a handle kept across a scene
//! teardown fails liveness checks instead of touching a recycled slot.

use glam::{Quat, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneGraphError {
    #[error("node is disposed or invalid")]
    NodeDisposed,
    #[error("reparent would create a cycle")]
    WouldCycle,
}

/// Handle to a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// How a node reorients toward the active camera each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardMode {
    /// Keep authored rotation.
    #[default]
    None,
    /// Rotate around Y only (upright signs, held items).
    YAxis,
    /// Fully face the camera (info buttons, result images).
    All,
}

#[derive(Debug)]
struct Node {
    generation: u32,
    alive: bool,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local_position: Vec3,
    local_rotation: Quat,
    scale: Vec3,
    visible: bool,
    billboard: BillboardMode,
}

/// Arena of scene nodes with slot reuse.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    free: Vec<u32>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root-level node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        if let Some(index) = self.free.pop() {
            let node = &mut self.nodes[index as usize];
            node.alive = true;
            node.name = name;
            node.parent = None;
            node.children.clear();
            node.local_position = Vec3::ZERO;
            node.local_rotation = Quat::IDENTITY;
            node.scale = Vec3::ONE;
            node.visible = true;
            node.billboard = BillboardMode::None;
            NodeId {
                index,
                generation: node.generation,
            }
        } else {
            let index = self.nodes.len() as u32;
            self.nodes.push(Node {
                generation: 0,
                alive: true,
                name,
                parent: None,
                children: Vec::new(),
                local_position: Vec3::ZERO,
                local_rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                visible: true,
                billboard: BillboardMode::None,
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Create a node parented under `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneGraphError> {
        if !self.is_alive(parent) {
            return Err(SceneGraphError::NodeDisposed);
        }
        let child = self.create_node(name);
        self.nodes[child.index as usize].parent = Some(parent);
        self.nodes[parent.index as usize].children.push(child);
        Ok(child)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        let node = self.nodes.get(id.index as usize)?;
        (node.alive && node.generation == id.generation).then_some(node)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(id.index as usize)?;
        (node.alive && node.generation == id.generation).then_some(node)
    }

    /// Whether the handle still points at a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Dispose a node and its entire subtree. Disposing an already-dead handle
    /// is a no-op.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.nodes[id.index as usize].parent {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.dispose_subtree(id);
    }

    fn dispose_subtree(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.index as usize].children);
        for child in children {
            if self.is_alive(child) {
                self.dispose_subtree(child);
            }
        }
        let node = &mut self.nodes[id.index as usize];
        node.alive = false;
        node.generation = node.generation.wrapping_add(1);
        node.parent = None;
        self.free.push(id.index);
    }

    /// Number of live nodes (for teardown checks).
    pub fn alive_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    /// First live node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.alive && n.name == name)
            .map(|(index, n)| NodeId {
                index: index as u32,
                generation: n.generation,
            })
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    // ── Local pose ──────────────────────────────────────────────────────

    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(node) = self.get_mut(id) {
            node.local_position = position;
        }
    }

    pub fn local_position(&self, id: NodeId) -> Option<Vec3> {
        self.get(id).map(|n| n.local_position)
    }

    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        if let Some(node) = self.get_mut(id) {
            node.local_rotation = rotation;
        }
    }

    pub fn local_rotation(&self, id: NodeId) -> Option<Quat> {
        self.get(id).map(|n| n.local_rotation)
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(node) = self.get_mut(id) {
            node.scale = scale;
        }
    }

    pub fn scale(&self, id: NodeId) -> Option<Vec3> {
        self.get(id).map(|n| n.scale)
    }

    // ── World pose ──────────────────────────────────────────────────────

    /// World pose by walking the parent chain. Scale is visual-only and does not
    /// participate in hierarchy math.
    pub fn world_pose(&self, id: NodeId) -> Option<(Vec3, Quat)> {
        let mut node = self.get(id)?;
        let mut position = node.local_position;
        let mut rotation = node.local_rotation;
        while let Some(parent_id) = node.parent {
            let parent = self.get(parent_id)?;
            position = parent.local_position + parent.local_rotation * position;
            rotation = parent.local_rotation * rotation;
            node = parent;
        }
        Some((position, rotation))
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_pose(id).map(|(p, _)| p)
    }

    pub fn world_rotation(&self, id: NodeId) -> Option<Quat> {
        self.world_pose(id).map(|(_, r)| r)
    }

    /// Place a node at a world position, converting into its parent's frame.
    pub fn set_world_position(&mut self, id: NodeId, world: Vec3) {
        let local = match self.get(id).and_then(|n| n.parent) {
            Some(parent_id) => match self.world_pose(parent_id) {
                Some((ppos, prot)) => prot.inverse() * (world - ppos),
                None => return,
            },
            None => world,
        };
        self.set_local_position(id, local);
    }

    // ── Parenting ───────────────────────────────────────────────────────

    /// Reparent a node, leaving its local pose untouched.
    pub fn set_parent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<(), SceneGraphError> {
        if !self.is_alive(id) {
            return Err(SceneGraphError::NodeDisposed);
        }
        if let Some(parent) = new_parent {
            if !self.is_alive(parent) {
                return Err(SceneGraphError::NodeDisposed);
            }
            // Walk the ancestor chain of the new parent; `id` must not appear.
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(SceneGraphError::WouldCycle);
                }
                cursor = self.get(current).and_then(|n| n.parent);
            }
        }
        if let Some(old_parent) = self.nodes[id.index as usize].parent {
            if let Some(p) = self.get_mut(old_parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.nodes[id.index as usize].parent = new_parent;
        if let Some(parent) = new_parent {
            self.nodes[parent.index as usize].children.push(id);
        }
        Ok(())
    }

    /// Reparent a node while preserving its world pose (how a held item keeps
    /// its place when attached to or detached from a hand).
    pub fn set_parent_keep_world(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<(), SceneGraphError> {
        let (world_pos, world_rot) = self.world_pose(id).ok_or(SceneGraphError::NodeDisposed)?;
        self.set_parent(id, new_parent)?;
        let (local_pos, local_rot) = match new_parent {
            Some(parent) => {
                let (ppos, prot) = self.world_pose(parent).ok_or(SceneGraphError::NodeDisposed)?;
                (prot.inverse() * (world_pos - ppos), prot.inverse() * world_rot)
            }
            None => (world_pos, world_rot),
        };
        self.set_local_position(id, local_pos);
        self.set_local_rotation(id, local_rot);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    // ── Visibility & billboarding ───────────────────────────────────────

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.get(id).map(|n| n.visible).unwrap_or(false)
    }

    pub fn set_billboard(&mut self, id: NodeId, mode: BillboardMode) {
        if let Some(node) = self.get_mut(id) {
            node.billboard = mode;
        }
    }

    pub fn billboard(&self, id: NodeId) -> Option<BillboardMode> {
        self.get(id).map(|n| n.billboard)
    }

    /// Reorient every billboarded node toward the camera. Called once per tick.
    pub fn apply_billboards(&mut self, camera_position: Vec3) {
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alive && n.billboard != BillboardMode::None)
            .map(|(index, n)| NodeId {
                index: index as u32,
                generation: n.generation,
            })
            .collect();
        for id in ids {
            let Some((world_pos, _)) = self.world_pose(id) else {
                continue;
            };
            let mode = match self.get(id) {
                Some(n) => n.billboard,
                None => continue,
            };
            let mut to_camera = camera_position - world_pos;
            if mode == BillboardMode::YAxis {
                to_camera.y = 0.0;
            }
            if to_camera.length_squared() < 1e-8 {
                continue;
            }
            let world_rot = facing_rotation(to_camera.normalize());
            let local_rot = match self.get(id).and_then(|n| n.parent) {
                Some(parent) => match self.world_rotation(parent) {
                    Some(prot) => prot.inverse() * world_rot,
                    None => continue,
                },
                None => world_rot,
            };
            self.set_local_rotation(id, local_rot);
        }
    }
}

/// Rotation whose forward axis (-Z) points along `dir`.
fn facing_rotation(dir: Vec3) -> Quat {
    let forward = -dir;
    let dot = Vec3::Z.dot(forward);
    if dot < -0.9999 {
        Quat::from_rotation_y(std::f32::consts::PI)
    } else if dot > 0.9999 {
        Quat::IDENTITY
    } else {
        let axis = Vec3::Z.cross(forward).normalize();
        Quat::from_axis_angle(axis, dot.acos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_position_composes_through_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root");
        graph.set_local_position(root, Vec3::new(1.0, 0.0, 0.0));
        graph.set_local_rotation(root, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let child = graph.create_child(root, "child").unwrap();
        graph.set_local_position(child, Vec3::new(0.0, 0.0, -1.0));
        // Parent yawed 90° left: child's local -Z points along world -X.
        let world = graph.world_position(child).unwrap();
        assert!((world - Vec3::new(0.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn keep_world_reparent_preserves_pose() {
        let mut graph = SceneGraph::new();
        let hand = graph.create_node("hand");
        graph.set_local_position(hand, Vec3::new(2.0, 1.5, -3.0));
        let item = graph.create_node("item");
        graph.set_local_position(item, Vec3::new(2.1, 1.4, -3.0));

        graph.set_parent_keep_world(item, Some(hand)).unwrap();
        let held = graph.world_position(item).unwrap();
        assert!((held - Vec3::new(2.1, 1.4, -3.0)).length() < 1e-5);

        graph.set_parent_keep_world(item, None).unwrap();
        let dropped = graph.world_position(item).unwrap();
        assert!((dropped - Vec3::new(2.1, 1.4, -3.0)).length() < 1e-5);
    }

    #[test]
    fn dispose_kills_subtree_and_invalidates_handles() {
        let mut graph = SceneGraph::new();
        let wrapper = graph.create_node("wrapper");
        let visual = graph.create_child(wrapper, "visual").unwrap();
        assert_eq!(graph.alive_count(), 2);

        graph.dispose(wrapper);
        assert_eq!(graph.alive_count(), 0);
        assert!(!graph.is_alive(wrapper));
        assert!(!graph.is_alive(visual));

        // Slot reuse must not resurrect the old handle.
        let fresh = graph.create_node("fresh");
        assert!(graph.is_alive(fresh));
        assert!(!graph.is_alive(wrapper));
        assert!(graph.world_position(visual).is_none());
    }

    #[test]
    fn reparent_cycle_is_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_child(a, "b").unwrap();
        assert!(matches!(
            graph.set_parent(a, Some(b)),
            Err(SceneGraphError::WouldCycle)
        ));
    }

    #[test]
    fn billboard_faces_camera_in_yaw() {
        let mut graph = SceneGraph::new();
        let sign = graph.create_node("sign");
        graph.set_local_position(sign, Vec3::new(0.0, 1.0, 0.0));
        graph.set_billboard(sign, BillboardMode::YAxis);
        graph.apply_billboards(Vec3::new(0.0, 5.0, 4.0));
        let rot = graph.local_rotation(sign).unwrap();
        let forward = rot * -Vec3::Z;
        // Yaw-only mode: faces the camera in the horizontal plane.
        assert!(forward.y.abs() < 1e-4);
        assert!(forward.z > 0.99);
    }
}
