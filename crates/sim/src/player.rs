//! Camera rig: first-person movement for the desktop path and the anchor the
//! desktop pointer's hold point hangs from.

use crate::config::SimConfig;
use engine_core::{NodeId, SceneGraph, Vec3};
use glam::Quat;
use input::InputState;

#[derive(Debug)]
pub struct CameraRig {
    pub node: NodeId,
    yaw: f32,
    pitch: f32,
}

impl CameraRig {
    pub fn new(graph: &mut SceneGraph, position: Vec3) -> Self {
        let node = graph.create_node("camera");
        graph.set_local_position(node, position);
        Self {
            node,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn position(&self, graph: &SceneGraph) -> Vec3 {
        graph.world_position(self.node).unwrap_or(Vec3::ZERO)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::Z
    }

    /// Hold point for the desktop pointer, straight ahead of the camera.
    pub fn pointer_anchor(&self, graph: &SceneGraph, reach: f32) -> Vec3 {
        self.position(graph) + self.forward() * reach
    }

    /// Teleport the rig (scene start poses, scripted walkthrough moves).
    pub fn set_pose(&mut self, graph: &mut SceneGraph, position: Vec3, yaw: f32, pitch: f32) {
        graph.set_local_position(self.node, position);
        self.yaw = yaw;
        self.pitch = pitch;
        graph.set_local_rotation(self.node, self.rotation());
    }

    /// Apply WASD walking and mouse look for one tick. Movement stays in the
    /// horizontal plane; there is no flying.
    pub fn update_from_input(
        &mut self,
        graph: &mut SceneGraph,
        input: &InputState,
        dt: f32,
        cfg: &SimConfig,
    ) {
        let look = input.mouse_delta();
        self.yaw -= look.x * cfg.look_sensitivity;
        self.pitch = (self.pitch - look.y * cfg.look_sensitivity).clamp(-1.4, 1.4);

        let movement = input.get_movement_input();
        if movement.length_squared() > 0.0 {
            let yaw_rot = Quat::from_rotation_y(self.yaw);
            let forward = yaw_rot * -Vec3::Z;
            let right = yaw_rot * Vec3::X;
            let delta = (forward * movement.y + right * movement.x) * cfg.walk_speed * dt;
            let position = self.position(graph) + Vec3::new(delta.x, 0.0, delta.z);
            graph.set_local_position(self.node, position);
        }
        graph.set_local_rotation(self.node, self.rotation());
    }
}
