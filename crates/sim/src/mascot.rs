//! The mascot assistant: a small guide character that floats beside the
//! player, keeps eye contact, and answers a click with a canned reply.

use engine_core::{NodeId, SceneGraph, Vec3};
use glam::Quat;
use rand::seq::SliceRandom;
use rand::Rng;

const REPLIES: &[&str] = &[
    "Good question! Take a close look at the instrument first.",
    "Every tool here has an info button. Press it to learn more.",
    "Take your time. The patient isn't going anywhere.",
    "When you feel ready, we'll head to the examination room.",
];

/// Camera-following assistant.
#[derive(Debug)]
pub struct Mascot {
    pub pivot: NodeId,
    /// Offset from the camera the mascot drifts toward.
    offset: Vec3,
    /// Lerp factor per tick for the follow motion.
    follow_rate: f32,
}

impl Mascot {
    pub fn new(pivot: NodeId) -> Self {
        Self {
            pivot,
            offset: Vec3::new(-1.6, -1.5, 1.2),
            follow_rate: 0.05,
        }
    }

    /// Drift toward the camera-relative anchor and face the player. Safe
    /// no-op once the pivot is disposed.
    pub fn update(&self, graph: &mut SceneGraph, camera_position: Vec3) {
        let Some(current) = graph.world_position(self.pivot) else {
            return;
        };
        let target = camera_position + self.offset;
        let position = current.lerp(target, self.follow_rate);
        graph.set_world_position(self.pivot, position);

        // Face the player in the horizontal plane only.
        let mut look = camera_position - position;
        look.y = 0.0;
        if look.length_squared() > 1e-6 {
            let yaw = look.x.atan2(look.z);
            graph.set_local_rotation(self.pivot, Quat::from_rotation_y(yaw));
        }
    }

    /// A canned reply to a question click.
    pub fn reply(rng: &mut impl Rng) -> &'static str {
        REPLIES
            .choose(rng)
            .copied()
            .unwrap_or("Happy to help!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mascot_drifts_toward_the_camera_anchor() {
        let mut graph = SceneGraph::new();
        let pivot = graph.create_node("mascot");
        let mascot = Mascot::new(pivot);
        let camera = Vec3::new(4.0, 2.0, 4.0);
        let start = graph.world_position(pivot).unwrap();
        for _ in 0..200 {
            mascot.update(&mut graph, camera);
        }
        let settled = graph.world_position(pivot).unwrap();
        let anchor = camera + Vec3::new(-1.6, -1.5, 1.2);
        assert!((settled - anchor).length() < (start - anchor).length());
        assert!((settled - anchor).length() < 0.05);
    }

    #[test]
    fn disposed_pivot_is_a_noop() {
        let mut graph = SceneGraph::new();
        let pivot = graph.create_node("mascot");
        let mascot = Mascot::new(pivot);
        graph.dispose(pivot);
        mascot.update(&mut graph, Vec3::ONE);
    }
}
