//! Tracked grab sources: the desktop pointer and VR controllers.
//!
//! Grab logic is written against this registry only, so it never sees whether a
//! press came from a mouse button or a controller trigger. The pointer source
//! always exists; controllers are registered if and when a VR session reports
//! them, and their absence simply leaves the desktop path in charge.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// Identity of a grab source. At most one prop can be held per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Desktop pointer, steered by the camera rig.
    Pointer,
    /// A VR controller grip.
    Controller(Handedness),
}

/// World-space state of one grab source for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct TrackedSource {
    pub id: SourceId,
    position: Vec3,
    orientation: Quat,
    velocity: Vec3,
    pressed: bool,
    pressed_edge: bool,
    released_edge: bool,
}

impl TrackedSource {
    fn new(id: SourceId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            pressed: false,
            pressed_edge: false,
            released_edge: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Velocity estimated from pose updates; used for throw impulses.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Forward ray direction for UI raycasting (-Z of the grip orientation).
    pub fn forward(&self) -> Vec3 {
        self.orientation * -Vec3::Z
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn pressed_this_frame(&self) -> bool {
        self.pressed_edge
    }

    pub fn released_this_frame(&self) -> bool {
        self.released_edge
    }
}

/// Registry of all live grab sources.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<TrackedSource>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    /// A fresh registry with the desktop pointer present.
    pub fn new() -> Self {
        Self {
            sources: vec![TrackedSource::new(SourceId::Pointer)],
        }
    }

    /// Register a VR controller. Idempotent: re-adding an existing hand
    /// returns the existing source.
    pub fn add_controller(&mut self, handedness: Handedness) -> SourceId {
        let id = SourceId::Controller(handedness);
        if self.get(id).is_none() {
            log::info!("controller detected: {:?}", handedness);
            self.sources.push(TrackedSource::new(id));
        }
        id
    }

    /// Whether any VR controller is registered (VR path active).
    pub fn has_controllers(&self) -> bool {
        self.sources
            .iter()
            .any(|s| matches!(s.id, SourceId::Controller(_)))
    }

    pub fn get(&self, id: SourceId) -> Option<&TrackedSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: SourceId) -> Option<&mut TrackedSource> {
        self.sources.iter_mut().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSource> {
        self.sources.iter()
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id).collect()
    }

    /// Clear per-frame edges. Call at the end of each frame.
    pub fn begin_frame(&mut self) {
        for source in &mut self.sources {
            source.pressed_edge = false;
            source.released_edge = false;
        }
    }

    /// Update a source's pose, estimating velocity from the previous pose.
    pub fn set_pose(&mut self, id: SourceId, position: Vec3, orientation: Quat, dt: f32) {
        if let Some(source) = self.get_mut(id) {
            if dt > 1e-6 {
                source.velocity = (position - source.position) / dt;
            }
            source.position = position;
            source.orientation = orientation;
        }
    }

    /// Report a press on a source. Only the transition edge fires.
    pub fn press(&mut self, id: SourceId) {
        if let Some(source) = self.get_mut(id) {
            if !source.pressed {
                source.pressed_edge = true;
            }
            source.pressed = true;
        }
    }

    /// Report a release on a source.
    pub fn release(&mut self, id: SourceId) {
        if let Some(source) = self.get_mut(id) {
            if source.pressed {
                source.released_edge = true;
            }
            source.pressed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_always_present() {
        let registry = SourceRegistry::new();
        assert!(registry.get(SourceId::Pointer).is_some());
        assert!(!registry.has_controllers());
    }

    #[test]
    fn press_edges_fire_on_transition_only() {
        let mut registry = SourceRegistry::new();
        registry.press(SourceId::Pointer);
        assert!(registry.get(SourceId::Pointer).unwrap().pressed_this_frame());
        registry.begin_frame();
        registry.press(SourceId::Pointer);
        // Held, not re-pressed.
        assert!(!registry.get(SourceId::Pointer).unwrap().pressed_this_frame());
        registry.release(SourceId::Pointer);
        assert!(registry.get(SourceId::Pointer).unwrap().released_this_frame());
    }

    #[test]
    fn pose_update_estimates_velocity() {
        let mut registry = SourceRegistry::new();
        let id = registry.add_controller(Handedness::Right);
        registry.set_pose(id, Vec3::ZERO, Quat::IDENTITY, 0.1);
        registry.set_pose(id, Vec3::new(0.5, 0.0, 0.0), Quat::IDENTITY, 0.1);
        let v = registry.get(id).unwrap().velocity();
        assert!((v.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn controller_registration_is_idempotent() {
        let mut registry = SourceRegistry::new();
        registry.add_controller(Handedness::Right);
        registry.add_controller(Handedness::Right);
        assert_eq!(registry.ids().len(), 2);
    }
}
