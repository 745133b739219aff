//! World-space UI buttons: the "i" info discs above each showcase item, the
//! reset and lobby buttons in the exam room, and the mascot's talk zone.
//!
//! Buttons are scene-graph nodes with a spherical hit volume. The grab
//! controller runs a ray against these before attempting any pick-up, so UI
//! always wins over grabbing.

use crate::catalog::PropDefinition;
use engine_core::{NodeId, SceneGraph, Vec3};

/// What a button does when clicked.
#[derive(Debug, Clone, Copy)]
pub enum UiAction {
    /// Open the info panel for a prop.
    OpenInfo(&'static PropDefinition),
    /// Return every exam instrument to its start pose.
    ResetItems,
    /// Leave the exam room for the lobby (menu scene).
    GoToLobby,
    /// Ask the mascot assistant a question.
    AskMascot,
}

#[derive(Debug, Clone, Copy)]
pub struct UiButton {
    pub node: NodeId,
    pub label: &'static str,
    /// Hit-sphere radius around the button node, meters.
    pub radius: f32,
    pub action: UiAction,
}

/// All clickable world-space buttons of the active scene.
#[derive(Debug, Default)]
pub struct UiButtons {
    buttons: Vec<UiButton>,
}

impl UiButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: NodeId, label: &'static str, radius: f32, action: UiAction) {
        self.buttons.push(UiButton {
            node,
            label,
            radius,
            action,
        });
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Ray/sphere test against all buttons; returns the action of the nearest
    /// hit. Buttons whose nodes were disposed are skipped.
    pub fn hit_test(
        &self,
        graph: &SceneGraph,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<UiAction> {
        let mut best: Option<(f32, UiAction)> = None;
        for button in &self.buttons {
            let Some(center) = graph.world_position(button.node) else {
                continue;
            };
            let to_center = center - origin;
            let along = to_center.dot(direction);
            if along < 0.0 || along > max_distance {
                continue;
            }
            let closest = to_center - direction * along;
            if closest.length() > button.radius {
                continue;
            }
            if best.map(|(d, _)| along < d).unwrap_or(true) {
                best = Some((along, button.action));
            }
        }
        best.map(|(_, action)| action)
    }
}
