//! Overlay state: measurement reading labels, 2D result billboards, and the
//! timed on-screen message log.
//!
//! This is pure presentation state; the host GUI reads it each frame. Labels
//! are keyed by body-site name; billboards are named nodes so a new result
//! image replaces a previous one with the same name.

use engine_core::{BillboardMode, NodeId, SceneGraph, Vec3};
use std::collections::HashMap;

/// A reading shown next to a measurement target ("36.4°C" and friends).
#[derive(Debug, Clone)]
pub struct ReadingLabel {
    pub text: String,
    pub color: [f32; 4],
    pub visible: bool,
}

/// One on-screen message line.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub color: [f32; 4],
    pub time_remaining: f32,
}

/// Timed, color-coded event log displayed over the scene.
#[derive(Debug)]
pub struct MessageLog {
    pub messages: Vec<Message>,
    pub max_visible: usize,
    default_duration: f32,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            max_visible: 8,
            default_duration: 6.0,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, color: [f32; 4]) {
        let text = text.into();
        log::info!("{}", text);
        self.messages.push(Message {
            text,
            color,
            time_remaining: self.default_duration,
        });
        if self.messages.len() > 50 {
            self.messages.remove(0);
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 1.0, 1.0, 1.0]);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(text, [0.3, 1.0, 0.3, 1.0]);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 0.9, 0.3, 1.0]);
    }

    pub fn update(&mut self, dt: f32) {
        for msg in &mut self.messages {
            msg.time_remaining -= dt;
        }
        self.messages.retain(|m| m.time_remaining > 0.0);
    }
}

/// All overlay state for the active scene.
#[derive(Debug, Default)]
pub struct Overlay {
    readings: HashMap<&'static str, ReadingLabel>,
    billboards: HashMap<String, NodeId>,
    pub messages: MessageLog,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_reading(&mut self, site: &'static str, text: impl Into<String>, color: [f32; 4]) {
        self.readings.insert(
            site,
            ReadingLabel {
                text: text.into(),
                color,
                visible: true,
            },
        );
    }

    pub fn hide_reading(&mut self, site: &'static str) {
        if let Some(label) = self.readings.get_mut(site) {
            label.visible = false;
        }
    }

    pub fn reading(&self, site: &str) -> Option<&ReadingLabel> {
        self.readings.get(site)
    }

    pub fn is_reading_visible(&self, site: &str) -> bool {
        self.readings.get(site).map(|l| l.visible).unwrap_or(false)
    }

    /// Show a 2D result image on a camera-facing plane. A billboard with the
    /// same name is disposed and replaced.
    pub fn show_billboard(
        &mut self,
        graph: &mut SceneGraph,
        name: &str,
        image: &str,
        position: Vec3,
    ) {
        if let Some(old) = self.billboards.remove(name) {
            graph.dispose(old);
        }
        let node = graph.create_node(image.to_string());
        graph.set_local_position(node, position);
        graph.set_billboard(node, BillboardMode::All);
        self.billboards.insert(name.to_string(), node);
    }

    pub fn has_billboard(&self, name: &str) -> bool {
        self.billboards.contains_key(name)
    }

    /// Remove all result billboards (reset action).
    pub fn clear_billboards(&mut self, graph: &mut SceneGraph) {
        for (_, node) in self.billboards.drain() {
            graph.dispose(node);
        }
    }

    /// Hide readings and remove billboards in one pass.
    pub fn clear_results(&mut self, graph: &mut SceneGraph) {
        for label in self.readings.values_mut() {
            label.visible = false;
        }
        self.clear_billboards(graph);
    }

    pub fn update(&mut self, dt: f32) {
        self.messages.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billboard_with_same_name_is_replaced() {
        let mut overlay = Overlay::new();
        let mut graph = SceneGraph::new();
        overlay.show_billboard(&mut graph, "head_result", "body_temperature.png", Vec3::ZERO);
        assert_eq!(graph.alive_count(), 1);
        overlay.show_billboard(&mut graph, "head_result", "body_temperature.png", Vec3::ONE);
        // Old plane disposed, not leaked.
        assert_eq!(graph.alive_count(), 1);
        assert!(overlay.has_billboard("head_result"));
    }

    #[test]
    fn messages_expire() {
        let mut log = MessageLog::new();
        log.info("measurement complete");
        assert_eq!(log.messages.len(), 1);
        log.update(7.0);
        assert!(log.messages.is_empty());
    }

    #[test]
    fn clear_results_hides_labels_and_drops_billboards() {
        let mut overlay = Overlay::new();
        let mut graph = SceneGraph::new();
        overlay.show_reading("head", "36.4°C", [1.0, 1.0, 0.2, 1.0]);
        overlay.show_billboard(&mut graph, "head_result", "body_temperature.png", Vec3::ZERO);
        overlay.clear_results(&mut graph);
        assert!(!overlay.is_reading_visible("head"));
        assert!(!overlay.has_billboard("head_result"));
        assert_eq!(graph.alive_count(), 0);
    }
}
