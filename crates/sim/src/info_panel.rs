//! The "more info" panel: description, question list, and answers for a prop.
//!
//! A single panel exists process-wide. Opening it for a new prop fully resets
//! any prior state; invalid transitions are ignored rather than advancing.

use crate::catalog::{PropDefinition, QaPair};
use engine_core::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPanelState {
    Hidden,
    Description,
    QuestionList,
    /// Showing the answer to question index `.0`.
    Answer(usize),
}

#[derive(Debug)]
pub struct InfoPanel {
    state: InfoPanelState,
    def: Option<&'static PropDefinition>,
    /// Camera-anchored plane the panel renders on.
    node: Option<NodeId>,
}

impl Default for InfoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoPanel {
    pub fn new() -> Self {
        Self {
            state: InfoPanelState::Hidden,
            def: None,
            node: None,
        }
    }

    /// Attach the panel to its plane node (created by the scene builder).
    pub fn set_node(&mut self, node: NodeId) {
        self.node = Some(node);
    }

    pub fn state(&self) -> InfoPanelState {
        self.state
    }

    pub fn current_prop(&self) -> Option<&'static PropDefinition> {
        self.def
    }

    /// Open for a prop. Always lands on the description, dropping whatever the
    /// panel was showing before.
    pub fn open(&mut self, def: &'static PropDefinition, graph: &mut SceneGraph) {
        self.def = Some(def);
        self.state = InfoPanelState::Description;
        if let Some(node) = self.node {
            graph.set_visible(node, true);
        }
    }

    /// Description → question list. Ignored unless the prop has questions.
    pub fn advance(&mut self) {
        if self.state != InfoPanelState::Description {
            return;
        }
        if self.def.map(|d| !d.qa.is_empty()).unwrap_or(false) {
            self.state = InfoPanelState::QuestionList;
        }
    }

    /// Question list → answer. Ignored from any other state or for an index
    /// out of range.
    pub fn select_question(&mut self, index: usize) {
        if self.state != InfoPanelState::QuestionList {
            return;
        }
        let count = self.def.map(|d| d.qa.len()).unwrap_or(0);
        if index < count {
            self.state = InfoPanelState::Answer(index);
        }
    }

    /// Answer → back to the question list.
    pub fn ask_again(&mut self) {
        if matches!(self.state, InfoPanelState::Answer(_)) {
            self.state = InfoPanelState::QuestionList;
        }
    }

    /// Any state → hidden.
    pub fn close(&mut self, graph: &mut SceneGraph) {
        self.state = InfoPanelState::Hidden;
        self.def = None;
        if let Some(node) = self.node {
            graph.set_visible(node, false);
        }
    }

    pub fn title(&self) -> Option<&'static str> {
        self.def.map(|d| d.title)
    }

    /// Body text for the current state: description, question prompt, or the
    /// selected answer.
    pub fn body_text(&self) -> Option<&'static str> {
        let def = self.def?;
        match self.state {
            InfoPanelState::Hidden => None,
            InfoPanelState::Description => Some(def.description),
            InfoPanelState::QuestionList => Some("Choose a question below:"),
            InfoPanelState::Answer(i) => def.qa.get(i).map(|qa| qa.answer),
        }
    }

    /// Questions listed while in the question-list state.
    pub fn questions(&self) -> &'static [QaPair] {
        match (self.state, self.def) {
            (InfoPanelState::QuestionList, Some(def)) => def.qa,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{find, SHOWCASE_PROPS};

    fn panel_with(id: &str) -> (InfoPanel, SceneGraph) {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("info_panel");
        let mut panel = InfoPanel::new();
        panel.set_node(node);
        panel.open(find(SHOWCASE_PROPS, id).unwrap(), &mut graph);
        (panel, graph)
    }

    #[test]
    fn full_cycle_description_to_answer_and_back() {
        let (mut panel, mut graph) = panel_with("stethoscope");
        assert_eq!(panel.state(), InfoPanelState::Description);
        panel.advance();
        assert_eq!(panel.state(), InfoPanelState::QuestionList);
        assert_eq!(panel.questions().len(), 3);
        panel.select_question(1);
        assert_eq!(panel.state(), InfoPanelState::Answer(1));
        panel.ask_again();
        assert_eq!(panel.state(), InfoPanelState::QuestionList);
        panel.close(&mut graph);
        assert_eq!(panel.state(), InfoPanelState::Hidden);
    }

    #[test]
    fn select_question_from_description_is_ignored() {
        let (mut panel, _graph) = panel_with("stethoscope");
        panel.select_question(0);
        // Must not skip past the question list.
        assert_eq!(panel.state(), InfoPanelState::Description);
    }

    #[test]
    fn out_of_range_question_is_ignored() {
        let (mut panel, _graph) = panel_with("stethoscope");
        panel.advance();
        panel.select_question(99);
        assert_eq!(panel.state(), InfoPanelState::QuestionList);
    }

    #[test]
    fn reopening_resets_prior_state() {
        let (mut panel, mut graph) = panel_with("stethoscope");
        panel.advance();
        panel.select_question(0);
        // Opening another prop lands back on its description, with no leaked
        // question list from the previous prop.
        panel.open(find(SHOWCASE_PROPS, "gauze").unwrap(), &mut graph);
        assert_eq!(panel.state(), InfoPanelState::Description);
        assert_eq!(panel.current_prop().unwrap().id, "gauze");
        assert!(panel.questions().is_empty());
    }

    #[test]
    fn prop_without_questions_cannot_advance() {
        let mut graph = SceneGraph::new();
        let mut panel = InfoPanel::new();
        panel.open(find(SHOWCASE_PROPS, "iv_stand").unwrap(), &mut graph);
        panel.advance();
        assert_eq!(panel.state(), InfoPanelState::Description);
    }
}
