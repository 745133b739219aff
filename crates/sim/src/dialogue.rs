//! Narrator dialogue: a linear script revealed by a typewriter effect, with an
//! optional ready/not-ready branch ahead of a scene transition.
//!
//! `advance` is gated until the current text has fully revealed, so the player
//! cannot skip a step mid-type. Answering "not ready" shows an explanation and
//! then loops back to the question, an explicit cycle rather than a dead end.

use crate::config::SimConfig;

/// Scene switch requested by dialogue or UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    Menu,
    Showcase,
    Exam,
    Quit,
}

/// Character-by-character text reveal.
#[derive(Debug, Default)]
pub struct Typewriter {
    full: String,
    revealed: f32,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, text: &str) {
        self.full = text.to_string();
        self.revealed = 0.0;
    }

    /// Advance the reveal; returns true once the full text is shown.
    pub fn update(&mut self, dt: f32, chars_per_second: f32) -> bool {
        let total = self.full.chars().count() as f32;
        if self.revealed < total {
            self.revealed = (self.revealed + dt * chars_per_second).min(total);
        }
        self.revealed >= total
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.full.chars().count() as f32
    }

    /// The currently revealed prefix, on a char boundary.
    pub fn visible_text(&self) -> &str {
        let shown = self.revealed as usize;
        match self.full.char_indices().nth(shown) {
            Some((byte, _)) => &self.full[..byte],
            None => &self.full,
        }
    }
}

/// What the player does to leave a step.
#[derive(Debug, Clone, Copy)]
pub enum StepKind {
    /// A "Continue" click moves to the next step.
    Continue,
    /// Ready / not-ready / exit choice.
    Choice {
        /// Line typed after "ready", before departing.
        ready_text: &'static str,
        /// Where "ready" leads.
        destination: SceneRequest,
        /// Explanation typed after "not ready"; loops back to the question.
        /// `None` removes the button.
        not_ready_text: Option<&'static str>,
        /// Where the exit button leads, if present.
        exit: Option<SceneRequest>,
    },
    /// Terminal step: "Continue" departs to the given scene.
    Finish(SceneRequest),
}

#[derive(Debug, Clone, Copy)]
pub struct DialogueStep {
    pub title: &'static str,
    pub body: &'static str,
    pub kind: StepKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Typing,
    AwaitContinue,
    AwaitChoice,
    NotReadyTyping,
    NotReadyHold(f32),
    DepartTyping,
    Departing(f32),
    Finished,
}

/// Drives one scene's narrator script.
#[derive(Debug)]
pub struct DialogueDirector {
    steps: &'static [DialogueStep],
    step: usize,
    typewriter: Typewriter,
    phase: Phase,
    pending: Option<SceneRequest>,
    transition: Option<SceneRequest>,
}

impl DialogueDirector {
    pub fn new(steps: &'static [DialogueStep]) -> Self {
        debug_assert!(!steps.is_empty());
        let mut typewriter = Typewriter::new();
        typewriter.start(steps[0].body);
        Self {
            steps,
            step: 0,
            typewriter,
            phase: Phase::Typing,
            pending: None,
            transition: None,
        }
    }

    fn current(&self) -> &DialogueStep {
        &self.steps[self.step]
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn title(&self) -> &'static str {
        self.current().title
    }

    pub fn body_visible_text(&self) -> &str {
        self.typewriter.visible_text()
    }

    pub fn is_typing(&self) -> bool {
        matches!(
            self.phase,
            Phase::Typing | Phase::NotReadyTyping | Phase::DepartTyping
        )
    }

    /// Whether the "Continue" control currently accepts clicks.
    pub fn continue_enabled(&self) -> bool {
        self.phase == Phase::AwaitContinue
    }

    /// Whether the ready/not-ready buttons are currently shown.
    pub fn choice_visible(&self) -> bool {
        self.phase == Phase::AwaitChoice
    }

    pub fn update(&mut self, dt: f32, cfg: &SimConfig) {
        let cps = cfg.typing_chars_per_second;
        match self.phase {
            Phase::Typing => {
                if self.typewriter.update(dt, cps) {
                    self.phase = match self.current().kind {
                        StepKind::Choice { .. } => Phase::AwaitChoice,
                        _ => Phase::AwaitContinue,
                    };
                }
            }
            Phase::NotReadyTyping => {
                if self.typewriter.update(dt, cps) {
                    self.phase = Phase::NotReadyHold(cfg.not_ready_hold);
                }
            }
            Phase::NotReadyHold(remaining) => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    // Back to the question.
                    self.typewriter.start(self.current().body);
                    self.phase = Phase::Typing;
                } else {
                    self.phase = Phase::NotReadyHold(remaining);
                }
            }
            Phase::DepartTyping => {
                if self.typewriter.update(dt, cps) {
                    self.phase = Phase::Departing(cfg.depart_delay);
                }
            }
            Phase::Departing(remaining) => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.transition = self.pending.take();
                    self.phase = Phase::Finished;
                } else {
                    self.phase = Phase::Departing(remaining);
                }
            }
            Phase::AwaitContinue | Phase::AwaitChoice | Phase::Finished => {}
        }
    }

    /// Continue click. No-op while text is revealing or a choice is pending.
    pub fn advance(&mut self) {
        if self.phase != Phase::AwaitContinue {
            return;
        }
        match self.current().kind {
            StepKind::Continue => {
                if self.step + 1 < self.steps.len() {
                    self.step += 1;
                    self.typewriter.start(self.current().body);
                    self.phase = Phase::Typing;
                }
            }
            StepKind::Finish(destination) => {
                self.transition = Some(destination);
                self.phase = Phase::Finished;
            }
            StepKind::Choice { .. } => {}
        }
    }

    /// "Ready" click: type the departure line, then transition.
    pub fn choose_ready(&mut self) {
        if self.phase != Phase::AwaitChoice {
            return;
        }
        if let StepKind::Choice {
            ready_text,
            destination,
            ..
        } = self.current().kind
        {
            self.pending = Some(destination);
            self.typewriter.start(ready_text);
            self.phase = Phase::DepartTyping;
        }
    }

    /// "Not ready" click: type the explanation, then return to the question.
    pub fn choose_not_ready(&mut self) {
        if self.phase != Phase::AwaitChoice {
            return;
        }
        if let StepKind::Choice {
            not_ready_text: Some(text),
            ..
        } = self.current().kind
        {
            self.typewriter.start(text);
            self.phase = Phase::NotReadyTyping;
        }
    }

    /// Exit click, where the script offers one.
    pub fn choose_exit(&mut self) {
        if self.phase != Phase::AwaitChoice {
            return;
        }
        if let StepKind::Choice {
            exit: Some(destination),
            ..
        } = self.current().kind
        {
            self.transition = Some(destination);
            self.phase = Phase::Finished;
        }
    }

    /// Consume a requested scene transition.
    pub fn take_transition(&mut self) -> Option<SceneRequest> {
        self.transition.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &[DialogueStep] = &[
        DialogueStep {
            title: "Welcome",
            body: "Hello, future doctor!",
            kind: StepKind::Continue,
        },
        DialogueStep {
            title: "",
            body: "Ready to begin the simulation?",
            kind: StepKind::Choice {
                ready_text: "Good. Off we go.",
                destination: SceneRequest::Exam,
                not_ready_text: Some("Take your time and look around first."),
                exit: Some(SceneRequest::Quit),
            },
        },
    ];

    const LINEAR: &[DialogueStep] = &[DialogueStep {
        title: "",
        body: "Done!",
        kind: StepKind::Finish(SceneRequest::Menu),
    }];

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    fn finish_typing(d: &mut DialogueDirector) {
        for _ in 0..600 {
            if !d.is_typing() {
                break;
            }
            d.update(0.1, &cfg());
        }
    }

    #[test]
    fn advance_is_noop_while_typing() {
        let mut d = DialogueDirector::new(SCRIPT);
        assert!(d.is_typing());
        d.advance();
        assert_eq!(d.step_index(), 0);
        finish_typing(&mut d);
        assert!(d.continue_enabled());
        d.advance();
        assert_eq!(d.step_index(), 1);
    }

    #[test]
    fn typewriter_reveals_prefixes() {
        let mut tw = Typewriter::new();
        tw.start("abcdef");
        tw.update(0.1, 30.0); // 3 characters
        assert_eq!(tw.visible_text(), "abc");
        tw.update(10.0, 30.0);
        assert_eq!(tw.visible_text(), "abcdef");
        assert!(tw.is_done());
    }

    #[test]
    fn not_ready_loops_back_to_the_question() {
        let mut d = DialogueDirector::new(SCRIPT);
        finish_typing(&mut d);
        d.advance();
        finish_typing(&mut d);
        assert!(d.choice_visible());

        d.choose_not_ready();
        assert!(d.is_typing());
        finish_typing(&mut d);
        // Hold, then the question types again.
        for _ in 0..100 {
            d.update(0.1, &cfg());
        }
        assert!(d.choice_visible());
        assert!(d.take_transition().is_none());
    }

    #[test]
    fn ready_departs_after_delay() {
        let mut d = DialogueDirector::new(SCRIPT);
        finish_typing(&mut d);
        d.advance();
        finish_typing(&mut d);
        d.choose_ready();
        for _ in 0..200 {
            d.update(0.1, &cfg());
        }
        assert_eq!(d.take_transition(), Some(SceneRequest::Exam));
        // Consumed once.
        assert!(d.take_transition().is_none());
    }

    #[test]
    fn exit_choice_fires_immediately() {
        let mut d = DialogueDirector::new(SCRIPT);
        finish_typing(&mut d);
        d.advance();
        finish_typing(&mut d);
        d.choose_exit();
        assert_eq!(d.take_transition(), Some(SceneRequest::Quit));
    }

    #[test]
    fn finish_step_requests_transition_on_continue() {
        let mut d = DialogueDirector::new(LINEAR);
        finish_typing(&mut d);
        d.advance();
        assert_eq!(d.take_transition(), Some(SceneRequest::Menu));
    }
}
