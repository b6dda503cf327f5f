//! Blocking yes/no confirmation.

use std::collections::VecDeque;

/// Asks the initiating player a yes/no question.
pub trait Prompter {
    fn yes_no(&mut self, question: &str) -> bool;
}

/// Answers yes to everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysYes;

impl Prompter for AlwaysYes {
    fn yes_no(&mut self, _question: &str) -> bool {
        true
    }
}

/// Answers no to everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysNo;

impl Prompter for AlwaysNo {
    fn yes_no(&mut self, _question: &str) -> bool {
        false
    }
}

/// Replays queued answers and records every question asked.
///
/// Once the queue runs dry it answers `fallback`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    fallback: bool,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: false,
            asked: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn yes_no(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}
