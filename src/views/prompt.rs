//! Interactive prompts
//!
//! Confirmation dialogs and free-text prompts behind a trait, so views can be
//! driven by a terminal, a script, or a test.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Asks the admin for decisions and input
pub trait Prompter: Send + Sync {
    /// Yes/no confirmation
    fn confirm(&self, question: &str) -> bool;

    /// Free text; `None` when the admin dismisses the prompt
    fn prompt(&self, question: &str) -> Option<String>;
}

/// Reads answers from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(question: &str) -> Option<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", question).ok()?;
        stdout.flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> bool {
        Self::read_line(&format!("{} [y/N]", question))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn prompt(&self, question: &str) -> Option<String> {
        Self::read_line(question)
    }
}

/// Answers from a fixed script; used for non-interactive commands and tests
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<bool>>,
    answers: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirm every question
    pub fn accepting() -> Self {
        Self::new().confirm_with(true)
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        if let Ok(mut confirms) = self.confirms.lock() {
            confirms.push_back(answer);
        }
        self
    }

    pub fn answer(self, text: impl Into<String>) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(Some(text.into()));
        }
        self
    }

    pub fn dismiss(self) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(None);
        }
        self
    }

    /// Questions asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn record(&self, question: &str) {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> bool {
        self.record(question);
        let mut confirms = match self.confirms.lock() {
            Ok(c) => c,
            Err(_) => return false,
        };
        // The last scripted answer repeats once the script runs out
        match confirms.len() {
            0 => false,
            1 => confirms[0],
            _ => confirms.pop_front().unwrap_or(false),
        }
    }

    fn prompt(&self, question: &str) -> Option<String> {
        self.record(question);
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .flatten()
    }
}

/// Answers prompts from values supplied up front, in order; a missing value
/// is asked of the fallback instead
pub struct PresetPrompter<P> {
    presets: Mutex<VecDeque<Option<String>>>,
    fallback: P,
}

impl<P: Prompter> PresetPrompter<P> {
    pub fn new(presets: impl IntoIterator<Item = Option<String>>, fallback: P) -> Self {
        Self {
            presets: Mutex::new(presets.into_iter().collect()),
            fallback,
        }
    }
}

impl<P: Prompter> Prompter for PresetPrompter<P> {
    fn confirm(&self, question: &str) -> bool {
        self.fallback.confirm(question)
    }

    fn prompt(&self, question: &str) -> Option<String> {
        let preset = self
            .presets
            .lock()
            .ok()
            .and_then(|mut presets| presets.pop_front())
            .flatten();
        match preset {
            Some(answer) => Some(answer),
            None => self.fallback.prompt(question),
        }
    }
}
