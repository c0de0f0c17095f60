//! Presentation boundary
//!
//! The core never draws anything. Whatever hosts it (a window, a terminal, a
//! test) implements [`HostUi`] to answer prompts and display errors.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use parking_lot::Mutex;

/// What the core needs from the presentation layer
pub trait HostUi: Send + Sync {
    /// Blocking request for a line of text; `None` means cancelled
    fn prompt(&self, message: &str) -> Option<String>;

    /// Report a recoverable failure to the user
    fn show_error(&self, title: &str, details: &str);
}

/// A reported error, as recorded by [`HeadlessUi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownError {
    pub title: String,
    pub details: String,
}

/// Scripted UI for tests and embedding
///
/// Prompts consume queued answers in order and cancel once the queue is
/// empty. Errors are recorded instead of shown.
#[derive(Debug, Default)]
pub struct HeadlessUi {
    answers: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    errors: Mutex<Vec<ShownError>>,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next prompt (`None` cancels it)
    pub fn push_answer(&self, answer: Option<&str>) {
        self.answers.lock().push_back(answer.map(str::to_string));
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Errors reported so far
    pub fn errors(&self) -> Vec<ShownError> {
        self.errors.lock().clone()
    }
}

impl HostUi for HeadlessUi {
    fn prompt(&self, message: &str) -> Option<String> {
        self.prompts.lock().push(message.to_string());
        self.answers.lock().pop_front().flatten()
    }

    fn show_error(&self, title: &str, details: &str) {
        tracing::debug!("Headless error '{}': {}", title, details);
        self.errors.lock().push(ShownError {
            title: title.to_string(),
            details: details.to_string(),
        });
    }
}

/// Terminal UI: prompts on stderr, answers from stdin
///
/// An empty answer or end of input cancels the prompt.
#[derive(Debug, Default)]
pub struct StdioUi;

impl HostUi for StdioUi {
    fn prompt(&self, message: &str) -> Option<String> {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{} ", message);
        let _ = stderr.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim_end_matches(['\r', '\n']);
                (!answer.is_empty()).then(|| answer.to_string())
            }
        }
    }

    fn show_error(&self, title: &str, details: &str) {
        eprintln!("[{}] {}", title, details);
    }
}
