//! Prompt line input for the chat loop.
//!
//! Lines are handed on exactly as typed; the session decides what counts as
//! empty, and a message keeps its surrounding whitespace.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// What the user did at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A submitted line, untrimmed.
    Message(String),
    /// Ctrl+D, or the terminal went away.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

impl InputEvent {
    fn from_readline(result: Result<ReadlineEvent, ReadlineError>) -> Self {
        match result {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Message(line),
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Ok(ReadlineEvent::Eof) | Err(_) => InputEvent::Eof,
        }
    }
}

/// The chat prompt.
pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Open the prompt.
    ///
    /// The returned `SharedWriter` prints above the prompt line; every task
    /// that writes to the terminal while the prompt is active goes through it.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, writer) = Readline::new(prompt)?;
        Ok((Self { rl }, writer))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        let event = InputEvent::from_readline(self.rl.readline().await);
        if let InputEvent::Message(line) = &event {
            let entry = line.trim();
            if !entry.is_empty() {
                self.rl.add_history_entry(entry.to_string());
            }
        }
        event
    }

    /// Print anything still queued on the shared writer and restore the terminal.
    pub fn flush(&mut self) {
        let _ = self.rl.flush();
    }
}
