//! Chat message types for streamchat.
//!
//! A conversation is an ordered list of [`ChatMessage`]s. The same shape is
//! rendered by the presentation layer and persisted as the session snapshot,
//! so the serde representation here is the on-disk format:
//! `{"id": "...", "text": "...", "sender": "user" | "ai"}`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "ai" => Ok(Sender::Ai),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single message in the conversation.
///
/// `text` is only ever rewritten while the message is the AI reply currently
/// being streamed; every other message is frozen once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    /// A message submitted by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: next_id("user"),
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// An empty AI message that streamed fragments will fill in.
    pub fn ai_placeholder() -> Self {
        Self {
            id: next_id("ai"),
            text: String::new(),
            sender: Sender::Ai,
        }
    }

    /// A terminal AI-sender message reporting a failed turn.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: next_id("error"),
            text: text.into(),
            sender: Sender::Ai,
        }
    }
}

/// Last millisecond stamp handed out by [`next_id`].
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Build `"{prefix}-{unix_millis}"`, bumping the stamp when two ids would
/// land in the same millisecond so ids stay unique within the process.
fn next_id(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID_MILLIS.load(Ordering::Relaxed);
    loop {
        let stamp = now.max(last + 1);
        match LAST_ID_MILLIS.compare_exchange_weak(last, stamp, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return format!("{prefix}-{stamp}"),
            Err(current) => last = current,
        }
    }
}
