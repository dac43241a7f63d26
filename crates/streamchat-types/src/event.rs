//! Event types for the streamchat session event bus.
//!
//! `SessionEvent` is broadcast on every change to the message list, the busy
//! flag, or the current error. All variants are Clone + Send + Sync for use
//! with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Change notifications emitted by a chat session.
///
/// Subscribers (the terminal UI, tests) rebuild their view from these; the
/// session itself never depends on who is listening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The whole message list was replaced (restore or clear).
    MessagesReplaced { messages: Vec<ChatMessage> },

    /// A message was appended at the end of the list.
    MessageAppended { message: ChatMessage },

    /// The text of an existing message changed (streaming).
    MessageUpdated { id: String, text: String },

    /// A send started (`true`) or finished (`false`).
    BusyChanged { busy: bool },

    /// The user-facing error changed.
    ErrorChanged { error: Option<String> },
}
