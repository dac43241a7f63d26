//! Chat history persistence over a [`KvStore`].
//!
//! The whole message list is stored as one JSON array under a fixed key.
//! There is no schema version; a value that does not parse is treated as
//! if nothing were stored.

use streamchat_types::chat::ChatMessage;
use streamchat_types::error::RepositoryError;
use tracing::{debug, warn};

use crate::storage::kv_store::KvStore;

/// Storage key the snapshot lives under.
pub const CHAT_HISTORY_KEY: &str = "gemini-chat-history";

/// Snapshot reader/writer for the conversation.
pub struct ChatHistoryStore<K: KvStore> {
    kv: K,
    key: String,
}

impl<K: KvStore> ChatHistoryStore<K> {
    /// Create a history store using [`CHAT_HISTORY_KEY`].
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, CHAT_HISTORY_KEY)
    }

    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Overwrite the stored snapshot with `messages`.
    pub async fn save(&self, messages: &[ChatMessage]) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(messages)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize history: {e}")))?;
        self.kv.set(&self.key, &json).await?;
        debug!(count = messages.len(), key = %self.key, "chat history saved");
        Ok(())
    }

    /// Read the stored snapshot.
    ///
    /// Missing, blank, unreadable and malformed values all come back as `None`.
    pub async fn load(&self) -> Option<Vec<ChatMessage>> {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, key = %self.key, "failed to read chat history");
                return None;
            }
        };

        if raw.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(messages) => Some(messages),
            Err(e) => {
                warn!(error = %e, key = %self.key, "ignoring malformed chat history");
                None
            }
        }
    }

    /// Delete the stored snapshot.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.kv.delete(&self.key).await
    }
}
