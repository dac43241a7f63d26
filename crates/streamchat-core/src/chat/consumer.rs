//! Drives a single streamed reply into the message store.
//!
//! The consumer runs one turn: it issues the request, appends an empty AI
//! placeholder, rewrites that placeholder (by id) with the running total as
//! each fragment arrives, and converts any failure into the fixed error
//! message. It never touches the busy flag; the session clears it afterwards
//! on every path.

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, error};

use streamchat_types::chat::ChatMessage;
use streamchat_types::error::{STREAM_ERROR_MESSAGE, SessionError};
use streamchat_types::llm::LlmError;

use crate::llm::provider::BoxChatHandle;

use super::session::{SessionState, TurnOutcome};

pub(crate) struct StreamConsumer<'s> {
    state: &'s Mutex<SessionState>,
}

impl<'s> StreamConsumer<'s> {
    pub(crate) fn new(state: &'s Mutex<SessionState>) -> Self {
        Self { state }
    }

    /// Run one turn to completion or failure.
    pub(crate) async fn run(&self, handle: &mut BoxChatHandle, text: &str) -> TurnOutcome {
        match self.stream_reply(handle, text).await {
            Ok(message_id) => TurnOutcome::Completed { message_id },
            Err(err) => self.fail(err).await,
        }
    }

    async fn stream_reply(
        &self,
        handle: &mut BoxChatHandle,
        text: &str,
    ) -> Result<String, LlmError> {
        let mut stream = handle.send_stream(text).await?;

        let placeholder = ChatMessage::ai_placeholder();
        let message_id = placeholder.id.clone();
        self.state.lock().await.store.append(placeholder);

        let mut reply = String::new();
        let mut fragments = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            reply.push_str(&chunk.text);
            fragments += 1;
            self.state
                .lock()
                .await
                .store
                .update_by_id(&message_id, reply.as_str());
        }

        debug!(%message_id, fragments, chars = reply.chars().count(), "reply stream completed");
        Ok(message_id)
    }

    /// Record a failed turn: the partial placeholder (if any) stays as it
    /// is and a separate error message is appended.
    async fn fail(&self, err: LlmError) -> TurnOutcome {
        error!(error = %err, "streaming reply failed");

        let mut state = self.state.lock().await;
        state.set_error(Some(STREAM_ERROR_MESSAGE.to_string()));
        state.store.append(ChatMessage::error(STREAM_ERROR_MESSAGE));

        TurnOutcome::Failed {
            error: SessionError::Stream(err.to_string()),
        }
    }
}
