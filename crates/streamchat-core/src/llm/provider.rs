//! Chat backend traits.
//!
//! A [`ChatProvider`] creates conversation handles; a [`ChatHandle`] carries
//! the remote turn history and streams replies. Both are object-safe so the
//! session can own a `Box<dyn ChatHandle>` regardless of backend.

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use streamchat_types::llm::{ChatConfig, ChatTurn, LlmError, StreamChunk};

/// Stream of reply fragments, in arrival order.
pub type ChunkStream<'a> = BoxStream<'a, Result<StreamChunk, LlmError>>;

/// Type-erased conversation handle owned by the session.
pub type BoxChatHandle = Box<dyn ChatHandle>;

/// Remote conversation state.
///
/// Implementations append the user turn and the complete model reply to
/// their history only once a stream has finished without error.
pub trait ChatHandle: Send {
    /// Turns the remote side currently sees as prior context.
    fn history(&self) -> &[ChatTurn];

    /// Send `text` and stream the reply.
    ///
    /// The outer future resolves once the request has been set up; the
    /// returned stream then yields fragments until the reply completes.
    fn send_stream<'a>(
        &'a mut self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<ChunkStream<'a>, LlmError>>;
}

/// Factory for conversation handles (Gemini, test doubles).
///
/// Implementations live in streamchat-infra.
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Create a handle seeded with `history`.
    ///
    /// Fails when a required credential is missing or the backend rejects
    /// the configuration.
    fn create_chat(
        &self,
        config: &ChatConfig,
        history: Vec<ChatTurn>,
    ) -> Result<BoxChatHandle, LlmError>;
}
