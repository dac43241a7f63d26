use thiserror::Error;

/// Banner shown when the chat handle cannot be created.
pub const INIT_ERROR_MESSAGE: &str =
    "Failed to initialize AI chat. Please check your API key and refresh the page.";

/// Message shown (and appended to the chat) when a streamed turn fails.
pub const STREAM_ERROR_MESSAGE: &str =
    "An error occurred while fetching the response. Please try again.";

/// Errors surfaced by the chat session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing credential or the provider refused to create a chat handle.
    /// Fatal to the session until restart.
    #[error("chat initialization failed: {0}")]
    Initialization(String),

    /// Any failure while a reply was streaming. Recovered at the turn level.
    #[error("stream failed: {0}")]
    Stream(String),
}

impl SessionError {
    /// The fixed text the user sees for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Initialization(_) => INIT_ERROR_MESSAGE,
            SessionError::Stream(_) => STREAM_ERROR_MESSAGE,
        }
    }
}

/// Errors from repository operations (used by trait definitions in streamchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}
