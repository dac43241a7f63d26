//! SSE stream decoding for `streamGenerateContent?alt=sse`.
//!
//! The response body is a plain SSE stream of `data:` events, each one a
//! complete JSON `GenerateContentResponse`. There is no terminal sentinel;
//! the reply is complete when the body ends.

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use streamchat_types::llm::{LlmError, StreamChunk};

use super::types::GeminiStreamResponse;

/// Decode one SSE `data:` payload.
///
/// Returns `Ok(None)` for events that carry no text (usage-only or
/// finish-only chunks).
pub fn parse_event(data: &str) -> Result<Option<StreamChunk>, LlmError> {
    let response: GeminiStreamResponse = serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("invalid stream chunk: {e}")))?;

    if let Some(error) = response.error {
        return Err(LlmError::Provider {
            message: format!(
                "Gemini stream error ({}): {}",
                error.status.as_deref().unwrap_or("UNKNOWN"),
                error.message
            ),
        });
    }

    if let Some(reason) = response.finish_reason() {
        tracing::debug!(finish_reason = reason, "gemini candidate finished");
    }

    let text = response.text();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(StreamChunk::new(text)))
    }
}

/// Map a raw response body to a stream of text fragments.
pub fn map_gemini_stream<S, B, E>(
    bytes: S,
) -> impl Stream<Item = Result<StreamChunk, LlmError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::try_stream! {
        let mut events = Box::pin(bytes.eventsource());

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }
            if let Some(chunk) = parse_event(&event.data)? {
                yield chunk;
            }
        }
    }
}
