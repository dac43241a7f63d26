//! GeminiProvider -- concrete [`ChatProvider`] implementation for Google Gemini.
//!
//! Each conversation handle sends the full turn history with every request to
//! `/models/{model}:streamGenerateContent?alt=sse` and keeps that history
//! locally, appending a user/model pair once a reply completes.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use streamchat_core::llm::provider::{BoxChatHandle, ChatHandle, ChatProvider, ChunkStream};
use streamchat_types::config::ChatConfigFile;
use streamchat_types::llm::{ChatConfig, ChatTurn, LlmError, StreamChunk};

use super::streaming::map_gemini_stream;
use super::types::{GeminiContent, GeminiErrorBody, GeminiRequest};

/// Google Gemini chat provider.
///
/// Creating a handle fails with [`LlmError::MissingCredential`] when no API
/// key was resolved, which the session reports as an initialization error.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    credential_name: String,
    base_url: String,
}

// GeminiProvider intentionally does NOT derive Debug; the SecretString field
// already redacts, but nothing here is useful to print either.

impl GeminiProvider {
    /// Create a provider.
    ///
    /// * `api_key` - resolved key, or `None` to fail at handle creation
    /// * `credential_name` - variable name reported when the key is missing
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `timeout` - whole-request timeout, including the streamed body
    pub fn new(
        api_key: Option<SecretString>,
        credential_name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            credential_name: credential_name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a provider from the loaded config file.
    pub fn from_config(
        config: &ChatConfigFile,
        api_key: Option<SecretString>,
    ) -> Result<Self, LlmError> {
        Self::new(
            api_key,
            config.api_key_env.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Streaming endpoint for `model`.
    pub fn streaming_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }
}

impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn create_chat(
        &self,
        config: &ChatConfig,
        history: Vec<ChatTurn>,
    ) -> Result<BoxChatHandle, LlmError> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(LlmError::MissingCredential(format!(
                "{} is not set",
                self.credential_name
            )));
        };
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidRequest("model name is empty".to_string()));
        }

        Ok(Box::new(GeminiChat {
            client: self.client.clone(),
            api_key,
            url: self.streaming_url(&config.model),
            system_instruction: config.system_instruction.clone(),
            history,
        }))
    }
}

/// One Gemini conversation.
pub struct GeminiChat {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    system_instruction: String,
    history: Vec<ChatTurn>,
}

impl GeminiChat {
    /// Request body for sending `text` after the current history.
    fn build_request(&self, text: &str) -> GeminiRequest {
        build_request(&self.system_instruction, &self.history, text)
    }
}

pub(crate) fn build_request(system_instruction: &str, history: &[ChatTurn], text: &str) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = history.iter().map(GeminiContent::from).collect();
    contents.push(GeminiContent::from(&ChatTurn::user(text)));

    let system_instruction = if system_instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiContent::text(None, system_instruction))
    };

    GeminiRequest {
        contents,
        system_instruction,
    }
}

/// Map a non-2xx response to an [`LlmError`].
fn status_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        400 | 404 => LlmError::InvalidRequest(format!("HTTP {status}: {message}")),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

impl ChatHandle for GeminiChat {
    fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn send_stream<'a>(
        &'a mut self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<ChunkStream<'a>, LlmError>> {
        let body = self.build_request(text);
        let Self {
            client,
            api_key,
            url,
            history,
            ..
        } = self;

        Box::pin(async move {
            tracing::debug!(turns = history.len(), "sending gemini request");

            let response = client
                .post(url.as_str())
                .header("x-goog-api-key", api_key.expose_secret())
                .header("accept", "text/event-stream")
                .json(&body)
                .send()
                .await
                .map_err(|e| LlmError::Provider {
                    message: format!("HTTP request failed: {e}"),
                })?;

            let status = response.status();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                return Err(status_error(status, &error_body));
            }

            Ok(record_turn(
                map_gemini_stream(response.bytes_stream()),
                history,
                text,
            ))
        })
    }
}

/// Pass `chunks` through; once they end cleanly, append the user turn and
/// the full reply to `history`. An error or an abandoned stream leaves the
/// history as it was.
fn record_turn<'a, S>(chunks: S, history: &'a mut Vec<ChatTurn>, text: &'a str) -> ChunkStream<'a>
where
    S: Stream<Item = Result<StreamChunk, LlmError>> + Send + 'a,
{
    Box::pin(async_stream::try_stream! {
        let mut chunks = Box::pin(chunks);
        let mut reply = String::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            reply.push_str(&chunk.text);
            yield chunk;
        }
        history.push(ChatTurn::user(text));
        history.push(ChatTurn::model(reply));
    })
}
