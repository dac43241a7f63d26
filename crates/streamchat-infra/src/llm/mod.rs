//! Chat backend implementations.
//!
//! Contains concrete implementations of the [`ChatProvider`] trait defined in
//! `streamchat-core`. Gemini is the only backend.
//!
//! [`ChatProvider`]: streamchat_core::llm::provider::ChatProvider

pub mod gemini;

use streamchat_types::config::ChatConfigFile;
use streamchat_types::llm::LlmError;

use crate::secret::EnvCredentialProvider;

use self::gemini::GeminiProvider;

/// Build the Gemini provider, resolving the API key from the environment.
///
/// A missing key is not an error here; it surfaces when the session tries to
/// create its first chat handle.
pub fn create_provider(config: &ChatConfigFile) -> Result<GeminiProvider, LlmError> {
    let api_key = EnvCredentialProvider::new(config.api_key_env.clone()).resolve();
    GeminiProvider::from_config(config, api_key)
}
