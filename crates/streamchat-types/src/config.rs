//! Configuration types for streamchat.
//!
//! `ChatConfigFile` represents `config.toml` in the data directory. Every
//! field has a default, so an empty or missing file is valid.

use serde::{Deserialize, Serialize};

use crate::llm::{ChatConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION};

/// Environment variable holding the API key unless overridden.
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// Gemini REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Top-level configuration loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfigFile {
    /// Gemini model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// System instruction sent with every chat.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Name of the environment variable that holds the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override the API root (useful for proxies and tests).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout for a streamed reply.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ChatConfigFile {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_instruction: default_system_instruction(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ChatConfigFile {
    /// The model/system-instruction pair a chat handle is created with.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ChatConfigFile::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.api_key_env, "API_KEY");
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: ChatConfigFile = toml::from_str("").unwrap();
        assert_eq!(config, ChatConfigFile::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: ChatConfigFile = toml::from_str(
            r#"
model = "gemini-2.5-pro"
system_instruction = "Be terse."
"#,
        )
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_key_env, "API_KEY");

        let chat = config.chat_config();
        assert_eq!(chat.model, "gemini-2.5-pro");
        assert_eq!(chat.system_instruction, "Be terse.");
    }
}
