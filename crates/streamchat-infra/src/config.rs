//! Configuration loader for streamchat.
//!
//! Reads `config.toml` from the data directory (`~/.streamchat/` in production)
//! and deserializes it into [`ChatConfigFile`]. Falls back to defaults
//! when the file is missing or malformed.

use std::path::Path;

use streamchat_types::config::ChatConfigFile;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ChatConfigFile::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and returns the default.
/// - Otherwise returns the parsed config; omitted fields take their defaults.
pub async fn load_config(data_dir: &Path) -> ChatConfigFile {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfigFile::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfigFile::default();
        }
    };

    match toml::from_str::<ChatConfigFile>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfigFile::default()
        }
    }
}
