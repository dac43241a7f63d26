//! Infrastructure layer for streamchat.
//!
//! Contains implementations of the traits defined in `streamchat-core`:
//! SQLite key-value storage, the Gemini chat backend, environment credential
//! lookup, and the `config.toml` loader.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod sqlite;
