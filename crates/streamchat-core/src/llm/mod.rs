//! LLM backend abstractions for streamchat.
//!
//! - `ChatProvider`: creates conversation handles from config + history
//! - `ChatHandle`: owns remote history and streams replies

pub mod provider;
