//! Google Gemini provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`ChatProvider`](streamchat_core::llm::provider::ChatProvider) trait for
//! the Gemini `generateContent` API, including SSE streaming.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::{GeminiChat, GeminiProvider};
