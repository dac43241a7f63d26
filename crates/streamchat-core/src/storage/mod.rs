//! Storage abstractions for streamchat.
//!
//! Defines the key-value store trait the chat history is persisted through.
//! Implementations live in streamchat-infra.

pub mod kv_store;
