//! Shared domain types for streamchat.
//!
//! Messages, remote conversation turns, session events, configuration and
//! error types used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
