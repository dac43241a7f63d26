//! Conversation logic and backend traits for streamchat.
//!
//! This crate defines the "ports" (chat backend and key-value store traits)
//! that the infrastructure layer implements. It depends only on
//! `streamchat-types` -- never on `streamchat-infra` or any database/IO crate.

pub mod chat;
pub mod event;
pub mod llm;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
