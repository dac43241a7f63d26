//! Conversation state for streamchat.
//!
//! - `store`: ordered message list with change events
//! - `persistence`: JSON snapshot of the list in a key-value store
//! - `session`: the controller tying handle, store and snapshot together

pub(crate) mod consumer;
pub mod persistence;
pub mod session;
pub mod store;
