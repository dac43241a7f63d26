//! Key-value store trait.
//!
//! Defines the interface for durable string-keyed storage, the local
//! equivalent of browser `localStorage`. Implementations live in
//! streamchat-infra.

use streamchat_types::error::RepositoryError;

/// Trait for durable key-value storage.
///
/// Values are opaque strings; callers own their encoding. Uses RPITIT
/// (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Set a value for a key, overwriting any previous value.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
