//! Key-value store contract shared by short mappings and rate-limit counters.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store operation error: {0}")]
    Operation(String),

    /// The stored value cannot be interpreted the way the command needs
    /// (e.g. decrementing a non-integer).
    #[error("Invalid value stored under '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal key-value contract the service runs on.
///
/// Every value carries its own expiry. Mappings and counters live in the same
/// keyspace, so callers are responsible for namespacing their keys.
///
/// The two conditional operations ([`set_if_absent`](Self::set_if_absent) and
/// [`decrement_with_floor`](Self::decrement_with_floor)) must be atomic with
/// respect to concurrent callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisStore`] - Redis-backed store
/// - [`crate::infrastructure::store::MemoryStore`] - In-process store for development and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. `Ok(None)` on miss or expired key.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value unconditionally with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Writes a value only if the key does not exist.
    ///
    /// Returns `true` when the value was written, `false` when the key was
    /// already taken.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    /// Decrements an integer value by one and returns the new value.
    ///
    /// A missing key is treated as `0` and keeps no expiry, matching `DECR`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidValue`] if the stored value is not an integer.
    async fn decrement(&self, key: &str) -> StoreResult<i64>;

    /// Initializes a missing key to `initial` with `ttl`, then decrements it by
    /// one unless it is already `<= 0`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` with the value after decrementing
    /// - `Ok(None)` if the counter was already at its floor and left untouched
    async fn decrement_with_floor(
        &self,
        key: &str,
        initial: i64,
        ttl: Duration,
    ) -> StoreResult<Option<i64>>;

    /// Remaining time-to-live. `Ok(None)` if the key is missing or never expires.
    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Marks the end of use at shutdown.
    ///
    /// Network connections are released when the store is dropped; `close`
    /// does not tear them down itself. The in-memory backend discards its data.
    async fn close(&self) -> StoreResult<()>;
}
