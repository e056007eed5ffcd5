//! Redis-backed store implementation.

use crate::config::mask_connection_string;
use crate::domain::store::{KeyValueStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, Script, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

/// Initializes a missing counter, then decrements it unless it is already at
/// or below zero. Returns nil when the floor was hit.
const DECREMENT_WITH_FLOOR: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
    redis.call('SET', KEYS[1], ARGV[1], 'PX', ARGV[2])
    current = ARGV[1]
end
if tonumber(current) <= 0 then
    return false
end
return redis.call('DECR', KEYS[1])
"#;

/// Redis store for short mappings and rate-limit counters.
///
/// Uses `ConnectionManager` for automatic reconnection; clones of the manager
/// share one multiplexed connection.
pub struct RedisStore {
    client: ConnectionManager,
    decrement_with_floor: Script,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// The initial connection is retried `retries` times with exponential
    /// backoff before giving up.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid or no attempt
    /// succeeds.
    pub async fn connect(redis_url: &str, retries: usize) -> StoreResult<Self> {
        info!("Connecting to Redis at {}", mask_connection_string(redis_url));

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(retries);

        let manager = Retry::spawn(strategy, || {
            let client = client.clone();
            async move {
                let mut manager = ConnectionManager::new(client).await.inspect_err(|e| {
                    warn!("Redis connection attempt failed: {}", e);
                })?;
                redis::cmd("PING").query_async::<()>(&mut manager).await?;
                Ok::<_, RedisError>(manager)
            }
        })
        .await
        .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            decrement_with_floor: Script::new(DECREMENT_WITH_FLOOR),
        })
    }
}

fn operation_error(command: &str, key: &str, e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_timeout() {
        StoreError::Connection(format!("{} {}: {}", command, key, e))
    } else {
        StoreError::Operation(format!("{} {}: {}", command, key, e))
    }
}

/// Converts a `PTTL` reply: `-2` (missing) and `-1` (no expiry) become `None`.
fn ttl_from_millis(millis: i64) -> Option<Duration> {
    u64::try_from(millis).ok().map(Duration::from_millis)
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.client.clone();
        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| operation_error("GET", key, e))?;
        debug!(key, hit = value.is_some(), "Store GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.pset_ex::<_, _, ()>(key, value, millis(ttl))
            .await
            .map_err(|e| operation_error("SET", key, e))?;
        debug!(key, ttl_ms = millis(ttl), "Store SET");
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        let mut conn = self.client.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| operation_error("SET NX", key, e))?;
        let written = reply.is_some();
        debug!(key, written, "Store SET NX");
        Ok(written)
    }

    async fn decrement(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.client.clone();
        conn.decr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| operation_error("DECR", key, e))
    }

    async fn decrement_with_floor(
        &self,
        key: &str,
        initial: i64,
        ttl: Duration,
    ) -> StoreResult<Option<i64>> {
        let mut conn = self.client.clone();
        let remaining: Option<i64> = self
            .decrement_with_floor
            .key(key)
            .arg(initial)
            .arg(millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| operation_error("EVALSHA", key, e))?;
        debug!(key, ?remaining, "Store DECR with floor");
        Ok(remaining)
    }

    async fn time_to_live(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut conn = self.client.clone();
        let reply = conn
            .pttl::<_, i64>(key)
            .await
            .map_err(|e| operation_error("PTTL", key, e))?;
        Ok(ttl_from_millis(reply))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .is_ok()
    }

    async fn close(&self) -> StoreResult<()> {
        info!("Closing Redis store; connection is released when the store is dropped");
        Ok(())
    }
}
