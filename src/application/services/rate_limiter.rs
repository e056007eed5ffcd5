//! Fixed-window rate limiting of short link creation.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{RateLimitDecision, RateLimitPolicy};
use crate::domain::store::{KeyValueStore, StoreError};
use crate::error::AppError;
use tracing::{debug, info};

const KEY_PREFIX: &str = "ratelimit:";

/// Per-client fixed-window quota, kept in the shared store.
///
/// Each client gets a counter initialized to the policy quota with the window
/// as its expiry. Every accepted creation consumes one unit; once the counter
/// reaches zero further requests are rejected until the key expires.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Checks the client's quota and reserves one unit if any is left.
    ///
    /// Initialization, the floor check and the decrement happen in one atomic
    /// store operation, so concurrent requests cannot overdraw the quota.
    /// The first request of a window consumes a unit like any other.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the store fails. A rejection is not an
    /// error here: it is reported through [`RateLimitDecision::allowed`].
    pub async fn check_and_reserve(&self, client_id: &str) -> Result<RateLimitDecision, AppError> {
        let key = key_for(client_id);

        let reserved = self
            .store
            .decrement_with_floor(&key, i64::from(self.policy.quota), self.policy.window)
            .await?;
        let reset_in = self.reset_in(&key).await?;

        let decision = match reserved {
            Some(remaining) => RateLimitDecision {
                allowed: true,
                remaining: clamp_remaining(remaining),
                reset_in,
            },
            None => {
                info!(
                    client = client_id,
                    reset_in_secs = reset_in.as_secs(),
                    "Rate limit exceeded"
                );
                metrics::counter!("shortlink_rate_limited_total").increment(1);
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_in,
                }
            }
        };

        debug!(client = client_id, ?decision, "Rate limit checked");
        Ok(decision)
    }

    /// Reports the client's current window without consuming quota.
    ///
    /// A client with no live window has the full quota and a fresh window ahead.
    pub async fn status(&self, client_id: &str) -> Result<RateLimitDecision, AppError> {
        let key = key_for(client_id);

        let Some(value) = self.store.get(&key).await? else {
            return Ok(RateLimitDecision {
                allowed: true,
                remaining: self.policy.quota,
                reset_in: self.policy.window,
            });
        };

        let remaining = value
            .parse::<i64>()
            .map_err(|_| StoreError::InvalidValue {
                key: key.clone(),
                reason: "rate-limit counter is not an integer".to_string(),
            })?;

        Ok(RateLimitDecision {
            allowed: remaining > 0,
            remaining: clamp_remaining(remaining),
            reset_in: self.reset_in(&key).await?,
        })
    }

    async fn reset_in(&self, key: &str) -> Result<Duration, AppError> {
        Ok(self
            .store
            .time_to_live(key)
            .await?
            .unwrap_or(self.policy.window))
    }
}

fn key_for(client_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, client_id)
}

fn clamp_remaining(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
