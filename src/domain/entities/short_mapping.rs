//! Short mapping entity: a short code pointing at an original URL.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Store key prefix for short mappings.
const KEY_PREFIX: &str = "short:";

/// A short code mapped to its original URL.
///
/// Mappings are never mutated; they are written once and expire from the
/// store after their lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortMapping {
    pub code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ShortMapping {
    /// Creates a mapping that starts now and lives for `ttl`.
    pub fn new(code: String, url: String, ttl: Duration) -> Self {
        let created_at = Utc::now();
        let lifetime = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            code,
            url,
            created_at,
            expires_at: created_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Store key under which this mapping lives.
    pub fn key(&self) -> String {
        key_for(&self.code)
    }
}

/// Store key for a short code.
pub fn key_for(code: &str) -> String {
    format!("{}{}", KEY_PREFIX, code)
}
