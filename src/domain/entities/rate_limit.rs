//! Fixed-window rate limiting types.

use std::time::Duration;

/// Quota granted to each client per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Creations allowed per window.
    pub quota: u32,
    /// Window length, counted from the first creation in the window.
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            quota: 10,
            window: Duration::from_secs(120),
        }
    }
}

/// Outcome of a rate-limit check for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Quota left in the current window after this decision.
    pub remaining: u32,
    /// Time until the window resets.
    pub reset_in: Duration,
}

impl RateLimitDecision {
    /// Time until reset in whole minutes, rounded down.
    pub fn reset_in_minutes(&self) -> u64 {
        self.reset_in.as_secs() / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.quota, 10);
        assert_eq!(policy.window, Duration::from_secs(120));
    }

    #[test]
    fn test_reset_in_minutes_rounds_down() {
        let decision = RateLimitDecision {
            allowed: true,
            remaining: 3,
            reset_in: Duration::from_secs(119),
        };
        assert_eq!(decision.reset_in_minutes(), 1);
    }
}
