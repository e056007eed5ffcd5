//! Core domain entities.
//!
//! - [`ShortMapping`] - A short code pointing at an original URL
//! - [`RateLimitPolicy`] / [`RateLimitDecision`] - Per-client creation quota

pub mod rate_limit;
pub mod short_mapping;

pub use rate_limit::{RateLimitDecision, RateLimitPolicy};
pub use short_mapping::ShortMapping;
