//! # Shortlink
//!
//! A small URL shortening service built with Axum and Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Short mappings, rate-limit types and the key-value store contract
//! - **Application Layer** ([`application`]) - Link creation/resolution and per-client quotas
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory store backends
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, extractors and middleware
//!
//! ## Features
//!
//! - Random 6-character alphanumeric codes with atomic collision avoidance
//! - Optional custom codes
//! - Fixed-window creation quota per client (10 per 2 minutes by default)
//! - Permanent (301) redirects
//! - Structured logging and metrics counters
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"  # Optional, in-memory store otherwise
//! cargo run
//!
//! curl -d "url=https://example.com" http://localhost:8080/short
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{CreatedLink, LinkService, LinkSettings, RateLimiter};
    pub use crate::domain::entities::{RateLimitDecision, RateLimitPolicy, ShortMapping};
    pub use crate::domain::store::{KeyValueStore, StoreError};
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{MemoryStore, RedisStore};
    pub use crate::state::AppState;
}
