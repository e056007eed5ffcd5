//! Application layer services implementing business logic.
//!
//! Services orchestrate store operations, code generation and quota checks,
//! and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::rate_limiter::RateLimiter`] - Per-client fixed-window quota

pub mod services;
