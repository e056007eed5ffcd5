//! HTTP request handlers for API endpoints.
//!
//! Handlers are thin adapters that:
//! 1. Extract and validate request data
//! 2. Call application services
//! 3. Format responses
//!
//! Business logic is delegated to [`crate::application::services`].

pub mod fallback;
pub mod health;
pub mod redirect;
pub mod shorten;

pub use fallback::not_found_handler;
pub use health::health_handler;
pub use redirect::{missing_code_handler, redirect_handler};
pub use shorten::shorten_handler;
