//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete key-value store backends.
//!
//! # Modules
//!
//! - [`store`] - Redis and in-process implementations of the store contract

pub mod store;
