//! Domain layer containing business entities and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`store`] - Key-value store trait implemented by the infrastructure layer
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - The store trait defines the contract implemented in [`crate::infrastructure::store`]
//! - Business logic lives in services (see [`crate::application::services`])

pub mod entities;
pub mod store;
