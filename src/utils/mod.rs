//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`client_ip`] - Client address extraction from the connection and headers

pub mod client_ip;
pub mod code_generator;
