//! Short code generation and validation utilities.
//!
//! Random codes are drawn uniformly, with replacement, from the 62-character
//! alphanumeric alphabet. At the default length of 6 that gives
//! 62^6 ≈ 56.8 billion combinations.

use crate::domain::store::KeyValueStore;
use crate::error::AppError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Characters a generated code is drawn from.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default generated code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default number of draws before giving up on finding a free code.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

const CUSTOM_CODE_MIN_LEN: usize = 4;
const CUSTOM_CODE_MAX_LEN: usize = 32;

/// Characters allowed in a caller-provided custom code.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub const CUSTOM_CODE_LENGTH_MESSAGE: &str = "Custom code must be 4-32 characters";
pub const CUSTOM_CODE_CHARSET_MESSAGE: &str =
    "Custom code can only contain letters, digits, hyphens and underscores";

/// Random short code generator.
///
/// The RNG is seeded once when the generator is built and shared behind a
/// mutex; build one generator per process.
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
    length: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self::with_rng(StdRng::from_os_rng(), length, max_attempts)
    }

    /// Creates a generator with a fixed seed, for reproducible tests.
    pub fn with_seed(seed: u64, length: usize, max_attempts: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), length, max_attempts)
    }

    fn with_rng(rng: StdRng, length: usize, max_attempts: u32) -> Self {
        Self {
            rng: Mutex::new(rng),
            length,
            max_attempts,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draws one random code. Says nothing about whether it is free.
    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..self.length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect()
    }

    /// Draws codes until one is reserved in `store` for `value`.
    ///
    /// Each draw is reserved with a conditional set, so the existence check and
    /// the write cannot interleave with another request. `key_for` maps a code
    /// to its store key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeSpaceExhausted`] when every attempt collides and
    /// [`AppError::Storage`] when the store fails.
    pub async fn allocate(
        &self,
        store: &dyn KeyValueStore,
        key_for: impl Fn(&str) -> String,
        value: &str,
        ttl: Duration,
    ) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let code = self.generate();

            if store.set_if_absent(&key_for(&code), value, ttl).await? {
                return Ok(code);
            }

            debug!(attempt, code = %code, "Short code collision");
            metrics::counter!("shortlink_code_collisions_total").increment(1);
        }

        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS)
    }
}

/// Checks a caller-provided custom short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
///
/// Returns the message for the first violated rule.
pub fn custom_code_violation(code: &str) -> Option<&'static str> {
    if !(CUSTOM_CODE_MIN_LEN..=CUSTOM_CODE_MAX_LEN).contains(&code.len()) {
        return Some(CUSTOM_CODE_LENGTH_MESSAGE);
    }
    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Some(CUSTOM_CODE_CHARSET_MESSAGE);
    }
    None
}

/// Validates a caller-provided custom short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule of [`custom_code_violation`] is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    match custom_code_violation(code) {
        Some(message) => Err(AppError::bad_request(message)),
        None => Ok(()),
    }
}
