//! DTOs for the link shortening endpoint.

use crate::application::services::CreatedLink;
use crate::utils::code_generator::custom_code_violation;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

fn validate_custom_code_field(code: &str) -> Result<(), ValidationError> {
    match custom_code_violation(code) {
        Some(message) => {
            Err(ValidationError::new("custom_code").with_message(Cow::Borrowed(message)))
        }
        None => Ok(()),
    }
}

/// Request to shorten a URL.
///
/// Accepted as `application/x-www-form-urlencoded` (`url=...`) or as JSON.
/// The URL is stored as given, without normalization.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ShortenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is missing!"))]
    pub url: String,

    /// Optional custom short code instead of a generated one.
    #[validate(custom(function = "validate_custom_code_field"))]
    pub custom_code: Option<String>,
}

impl ShortenRequest {
    /// Treats a blank `custom_code` field (as sent by an empty form input) as absent.
    pub fn normalized(mut self) -> Self {
        self.custom_code = self.custom_code.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Payload of a successful creation.
#[derive(Debug, Serialize)]
pub struct ShortenData {
    #[serde(rename = "urlORi")]
    pub url_original: String,

    #[serde(rename = "urlShort")]
    pub url_short: String,

    /// Creations left in the client's current window.
    pub rate_limit: u32,

    /// Whole minutes until the window resets.
    pub rate_limit_reset: u64,
}

impl From<CreatedLink> for ShortenData {
    fn from(link: CreatedLink) -> Self {
        Self {
            rate_limit: link.rate_limit.remaining,
            rate_limit_reset: link.rate_limit.reset_in_minutes(),
            url_original: link.mapping.url,
            url_short: link.short_url,
        }
    }
}
