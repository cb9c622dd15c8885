//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and timeouts > 0, limits in range)
//! - Check the API base URL parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SearchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::SearchConfig;

/// Largest track limit the catalog API honours.
pub const MAX_TRACK_LIMIT: u32 = 100;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "breaker.failure_threshold").
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &SearchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.api.base_url) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::new("api.base_url", "must be an absolute base URL"));
        }
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::new(
                "api.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(ValidationError::new("api.base_url", format!("invalid URL: {}", e)));
        }
    }

    if config.api.track_limit == 0 || config.api.track_limit > MAX_TRACK_LIMIT {
        errors.push(ValidationError::new(
            "api.track_limit",
            format!("must be between 1 and {}", MAX_TRACK_LIMIT),
        ));
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::new("timeouts.request_ms", "must be greater than 0"));
    }

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::new("breaker.failure_threshold", "must be greater than 0"));
    }

    if config.breaker.recovery_timeout_ms == 0 {
        errors.push(ValidationError::new("breaker.recovery_timeout_ms", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
