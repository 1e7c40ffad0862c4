//! Pre-dispatch validation for load-test runs.
//!
//! Everything here runs before any network activity. A validation failure
//! rejects the whole run; nothing is attempted. Error messages name the
//! specific parameter or request index so callers can surface them directly.

use thiserror::Error;
use url::Url;

use crate::runner::LoadTestSpec;

/// Allowed concurrency range for a load test.
pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 100;

/// Allowed iteration range for a load test.
pub const MIN_ITERATIONS: usize = 1;
pub const MAX_ITERATIONS: usize = 50;

/// Validation error with context about which parameter or request failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("No valid requests to test")]
    EmptyRequestList,

    #[error("Invalid URL for request at index {index}: {message}")]
    InvalidUrl { index: usize, message: String },

    #[error("Invalid JSON body for request at index {index}: {message}")]
    InvalidJsonBody { index: usize, message: String },

    #[error("Either a request or a collection is required")]
    MissingSelection,

    #[error("Provide either a request or a collection, not both")]
    ConflictingSelection,

    #[error("Environment '{0}' not found")]
    EnvironmentNotFound(String),
}

/// Validate a load-test spec: parameter bounds, a non-empty request list,
/// and per-request URL/body preconditions the runner assumes.
pub fn validate_spec(spec: &LoadTestSpec) -> Result<(), ValidationError> {
    validate_bounds(spec.concurrency, spec.iterations)?;

    if spec.requests.is_empty() {
        return Err(ValidationError::EmptyRequestList);
    }

    for (index, request) in spec.requests.iter().enumerate() {
        validate_url(index, &request.url)?;
        if let Some(body) = request.body.as_deref() {
            validate_json_body(index, body)?;
        }
    }

    Ok(())
}

/// Validate the concurrency/iterations budget in isolation.
pub fn validate_bounds(concurrency: usize, iterations: usize) -> Result<(), ValidationError> {
    if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
        return Err(ValidationError::OutOfRange {
            field: "Concurrency",
            value: concurrency,
            min: MIN_CONCURRENCY,
            max: MAX_CONCURRENCY,
        });
    }
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
        return Err(ValidationError::OutOfRange {
            field: "Iterations",
            value: iterations,
            min: MIN_ITERATIONS,
            max: MAX_ITERATIONS,
        });
    }
    Ok(())
}

fn validate_url(index: usize, raw: &str) -> Result<(), ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        index,
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidUrl {
            index,
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn validate_json_body(index: usize, body: &str) -> Result<(), ValidationError> {
    // An empty body is treated as absent, matching how templates with no
    // body text behave elsewhere.
    if body.is_empty() {
        return Ok(());
    }

    serde_json::from_str::<serde_json::Value>(body).map_err(|e| {
        ValidationError::InvalidJsonBody {
            index,
            message: e.to_string(),
        }
    })?;

    Ok(())
}
