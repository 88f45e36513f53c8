//! # RQES Errors
//!
//! Errors raised by the SDK itself, plus the failure half of the result
//! envelope returned by every call across the signing-service boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy for the SDK.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The SDK has been configured incorrectly, for example no translations
    /// or no QTSPs were registered. Not recoverable by retrying.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A selection the current step depends on has not been made yet.
    #[error("not found: {0}")]
    NotFound(String),

    /// A route could not be rendered or parsed.
    #[error("navigation error: {0}")]
    Navigation(String),
}

/// Failure reported to a screen: a user-facing title and message.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UiError {
    /// Short title for the error panel.
    pub title: String,

    /// Detailed message for the error panel.
    pub message: String,
}

impl UiError {
    /// Create a new `UiError`.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl std::error::Error for UiError {}

/// The two-variant envelope returned by every call across the signing-service
/// boundary: `Ok(payload)` or `Err(UiError)`.
pub type Outcome<T> = std::result::Result<T, UiError>;
