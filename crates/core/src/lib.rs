//! # RQES Core
//!
//! Types and logic shared by the `rqes-ui` workflow crate and its test
//! utilities: SDK configuration, localized strings, the preference store,
//! navigation routes and the error taxonomy.
//!
//! The crate is for internal use within the RQES UI workspace. Public types
//! are re-exported through `rqes-ui` where host applications need them.

pub mod config;
pub mod document;
mod error;
pub mod localization;
pub mod navigation;
pub mod preferences;
pub mod provider;

pub use self::config::{QtspData, UiConfig};
pub use self::document::DocumentRef;
pub use self::error::{Error, Outcome, UiError};
pub use self::localization::{LocalizableKey, Localizer};

/// Result type for configuration, localization and navigation operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
