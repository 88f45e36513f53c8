//! # SDK Configuration
//!
//! Host applications configure the SDK with the trust service providers the
//! user may choose from, optional translations and logging preferences.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::localization::Translations;
use crate::{Error, Result};

/// Locale used when the configuration does not name one.
pub const DEFAULT_LOCALE: &str = "en";

/// A Qualified Trust Service Provider the user can sign with.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QtspData {
    /// Display name of the provider.
    pub name: String,

    /// Base URL of the provider's CSC API.
    pub endpoint: Url,

    /// Time stamping authority used when signing with this provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsa_url: Option<Url>,

    /// OAuth2 client identifier registered with the provider.
    pub client_id: String,

    /// OAuth2 client secret registered with the provider.
    pub client_secret: String,

    /// Redirect URI the provider returns the authorization code to.
    pub redirect_uri: Url,
}

/// SDK configuration supplied by the host application.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Providers offered to the user, in display order.
    pub qtsps: Vec<QtspData>,

    /// Per-locale overrides of the built-in strings.
    #[serde(default = "default_translations")]
    pub translations: Translations,

    /// Locale used to look up translations.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Install a log subscriber when the SDK is created.
    #[serde(default)]
    pub print_logs: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            qtsps: Vec::new(),
            translations: default_translations(),
            locale: default_locale(),
            print_logs: false,
        }
    }
}

fn default_translations() -> Translations {
    HashMap::from([(DEFAULT_LOCALE.to_string(), HashMap::new())])
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl UiConfig {
    /// Deserialize and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the JSON is malformed or the
    /// configuration fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            tracing::error!(target: "UiConfig::from_json", ?e);
            Error::Configuration(format!("invalid configuration: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can drive a signing flow.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when no QTSP is configured, two QTSPs
    /// share a name, or no translation locale is registered.
    pub fn validate(&self) -> Result<()> {
        if self.qtsps.is_empty() {
            return Err(Error::Configuration("no QTSPs configured".into()));
        }
        let mut names = HashSet::new();
        for qtsp in &self.qtsps {
            if !names.insert(qtsp.name.as_str()) {
                return Err(Error::Configuration(format!("duplicate QTSP name: {}", qtsp.name)));
            }
        }
        if self.translations.is_empty() {
            return Err(Error::Configuration("no translations registered".into()));
        }
        Ok(())
    }
}
