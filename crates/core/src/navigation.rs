//! # Navigation
//!
//! Screens are addressed by routes. A route carrying configuration renders
//! as `<screen>?config=<blob>`, where the blob is the JSON-serialized config,
//! base64url encoded without padding, so it survives any platform router.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::document::DocumentRef;
use crate::{Error, Result};

const OPTIONS_SELECTION: &str = "options_selection";
const SUCCESS: &str = "success";
const DOCUMENT_VIEWER: &str = "document_viewer";
const CONFIG_PARAM: &str = "config=";

/// Which step the options-selection screen starts at.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum OptionsSelectionState {
    /// Document review and QTSP selection, ending with service authorization.
    #[default]
    QtspSelection,

    /// Certificate selection, ending with credential authorization.
    CertificateSelection,
}

/// Configuration for the options-selection screen.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSelectionConfig {
    /// The step to start at.
    pub screen_state: OptionsSelectionState,
}

/// Configuration for the document viewer.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentViewerConfig {
    /// Whether the document shown is the signed version.
    pub is_signed: bool,

    /// The document to show.
    pub document: DocumentRef,
}

/// SDK screens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Document, QTSP and certificate selection.
    OptionsSelection(OptionsSelectionConfig),

    /// Signing and the signed-document summary.
    Success,

    /// Read-only document view.
    DocumentViewer(DocumentViewerConfig),
}

/// One-shot navigation instruction emitted by a screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Show `Route`; the current screen stays on the back stack.
    SwitchScreen(Route),

    /// Return to the previous screen.
    Pop,

    /// Leave the SDK and return control to the host application.
    Finish,
}

impl Route {
    /// Screen name, without configuration.
    #[must_use]
    pub const fn screen(&self) -> &'static str {
        match self {
            Self::OptionsSelection(_) => OPTIONS_SELECTION,
            Self::Success => SUCCESS,
            Self::DocumentViewer(_) => DOCUMENT_VIEWER,
        }
    }

    /// Render the route as a path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Navigation` if the configuration cannot be serialized.
    pub fn to_path(&self) -> Result<String> {
        let config = match self {
            Self::OptionsSelection(config) => Some(encode(config)?),
            Self::DocumentViewer(config) => Some(encode(config)?),
            Self::Success => None,
        };
        Ok(config.map_or_else(
            || self.screen().to_string(),
            |blob| format!("{}?{CONFIG_PARAM}{blob}", self.screen()),
        ))
    }

    /// Parse a path produced by [`Route::to_path`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Navigation` for an unknown screen or a missing or
    /// malformed configuration.
    pub fn from_path(path: &str) -> Result<Self> {
        let (screen, query) = path.split_once('?').unwrap_or((path, ""));
        let blob = query.strip_prefix(CONFIG_PARAM);

        match (screen, blob) {
            (OPTIONS_SELECTION, Some(blob)) => Ok(Self::OptionsSelection(decode(blob)?)),
            (DOCUMENT_VIEWER, Some(blob)) => Ok(Self::DocumentViewer(decode(blob)?)),
            (SUCCESS, _) => Ok(Self::Success),
            (OPTIONS_SELECTION | DOCUMENT_VIEWER, None) => {
                Err(Error::Navigation(format!("missing config for {screen}")))
            }
            _ => Err(Error::Navigation(format!("unknown screen: {screen}"))),
        }
    }
}

fn encode<T: Serialize>(config: &T) -> Result<String> {
    let json = serde_json::to_vec(config).map_err(|e| {
        tracing::error!(target: "navigation::encode", ?e);
        Error::Navigation(format!("issue serializing config: {e}"))
    })?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn decode<T: DeserializeOwned>(blob: &str) -> Result<T> {
    let json = Base64UrlUnpadded::decode_vec(blob).map_err(|e| {
        tracing::error!(target: "navigation::decode", ?e);
        Error::Navigation(format!("issue decoding config: {e}"))
    })?;
    serde_json::from_slice(&json).map_err(|e| {
        tracing::error!(target: "navigation::decode", ?e);
        Error::Navigation(format!("issue deserializing config: {e}"))
    })
}
