//! # Documents
//!
//! Reference to a document handed to the SDK for signing.

use serde::{Deserialize, Serialize};
use url::Url;

/// A document selected by the host application for signing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Display name of the document, usually the file name.
    pub name: String,

    /// Location of the document content (`file://`, `content://`, ...).
    pub uri: Url,
}

impl DocumentRef {
    /// Create a new document reference.
    pub fn new(name: impl Into<String>, uri: Url) -> Self {
        Self {
            name: name.into(),
            uri,
        }
    }

    /// Name to use when saving the signed version of this document.
    #[must_use]
    pub fn signed_name(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}_signed.{ext}"),
            None => format!("{}_signed", self.name),
        }
    }
}
