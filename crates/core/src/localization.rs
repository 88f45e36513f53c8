//! # Localization
//!
//! Every user-facing string is identified by a [`LocalizableKey`]. Hosts may
//! override strings per locale through [`crate::UiConfig::translations`]; any
//! key without an override falls back to its built-in English text.
//!
//! Arguments are substituted into `%@` placeholders, in order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder replaced by successive arguments.
const PLACEHOLDER: &str = "%@";

/// Per-locale string overrides: `locale -> key -> text`.
pub type Translations = HashMap<String, HashMap<LocalizableKey, String>>;

/// Keys for all user-facing strings.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LocalizableKey {
    SignDocument,
    SelectDocument,
    SelectService,
    SelectCertificate,
    SelectServiceTitle,
    SelectCertificateTitle,
    View,
    Sign,
    Done,
    Close,
    Share,
    Success,
    SuccessfullySignedDocument,
    SignedBy,
    ShareDocumentTitle,
    ShareDocumentSubtitle,
    ShareChooserTitle,
    ViewDocument,
    SignedDocument,
    CancelSigningProcessTitle,
    CancelSigningProcessSubtitle,
    CancelSigning,
    ContinueSigning,
    GenericErrorMessage,
    GenericErrorDescription,
    GenericErrorDocumentNotFound,
    GenericErrorQtspNotFound,
    GenericErrorCertificatesNotFound,
    GenericErrorAuthorizationCodeNotFound,
    GenericErrorServiceNotFound,
    GenericErrorSignedDocumentsNotFound,
}

impl LocalizableKey {
    /// Built-in English text for the key, with `%@` placeholders unfilled.
    #[must_use]
    pub const fn default_text(self) -> &'static str {
        match self {
            Self::SignDocument => "Sign document",
            Self::SelectDocument => "Select document",
            Self::SelectService => "Select remote signing service",
            Self::SelectCertificate => "Select certificate",
            Self::SelectServiceTitle => "Select a remote signing service to sign your document",
            Self::SelectCertificateTitle => "Select a certificate to sign your document with",
            Self::View => "VIEW",
            Self::Sign => "Sign",
            Self::Done => "Done",
            Self::Close => "Close",
            Self::Share => "Share",
            Self::Success => "Success",
            Self::SuccessfullySignedDocument => "You successfully signed your document",
            Self::SignedBy => "Signed by: %@",
            Self::ShareDocumentTitle => "Share document",
            Self::ShareDocumentSubtitle => "Choose a way to share the signed document.",
            Self::ShareChooserTitle => "Share %@ via",
            Self::ViewDocument => "View document",
            Self::SignedDocument => "Signed document",
            Self::CancelSigningProcessTitle => "Cancel signing process?",
            Self::CancelSigningProcessSubtitle => {
                "Are you sure you want to cancel the signing process?"
            }
            Self::CancelSigning => "Cancel signing",
            Self::ContinueSigning => "Continue signing",
            Self::GenericErrorMessage => "An error occurred",
            Self::GenericErrorDescription => "Something went wrong. Please try again.",
            Self::GenericErrorDocumentNotFound => "No document selected for signing",
            Self::GenericErrorQtspNotFound => "No remote signing service selected",
            Self::GenericErrorCertificatesNotFound => "No certificates available for signing",
            Self::GenericErrorAuthorizationCodeNotFound => "No authorization code received",
            Self::GenericErrorServiceNotFound => "Remote signing service not initialised",
            Self::GenericErrorSignedDocumentsNotFound => "No signed document was returned",
        }
    }

    /// Built-in English text with `args` substituted.
    #[must_use]
    pub fn default_translation(self, args: &[&str]) -> String {
        substitute(self.default_text(), args)
    }
}

/// Resolves [`LocalizableKey`]s to text for the configured locale.
#[derive(Clone, Debug)]
pub struct Localizer {
    locale: String,
    translations: Arc<Translations>,
}

impl Localizer {
    /// Create a localizer for `locale`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if no translations are registered at
    /// all.
    pub fn new(locale: impl Into<String>, translations: Translations) -> Result<Self> {
        if translations.is_empty() {
            let e = Error::Configuration("no translations registered".into());
            tracing::error!(target: "Localizer::new", ?e);
            return Err(e);
        }
        Ok(Self {
            locale: locale.into(),
            translations: Arc::new(translations),
        })
    }

    /// Text for `key` without arguments.
    #[must_use]
    pub fn text(&self, key: LocalizableKey) -> String {
        self.get(key, &[])
    }

    /// Text for `key` with `args` substituted, falling back to the key's
    /// built-in translation when the locale has no entry for it.
    #[must_use]
    pub fn get(&self, key: LocalizableKey, args: &[&str]) -> String {
        self.translations
            .get(&self.locale)
            .and_then(|strings| strings.get(&key))
            .map_or_else(|| key.default_translation(args), |text| substitute(text, args))
    }
}

// Replace each placeholder with the next argument. Surplus placeholders are
// left untouched; surplus arguments are ignored.
fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(pos) = rest.find(PLACEHOLDER) {
        let Some(arg) = args.next() else {
            break;
        };
        out.push_str(&rest[..pos]);
        out.push_str(arg);
        rest = &rest[pos + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}
