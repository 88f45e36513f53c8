//! # Document Viewer
//!
//! Read-only view of the document being signed, or of its signed copy.
//! Rendering the PDF is left to the platform; the workflow only confirms a
//! local document is present.
//!
//! Unlike the signing screens, back does not ask for confirmation. The
//! viewer pops straight back to the screen that opened it.

use std::path::PathBuf;

use rqes_core::navigation::{DocumentViewerConfig, Navigation};
use rqes_core::{DocumentRef, LocalizableKey, Localizer, Outcome, UiError};

use crate::screen::ErrorView;
use crate::workflow::{Commands, Workflow};

/// Document viewer state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Screen title.
    pub title: String,

    /// The document shown.
    pub document: DocumentRef,

    /// Whether the document is the signed copy.
    pub is_signed: bool,

    /// The document is being checked.
    pub is_loading: bool,

    /// Size of a local document, once checked.
    pub size: Option<u64>,

    /// Failure shown in place of the document.
    pub error: Option<ErrorView<Intent>>,
}

/// Document viewer intents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Check the document.
    Initialize,

    /// Check finished, with the document's size.
    Loaded(Outcome<u64>),

    /// Back or close pressed.
    Pop,

    /// Retry the failed check.
    RetryRequested,

    /// Clear the failure.
    DismissError,
}

/// Document viewer effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Navigate.
    Navigation(Navigation),
}

/// Document viewer workflow.
pub struct DocumentViewer {
    localizer: Localizer,
    config: DocumentViewerConfig,
}

impl DocumentViewer {
    /// Create the workflow for `config`.
    pub const fn new(localizer: Localizer, config: DocumentViewerConfig) -> Self {
        Self { localizer, config }
    }
}

impl Workflow for DocumentViewer {
    type Effect = Effect;
    type Intent = Intent;
    type State = State;

    fn initial_state(&self) -> State {
        let title = if self.config.is_signed {
            LocalizableKey::SignedDocument
        } else {
            LocalizableKey::ViewDocument
        };
        State {
            title: self.localizer.text(title),
            document: self.config.document.clone(),
            is_signed: self.config.is_signed,
            is_loading: false,
            size: None,
            error: None,
        }
    }

    fn update(&self, intent: Intent, state: &mut State, cmd: &mut Commands<Intent, Effect>) {
        match intent {
            Intent::Initialize => {
                if state.is_loading {
                    return;
                }
                let Ok(path) = state.document.uri.to_file_path() else {
                    tracing::debug!(target: "DocumentViewer::update", uri = %state.document.uri, "not a local document");
                    return;
                };
                state.is_loading = true;
                state.error = None;

                let not_found = UiError::new(
                    self.localizer.text(LocalizableKey::GenericErrorMessage),
                    self.localizer.text(LocalizableKey::GenericErrorDocumentNotFound),
                );
                cmd.spawn(async move { Intent::Loaded(document_size(path).await.ok_or(not_found)) });
            }
            Intent::Loaded(Ok(size)) => {
                state.is_loading = false;
                state.size = Some(size);
            }
            Intent::Loaded(Err(e)) => {
                state.is_loading = false;
                state.error = Some(ErrorView::new(e, Some(Intent::Initialize), Intent::Pop));
            }
            Intent::Pop => cmd.emit(Effect::Navigation(Navigation::Pop)),
            Intent::RetryRequested => {
                if let Some(retry) = state.error.take().and_then(|e| e.on_retry) {
                    self.update(retry, state, cmd);
                }
            }
            Intent::DismissError => state.error = None,
        }
    }
}

async fn document_size(path: PathBuf) -> Option<u64> {
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        Ok(_) => None,
        Err(e) => {
            tracing::error!(target: "DocumentViewer::document_size", ?e, path = %path.display());
            None
        }
    }
}
