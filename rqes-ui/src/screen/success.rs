//! # Success
//!
//! Shown after the user returns from credential authorization. The screen
//! signs the selected document, summarises the result and lets the user view
//! or share the signed copy.

use rqes_core::navigation::{DocumentViewerConfig, Navigation, Route};
use rqes_core::provider::{AuthorizedCredential, DocumentStore, SignedDocuments, SigningService};
use rqes_core::{DocumentRef, LocalizableKey, Localizer, Outcome};
use url::Url;

use crate::interactor::Interactor;
use crate::screen::{ErrorView, Icon, SelectionItem, SheetAction, SheetText};
use crate::workflow::{Commands, Workflow};

/// Content of the screen's bottom sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetContent {
    /// "Cancel signing?" confirmation.
    ConfirmCancellation(SheetText),

    /// Share prompt.
    ShareDocument(SheetText),
}

/// Success screen state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Screen title.
    pub title: String,

    /// Headline above the document.
    pub headline: String,

    /// Signing or saving is in flight.
    pub is_loading: bool,

    /// Failure shown in place of the summary.
    pub error: Option<ErrorView<Intent>>,

    /// Whether the bottom sheet is showing.
    pub is_bottom_sheet_open: bool,

    /// What the bottom sheet shows.
    pub sheet_content: Option<SheetContent>,

    /// The signed document, once signed.
    pub document_item: Option<SelectionItem>,

    /// Output of signing.
    pub signed: Option<Signed>,

    /// Where the signed documents were last saved.
    pub saved: Vec<Url>,

    /// Bottom-bar button label.
    pub bottom_bar_label: String,

    /// Whether the bottom-bar button responds to presses.
    pub is_bottom_bar_button_enabled: bool,
}

/// A completed signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signed {
    /// The source document.
    pub document: DocumentRef,

    /// The credential that signed it.
    pub credential: AuthorizedCredential,

    /// The signed output.
    pub documents: SignedDocuments,
}

/// Why signed documents are being saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePurpose {
    /// To open in the document viewer.
    View,

    /// To hand to the platform share sheet.
    Share,
}

impl SavePurpose {
    const fn retry(self) -> Intent {
        match self {
            Self::View => Intent::ViewDocument,
            Self::Share => Intent::BottomSheetAction(SheetAction::Share),
        }
    }
}

/// Success intents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Authorize the credential and sign.
    Initialize,

    /// Signing finished.
    DocumentsSigned(Outcome<Signed>),

    /// Open the signed document in the viewer.
    ViewDocument,

    /// Open the share prompt.
    BottomBarButtonPressed,

    /// A bottom-sheet button pressed.
    BottomSheetAction(SheetAction),

    /// Saving finished.
    DocumentsSaved(SavePurpose, Outcome<Vec<Url>>),

    /// Back pressed.
    Pop,

    /// Retry the failed step.
    RetryRequested,

    /// Clear the failure.
    DismissError,

    /// Leave the SDK.
    Finish,
}

/// Success effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Show the bottom sheet.
    ShowBottomSheet,

    /// Hide the bottom sheet.
    CloseBottomSheet,

    /// Hand a saved PDF to the platform share sheet.
    SharePdf {
        /// Saved document.
        uri: Url,

        /// Title of the share chooser.
        chooser_title: String,
    },

    /// Navigate.
    Navigation(Navigation),
}

type Cmd = Commands<Intent, Effect>;

/// Success workflow.
pub struct Success<S, D> {
    interactor: Interactor<S, D>,
    localizer: Localizer,
}

impl<S, D> Success<S, D> {
    /// Create the workflow.
    pub const fn new(interactor: Interactor<S, D>, localizer: Localizer) -> Self {
        Self { interactor, localizer }
    }
}

impl<S, D> Workflow for Success<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    type Effect = Effect;
    type Intent = Intent;
    type State = State;

    fn initial_state(&self) -> State {
        State {
            title: self.localizer.text(LocalizableKey::Success),
            headline: self.localizer.text(LocalizableKey::SuccessfullySignedDocument),
            is_loading: false,
            error: None,
            is_bottom_sheet_open: false,
            sheet_content: None,
            document_item: None,
            signed: None,
            saved: Vec::new(),
            bottom_bar_label: self.localizer.text(LocalizableKey::Share),
            is_bottom_bar_button_enabled: false,
        }
    }

    fn update(&self, intent: Intent, state: &mut State, cmd: &mut Cmd) {
        match intent {
            Intent::Initialize => self.sign(state, cmd),
            Intent::DocumentsSigned(Ok(signed)) if signed.documents.documents.is_empty() => {
                let e = self.interactor.not_found(LocalizableKey::GenericErrorSignedDocumentsNotFound);
                fail(state, cmd, ErrorView::new(e, Some(Intent::Initialize), Intent::Finish));
            }
            Intent::DocumentsSigned(Ok(signed)) => {
                let issuer = signed.credential.certificate.issuer.clone();
                state.document_item = Some(SelectionItem {
                    subtitle: Some(self.localizer.get(LocalizableKey::SignedBy, &[&issuer])),
                    action: Some(self.localizer.text(LocalizableKey::View)),
                    trailing_icon: None,
                    ..SelectionItem::completed(signed.document.name.clone(), Icon::Verified)
                });
                state.signed = Some(signed);
                state.is_loading = false;
                state.error = None;
                state.is_bottom_bar_button_enabled = true;
            }
            Intent::DocumentsSigned(Err(e)) => {
                fail(state, cmd, ErrorView::new(e, Some(Intent::Initialize), Intent::Finish));
            }
            Intent::ViewDocument => self.save(SavePurpose::View, state, cmd),
            Intent::BottomBarButtonPressed => {
                if !state.is_bottom_bar_button_enabled || state.is_loading {
                    return;
                }
                let sheet = SheetText::share(&self.localizer);
                open_sheet(state, cmd, SheetContent::ShareDocument(sheet));
            }
            Intent::BottomSheetAction(action) => match action {
                SheetAction::Share => {
                    close_sheet(state, cmd);
                    self.save(SavePurpose::Share, state, cmd);
                }
                SheetAction::Close | SheetAction::CancelSigning => {
                    close_sheet(state, cmd);
                    cmd.emit(Effect::Navigation(Navigation::Finish));
                }
                SheetAction::ContinueSigning => close_sheet(state, cmd),
            },
            Intent::DocumentsSaved(purpose, Ok(saved)) => {
                state.is_loading = false;
                state.error = None;
                state.saved = saved;
                self.saved(purpose, state, cmd);
            }
            Intent::DocumentsSaved(purpose, Err(e)) => {
                fail(state, cmd, ErrorView::new(e, Some(purpose.retry()), Intent::DismissError));
            }
            Intent::Pop => {
                let sheet = SheetText::cancellation(&self.localizer);
                open_sheet(state, cmd, SheetContent::ConfirmCancellation(sheet));
            }
            Intent::RetryRequested => {
                if let Some(retry) = state.error.take().and_then(|e| e.on_retry) {
                    self.update(retry, state, cmd);
                }
            }
            Intent::DismissError => state.error = None,
            Intent::Finish => cmd.emit(Effect::Navigation(Navigation::Finish)),
        }
    }
}

impl<S, D> Success<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    fn sign(&self, state: &mut State, cmd: &mut Cmd) {
        if state.is_loading || state.signed.is_some() {
            tracing::debug!(target: "Success::sign", "already signing or signed");
            return;
        }
        state.is_loading = true;
        state.error = None;

        let interactor = self.interactor.clone();
        cmd.spawn(async move {
            let result: Outcome<Signed> = async {
                let document = interactor.get_selected_file()?;
                let credential = interactor.authorize_credential().await?;
                let documents = interactor.sign_documents(&credential).await?;
                Ok(Signed {
                    document,
                    credential,
                    documents,
                })
            }
            .await;
            Intent::DocumentsSigned(result)
        });
    }

    fn save(&self, purpose: SavePurpose, state: &mut State, cmd: &mut Cmd) {
        if state.is_loading {
            tracing::debug!(target: "Success::save", "save in flight");
            return;
        }
        let Some(signed) = state.signed.clone() else {
            tracing::debug!(target: "Success::save", "nothing signed yet");
            return;
        };
        state.is_loading = true;

        let interactor = self.interactor.clone();
        cmd.spawn(async move {
            let name = signed.document.signed_name();
            let result = interactor.save_signed_documents(&name, &signed.documents).await;
            Intent::DocumentsSaved(purpose, result)
        });
    }

    fn saved(&self, purpose: SavePurpose, state: &mut State, cmd: &mut Cmd) {
        let (Some(uri), Some(name)) =
            (state.saved.first().cloned(), state.signed.as_ref().map(|s| s.document.signed_name()))
        else {
            let e = self.interactor.not_found(LocalizableKey::GenericErrorSignedDocumentsNotFound);
            fail(state, cmd, ErrorView::new(e, Some(purpose.retry()), Intent::DismissError));
            return;
        };

        match purpose {
            SavePurpose::View => {
                let config = DocumentViewerConfig {
                    is_signed: true,
                    document: DocumentRef::new(name, uri),
                };
                cmd.emit(Effect::Navigation(Navigation::SwitchScreen(Route::DocumentViewer(config))));
            }
            SavePurpose::Share => cmd.emit(Effect::SharePdf {
                uri,
                chooser_title: self.localizer.get(LocalizableKey::ShareChooserTitle, &[&name]),
            }),
        }
    }
}

fn open_sheet(state: &mut State, cmd: &mut Cmd, content: SheetContent) {
    state.sheet_content = Some(content);
    state.is_bottom_sheet_open = true;
    cmd.emit(Effect::ShowBottomSheet);
}

fn close_sheet(state: &mut State, cmd: &mut Cmd) {
    if !state.is_bottom_sheet_open {
        return;
    }
    state.is_bottom_sheet_open = false;
    cmd.emit(Effect::CloseBottomSheet);
}

fn fail(state: &mut State, cmd: &mut Cmd, error: ErrorView<Intent>) {
    close_sheet(state, cmd);
    state.is_loading = false;
    state.error = Some(error);
}
