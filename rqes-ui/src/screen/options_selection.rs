//! # Options Selection
//!
//! The step list shown before each redirect to the QTSP.
//!
//! In [`OptionsSelectionState::QtspSelection`] mode the user reviews the
//! document, picks a QTSP and leaves for service authorization. In
//! [`OptionsSelectionState::CertificateSelection`] mode, on return, the
//! service is authorized, the user's certificates are listed and the user
//! leaves again for credential authorization.
//!
//! List steps use a two-phase pattern: radio-button presses only move the
//! highlight, while "Done" commits the choice and starts the next call.

use rqes_core::navigation::{
    DocumentViewerConfig, Navigation, OptionsSelectionConfig, OptionsSelectionState, Route,
};
use rqes_core::provider::{
    AuthorizedService, CertificateData, DocumentStore, ServiceHandle, SigningService,
};
use rqes_core::{DocumentRef, LocalizableKey, Localizer, Outcome, QtspData};
use url::Url;

use crate::interactor::Interactor;
use crate::screen::{ErrorView, Icon, ListSheet, SelectionItem, SheetAction, SheetText};
use crate::workflow::{Commands, Workflow};

/// Content of the screen's bottom sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetContent {
    /// "Cancel signing?" confirmation.
    ConfirmCancellation(SheetText),

    /// QTSP list.
    SelectQtsp(ListSheet),

    /// Certificate list.
    SelectCertificate(ListSheet),
}

/// Options-selection screen state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Screen title.
    pub title: String,

    /// Step the screen was opened at.
    pub screen_state: OptionsSelectionState,

    /// A service call is in flight.
    pub is_loading: bool,

    /// Failure shown in place of the step list.
    pub error: Option<ErrorView<Intent>>,

    /// Whether the bottom sheet is showing.
    pub is_bottom_sheet_open: bool,

    /// What the bottom sheet shows.
    pub sheet_content: Option<SheetContent>,

    /// Step one: the document.
    pub document_item: SelectionItem,

    /// Step two: the QTSP.
    pub qtsp_item: SelectionItem,

    /// Step three: the certificate.
    pub certificate_item: SelectionItem,

    /// The document being signed.
    pub document: Option<DocumentRef>,

    /// Configured QTSPs.
    pub qtsps: Vec<QtspData>,

    /// Highlighted QTSP in the list.
    pub selected_qtsp_index: usize,

    /// Certificates available through the authorized service.
    pub certificates: Vec<CertificateData>,

    /// Highlighted certificate in the list.
    pub selected_certificate_index: usize,

    /// Where the bottom-bar button sends the user.
    pub authorization_url: Option<Url>,

    /// Bottom-bar button label.
    pub bottom_bar_label: String,

    /// Whether the bottom-bar button responds to presses.
    pub is_bottom_bar_button_enabled: bool,
}

/// Result of authorizing the service and preparing the default certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateChoice {
    /// The authorized service.
    pub service: AuthorizedService,

    /// Available certificates; never empty.
    pub certificates: Vec<CertificateData>,

    /// Credential authorization URL for the first certificate.
    pub authorization_url: Url,
}

/// Options-selection intents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Load the document and the step's options.
    Initialize,

    /// Open the document viewer.
    ViewDocument,

    /// The user has reviewed the document.
    DocumentConfirmed,

    /// Open the QTSP list.
    QtspItemPressed,

    /// Highlight a QTSP.
    QtspIndexSelectedOnRadioButtonPressed(usize),

    /// Commit a QTSP.
    QtspSelectedOnDoneButtonPressed(usize),

    /// Fetch the service authorization URL.
    FetchServiceAuthorizationUrl(ServiceHandle),

    /// Service authorization URL fetched.
    ServiceAuthorizationUrlFetched(ServiceHandle, Outcome<Url>),

    /// Authorize the service, list certificates and prepare the first.
    AuthorizeServiceAndFetchCertificates,

    /// Certificates fetched.
    CertificatesFetched(Outcome<CertificateChoice>),

    /// Open the certificate list.
    CertificateItemPressed,

    /// Highlight a certificate.
    CertificateIndexSelectedOnRadioButtonPressed(usize),

    /// Commit a certificate.
    CertificateSelectedOnDoneButtonPressed(usize),

    /// Credential authorization URL fetched for the certificate at the index.
    CredentialAuthorizationUrlFetched(usize, Outcome<Url>),

    /// Leave for the QTSP.
    BottomBarButtonPressed(Url),

    /// Back pressed.
    Pop,

    /// A bottom-sheet button pressed.
    BottomSheetAction(SheetAction),

    /// Retry the failed step.
    RetryRequested,

    /// Clear the failure.
    DismissError,

    /// Leave the SDK.
    Finish,
}

/// Options-selection effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Open `Url` in the browser.
    OpenUrl(Url),

    /// Show the bottom sheet.
    ShowBottomSheet,

    /// Hide the bottom sheet.
    CloseBottomSheet,

    /// A QTSP was committed and its service created.
    OnSelectedQtspUpdated(ServiceHandle),

    /// Navigate.
    Navigation(Navigation),
}

type Cmd = Commands<Intent, Effect>;

/// Options-selection workflow.
pub struct OptionsSelection<S, D> {
    interactor: Interactor<S, D>,
    localizer: Localizer,
    config: OptionsSelectionConfig,
}

impl<S, D> OptionsSelection<S, D> {
    /// Create the workflow for `config`.
    pub fn new(interactor: Interactor<S, D>, localizer: Localizer, config: OptionsSelectionConfig) -> Self {
        Self {
            interactor,
            localizer,
            config,
        }
    }
}

impl<S, D> Workflow for OptionsSelection<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    type Effect = Effect;
    type Intent = Intent;
    type State = State;

    fn initial_state(&self) -> State {
        let text = |key| self.localizer.text(key);
        State {
            title: text(LocalizableKey::SignDocument),
            screen_state: self.config.screen_state,
            is_loading: false,
            error: None,
            is_bottom_sheet_open: false,
            sheet_content: None,
            document_item: SelectionItem::pending(text(LocalizableKey::SelectDocument), Icon::StepOne),
            qtsp_item: SelectionItem::pending(text(LocalizableKey::SelectService), Icon::StepTwo),
            certificate_item: SelectionItem::pending(
                text(LocalizableKey::SelectCertificate),
                Icon::StepThree,
            ),
            document: None,
            qtsps: Vec::new(),
            selected_qtsp_index: 0,
            certificates: Vec::new(),
            selected_certificate_index: 0,
            authorization_url: None,
            bottom_bar_label: text(LocalizableKey::Sign),
            is_bottom_bar_button_enabled: false,
        }
    }

    fn update(&self, intent: Intent, state: &mut State, cmd: &mut Cmd) {
        match intent {
            Intent::Initialize => self.initialize(state, cmd),
            Intent::ViewDocument => {
                if let Some(document) = state.document.clone() {
                    cmd.emit(Effect::Navigation(Navigation::SwitchScreen(Route::DocumentViewer(
                        DocumentViewerConfig {
                            is_signed: false,
                            document,
                        },
                    ))));
                }
            }
            Intent::DocumentConfirmed => {
                if state.document.is_none() || state.screen_state != OptionsSelectionState::QtspSelection {
                    return;
                }
                state.document_item.trailing_icon = Some(Icon::Check);
                if !state.qtsp_item.enabled {
                    state.qtsp_item = SelectionItem::available(state.qtsp_item.title.clone(), Icon::StepTwo);
                }
            }
            Intent::QtspItemPressed => {
                if !state.qtsp_item.enabled || state.is_loading {
                    return;
                }
                let sheet = ListSheet {
                    title: self.localizer.text(LocalizableKey::SelectServiceTitle),
                    options: state.qtsps.iter().map(|q| q.name.clone()).collect(),
                    done: self.localizer.text(LocalizableKey::Done),
                };
                open_sheet(state, cmd, SheetContent::SelectQtsp(sheet));
            }
            Intent::QtspIndexSelectedOnRadioButtonPressed(index) => {
                if index < state.qtsps.len() {
                    state.selected_qtsp_index = index;
                }
            }
            Intent::QtspSelectedOnDoneButtonPressed(index) => self.commit_qtsp(index, state, cmd),
            Intent::FetchServiceAuthorizationUrl(service) => {
                if state.is_loading {
                    tracing::debug!(target: "OptionsSelection::update", "service authorization in flight");
                    return;
                }
                state.is_loading = true;
                state.authorization_url = None;
                state.is_bottom_bar_button_enabled = false;

                let interactor = self.interactor.clone();
                cmd.spawn(async move {
                    let result = interactor.get_service_authorization_url(&service).await;
                    Intent::ServiceAuthorizationUrlFetched(service, result)
                });
            }
            Intent::ServiceAuthorizationUrlFetched(service, result) => match result {
                Ok(url) => ready(state, url),
                Err(e) => fail(
                    state,
                    cmd,
                    ErrorView::new(e, Some(Intent::FetchServiceAuthorizationUrl(service)), Intent::DismissError),
                ),
            },
            Intent::AuthorizeServiceAndFetchCertificates => self.fetch_certificates(state, cmd),
            Intent::CertificatesFetched(result) => match result {
                Ok(choice) => {
                    state.certificates = choice.certificates;
                    state.selected_certificate_index = 0;
                    if let Some(first) = state.certificates.first() {
                        state.certificate_item = SelectionItem::completed(first.name.clone(), Icon::StepThree);
                    }
                    ready(state, choice.authorization_url);
                }
                Err(e) => fail(
                    state,
                    cmd,
                    ErrorView::new(e, Some(Intent::AuthorizeServiceAndFetchCertificates), Intent::Finish),
                ),
            },
            Intent::CertificateItemPressed => {
                if !state.certificate_item.enabled || state.is_loading {
                    return;
                }
                let sheet = ListSheet {
                    title: self.localizer.text(LocalizableKey::SelectCertificateTitle),
                    options: state.certificates.iter().map(|c| c.name.clone()).collect(),
                    done: self.localizer.text(LocalizableKey::Done),
                };
                open_sheet(state, cmd, SheetContent::SelectCertificate(sheet));
            }
            Intent::CertificateIndexSelectedOnRadioButtonPressed(index) => {
                if index < state.certificates.len() {
                    state.selected_certificate_index = index;
                }
            }
            Intent::CertificateSelectedOnDoneButtonPressed(index) => {
                self.commit_certificate(index, state, cmd);
            }
            Intent::CredentialAuthorizationUrlFetched(index, result) => match result {
                Ok(url) => {
                    if let Some(certificate) = state.certificates.get(index) {
                        state.selected_certificate_index = index;
                        state.certificate_item =
                            SelectionItem::completed(certificate.name.clone(), Icon::StepThree);
                    }
                    ready(state, url);
                }
                Err(e) => {
                    // the previous certificate and its URL stay committed
                    let title = &state.certificate_item.title;
                    state.selected_certificate_index =
                        state.certificates.iter().position(|c| &c.name == title).unwrap_or_default();
                    state.is_bottom_bar_button_enabled = state.authorization_url.is_some();
                    fail(
                        state,
                        cmd,
                        ErrorView::new(
                            e,
                            Some(Intent::CertificateSelectedOnDoneButtonPressed(index)),
                            Intent::DismissError,
                        ),
                    );
                }
            },
            Intent::BottomBarButtonPressed(url) => {
                cmd.emit(Effect::OpenUrl(url));
                cmd.emit(Effect::Navigation(Navigation::Finish));
            }
            Intent::Pop => {
                let sheet = SheetText::cancellation(&self.localizer);
                open_sheet(state, cmd, SheetContent::ConfirmCancellation(sheet));
            }
            Intent::BottomSheetAction(action) => match action {
                SheetAction::CancelSigning => {
                    close_sheet(state, cmd);
                    cmd.emit(Effect::Navigation(Navigation::Finish));
                }
                SheetAction::ContinueSigning => close_sheet(state, cmd),
                SheetAction::Share | SheetAction::Close => {
                    tracing::debug!(target: "OptionsSelection::update", ?action, "not handled here");
                }
            },
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

impl<S, D> OptionsSelection<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    fn initialize(&self, state: &mut State, cmd: &mut Cmd) {
        state.error = None;

        let document = match self.interactor.get_selected_file() {
            Ok(document) => document,
            Err(e) => {
                fail(state, cmd, ErrorView::new(e, Some(Intent::Initialize), Intent::Finish));
                return;
            }
        };
        state.document_item = SelectionItem {
            action: Some(self.localizer.text(LocalizableKey::View)),
            ..SelectionItem::available(document.name.clone(), Icon::StepOne)
        };
        state.document_item.trailing_icon = None;
        state.document = Some(document);

        match self.config.screen_state {
            OptionsSelectionState::QtspSelection => {
                match self.interactor.get_qtsps() {
                    Ok(qtsps) => state.qtsps = qtsps,
                    Err(e) => {
                        fail(state, cmd, ErrorView::new(e, Some(Intent::Initialize), Intent::Finish));
                        return;
                    }
                }

                // a QTSP chosen earlier in this session unlocks its step
                if let Ok(qtsp) = self.interactor.get_selected_qtsp() {
                    state.selected_qtsp_index =
                        state.qtsps.iter().position(|q| q.name == qtsp.name).unwrap_or_default();
                    state.document_item.trailing_icon = Some(Icon::Check);
                    state.qtsp_item = SelectionItem::completed(qtsp.name, Icon::StepTwo);
                }
            }
            OptionsSelectionState::CertificateSelection => {
                let qtsp = match self.interactor.get_selected_qtsp() {
                    Ok(qtsp) => qtsp,
                    Err(e) => {
                        fail(state, cmd, ErrorView::new(e, Some(Intent::Initialize), Intent::Finish));
                        return;
                    }
                };
                state.document_item.trailing_icon = Some(Icon::Check);
                state.qtsp_item = SelectionItem {
                    enabled: false,
                    ..SelectionItem::completed(qtsp.name, Icon::StepTwo)
                };
                self.fetch_certificates(state, cmd);
            }
        }
    }

    fn commit_qtsp(&self, index: usize, state: &mut State, cmd: &mut Cmd) {
        if state.screen_state != OptionsSelectionState::QtspSelection || !state.qtsp_item.enabled {
            tracing::debug!(target: "OptionsSelection::commit_qtsp", "QTSP step locked");
            return;
        }
        if state.is_loading {
            tracing::debug!(target: "OptionsSelection::commit_qtsp", "service authorization in flight");
            return;
        }
        let Some(qtsp) = state.qtsps.get(index).cloned() else {
            let e = self.interactor.not_found(LocalizableKey::GenericErrorQtspNotFound);
            fail(state, cmd, ErrorView::new(e, None, Intent::DismissError));
            return;
        };

        match self.interactor.set_selected_qtsp(&qtsp) {
            Ok(service) => {
                state.selected_qtsp_index = index;
                state.qtsp_item = SelectionItem::completed(qtsp.name, Icon::StepTwo);
                close_sheet(state, cmd);
                cmd.emit(Effect::OnSelectedQtspUpdated(service.clone()));
                self.update(Intent::FetchServiceAuthorizationUrl(service), state, cmd);
            }
            Err(e) => fail(
                state,
                cmd,
                ErrorView::new(e, Some(Intent::QtspSelectedOnDoneButtonPressed(index)), Intent::DismissError),
            ),
        }
    }

    fn fetch_certificates(&self, state: &mut State, cmd: &mut Cmd) {
        if state.is_loading {
            tracing::debug!(target: "OptionsSelection::fetch_certificates", "certificate fetch in flight");
            return;
        }
        state.is_loading = true;
        state.authorization_url = None;
        state.is_bottom_bar_button_enabled = false;

        let interactor = self.interactor.clone();
        cmd.spawn(async move {
            let result: Outcome<CertificateChoice> = async {
                let service = interactor.authorize_service().await?;
                let certificates = interactor.get_available_certificates(&service).await?;
                let Some(first) = certificates.first() else {
                    return Err(interactor.not_found(LocalizableKey::GenericErrorCertificatesNotFound));
                };
                let authorization_url =
                    interactor.get_credential_authorization_url(&service, first).await?;
                Ok(CertificateChoice {
                    service,
                    certificates,
                    authorization_url,
                })
            }
            .await;
            Intent::CertificatesFetched(result)
        });
    }

    fn commit_certificate(&self, index: usize, state: &mut State, cmd: &mut Cmd) {
        if state.screen_state != OptionsSelectionState::CertificateSelection
            || !state.certificate_item.enabled
        {
            tracing::debug!(target: "OptionsSelection::commit_certificate", "certificate step locked");
            return;
        }
        if state.is_loading {
            tracing::debug!(target: "OptionsSelection::commit_certificate", "credential authorization in flight");
            return;
        }
        let Some(certificate) = state.certificates.get(index).cloned() else {
            let e = self.interactor.not_found(LocalizableKey::GenericErrorCertificatesNotFound);
            fail(state, cmd, ErrorView::new(e, None, Intent::DismissError));
            return;
        };
        close_sheet(state, cmd);

        let service = match self.interactor.get_authorized_service() {
            Ok(service) => service,
            Err(e) => {
                fail(
                    state,
                    cmd,
                    ErrorView::new(e, Some(Intent::AuthorizeServiceAndFetchCertificates), Intent::Finish),
                );
                return;
            }
        };

        state.is_loading = true;
        state.is_bottom_bar_button_enabled = false;

        let interactor = self.interactor.clone();
        cmd.spawn(async move {
            let result = interactor.get_credential_authorization_url(&service, &certificate).await;
            Intent::CredentialAuthorizationUrlFetched(index, result)
        });
    }
}

// The step is complete and the user can leave for `url`.
fn ready(state: &mut State, url: Url) {
    state.is_loading = false;
    state.error = None;
    state.authorization_url = Some(url);
    state.is_bottom_bar_button_enabled = true;
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

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_let_bind::assert_let;
    use rqes_core::LocalizableKey;
    use test_utils::sample;
    use test_utils::service::{Failure, FakeSigningService, Operation};
    use test_utils::store::MemoryDocumentStore;

    use super::*;
    use crate::session::Session;
    use crate::testing::WorkflowTester;

    type Screen = OptionsSelection<FakeSigningService, MemoryDocumentStore>;

    struct Fixture {
        tester: WorkflowTester<Screen>,
        session: Session,
    }

    fn fixture(service: FakeSigningService, mode: OptionsSelectionState) -> Fixture {
        test_utils::init_tracer();
        let config = sample::config();
        let localizer =
            Localizer::new(config.locale.clone(), config.translations.clone()).expect("should create");
        let session = Session::new();
        session.set_file(sample::document());
        let interactor = Interactor::new(
            service,
            MemoryDocumentStore::new(),
            session.clone(),
            config.qtsps,
            localizer.clone(),
        );
        let screen = OptionsSelection::new(
            interactor,
            localizer,
            OptionsSelectionConfig { screen_state: mode },
        );
        Fixture {
            tester: WorkflowTester::new(screen),
            session,
        }
    }

    fn qtsp_fixture() -> Fixture {
        fixture(FakeSigningService::new(), OptionsSelectionState::QtspSelection)
    }

    // A session that has returned from service authorization.
    fn certificate_fixture(service: FakeSigningService) -> Fixture {
        let fixture = fixture(service, OptionsSelectionState::CertificateSelection);
        let qtsp = sample::qtsps().remove(0);
        fixture.session.set_qtsp(qtsp.clone(), sample::service(&qtsp));
        fixture.session.set_authorization_code("service-code");
        fixture
    }

    #[test]
    fn initial_state_is_pure() {
        let fixture = qtsp_fixture();
        assert_eq!(fixture.tester.initial_state(), fixture.tester.initial_state());
        assert!(fixture.tester.initial_state().error.is_none());
    }

    #[tokio::test]
    async fn initialize_populates_document() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();

        let effects = fixture.tester.run(Intent::Initialize, &mut state).await;
        assert!(effects.is_empty());
        assert!(state.error.is_none());
        assert_eq!(state.document_item.title, sample::document().name);
        assert_eq!(state.document_item.leading_icon, Icon::StepOne);
        assert_eq!(state.document_item.action, Some(LocalizableKey::View.default_translation(&[])));
        assert_eq!(state.qtsps.len(), sample::qtsps().len());

        // QTSP step stays locked until the document is confirmed
        assert!(!state.qtsp_item.enabled);
        fixture.tester.update(Intent::QtspItemPressed, &mut state);
        assert!(!state.is_bottom_sheet_open);

        fixture.tester.update(Intent::DocumentConfirmed, &mut state);
        assert!(state.qtsp_item.enabled);
        assert!(!state.certificate_item.enabled);
    }

    #[tokio::test]
    async fn initialize_without_document() {
        let fixture = qtsp_fixture();
        fixture.session.reset();
        let mut state = fixture.tester.initial_state();

        fixture.tester.run(Intent::Initialize, &mut state).await;
        assert_let!(Some(error), &state.error);
        assert_eq!(error.message, LocalizableKey::GenericErrorDocumentNotFound.default_translation(&[]));
        assert_eq!(error.on_retry, Some(Intent::Initialize));
        assert_eq!(error.on_cancel, Intent::Finish);
    }

    #[tokio::test]
    async fn selected_qtsp_unlocks_step() {
        let fixture = qtsp_fixture();
        let qtsp = sample::qtsps().remove(1);
        fixture.session.set_qtsp(qtsp.clone(), sample::service(&qtsp));
        let mut state = fixture.tester.initial_state();

        fixture.tester.run(Intent::Initialize, &mut state).await;
        assert!(state.qtsp_item.enabled);
        assert_eq!(state.qtsp_item.title, qtsp.name);
        assert_eq!(state.selected_qtsp_index, 1);
    }

    #[tokio::test]
    async fn index_selection_has_no_effects() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;

        let before = state.clone();
        let update = fixture.tester.update(Intent::QtspIndexSelectedOnRadioButtonPressed(1), &mut state);
        assert!(update.effects.is_empty());
        assert!(!update.has_tasks());
        assert_eq!(state.selected_qtsp_index, 1);
        assert_eq!(State { selected_qtsp_index: 0, ..state.clone() }, before);

        state.certificates = sample::certificates(2);
        let update =
            fixture.tester.update(Intent::CertificateIndexSelectedOnRadioButtonPressed(1), &mut state);
        assert!(update.effects.is_empty());
        assert_eq!(state.selected_certificate_index, 1);
    }

    #[tokio::test]
    async fn commit_qtsp() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        fixture.tester.update(Intent::DocumentConfirmed, &mut state);
        fixture.tester.update(Intent::QtspItemPressed, &mut state);
        assert_let!(Some(SheetContent::SelectQtsp(sheet)), &state.sheet_content);
        assert_eq!(sheet.options.len(), 2);

        let update = fixture.tester.update(Intent::QtspSelectedOnDoneButtonPressed(0), &mut state);
        let service = fixture.session.service().expect("should have service");
        assert_eq!(
            update.effects,
            vec![Effect::CloseBottomSheet, Effect::OnSelectedQtspUpdated(service.clone())]
        );
        assert!(state.is_loading);
        assert!(!state.is_bottom_sheet_open);

        let intents = update.resolve().await;
        assert_eq!(intents.len(), 1);
        fixture.tester.update(intents[0].clone(), &mut state);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.is_bottom_bar_button_enabled);
        assert_eq!(state.authorization_url, Some(sample::service_authorization_url(&service)));
    }

    #[tokio::test]
    async fn commit_qtsp_while_loading() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        state.is_loading = true;

        let update = fixture.tester.update(Intent::QtspSelectedOnDoneButtonPressed(0), &mut state);
        assert!(update.effects.is_empty());
        assert!(!update.has_tasks());
        assert!(fixture.session.service().is_none());
    }

    #[tokio::test]
    async fn commit_qtsp_before_document() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        assert!(!state.qtsp_item.enabled);

        let update = fixture.tester.update(Intent::QtspSelectedOnDoneButtonPressed(0), &mut state);
        assert!(update.effects.is_empty());
        assert!(!update.has_tasks());
        assert!(fixture.session.service().is_none());
        assert!(state.authorization_url.is_none());
        assert!(!state.is_bottom_bar_button_enabled);
    }

    #[tokio::test]
    async fn commit_certificate_in_qtsp_step() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        state.certificates = sample::certificates(2);

        let update =
            fixture.tester.update(Intent::CertificateSelectedOnDoneButtonPressed(1), &mut state);
        assert!(update.effects.is_empty());
        assert!(!update.has_tasks());
        assert!(fixture.session.certificate().is_none());
    }

    #[tokio::test]
    async fn authorization_url_failure_retries() {
        let service = FakeSigningService::new();
        service.fail(Operation::ServiceAuthorizationUrl, Failure::Error("offline".into()));
        let fixture = fixture(service.clone(), OptionsSelectionState::QtspSelection);
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        fixture.tester.update(Intent::DocumentConfirmed, &mut state);

        fixture.tester.run(Intent::QtspSelectedOnDoneButtonPressed(0), &mut state).await;
        assert_let!(Some(error), &state.error);
        assert_eq!(error.message, "offline");
        assert!(!state.is_loading);
        assert!(!state.is_bottom_bar_button_enabled);

        service.recover(Operation::ServiceAuthorizationUrl);
        fixture.tester.run(Intent::RetryRequested, &mut state).await;
        assert!(state.error.is_none());
        assert!(state.is_bottom_bar_button_enabled);
    }

    #[tokio::test]
    async fn certificates_fetched() {
        let fixture = certificate_fixture(FakeSigningService::new());
        let mut state = fixture.tester.initial_state();

        fixture.tester.run(Intent::Initialize, &mut state).await;
        assert_eq!(state.certificates.len(), 2);
        assert_eq!(state.selected_certificate_index, 0);
        assert!(state.is_bottom_bar_button_enabled);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.certificate_item.enabled);
        assert!(!state.qtsp_item.enabled);
        assert_eq!(fixture.session.certificate(), state.certificates.first().cloned());
    }

    #[rstest::rstest]
    #[case(Failure::Error("X".into()), "X")]
    #[case(Failure::Error(String::new()), "Something went wrong. Please try again.")]
    #[case(Failure::Panic(None), "Something went wrong. Please try again.")]
    #[tokio::test]
    async fn authorize_service_failure(#[case] failure: Failure, #[case] expected: &str) {
        let service = FakeSigningService::new();
        service.fail(Operation::AuthorizeService, failure);
        let fixture = certificate_fixture(service);
        let mut state = fixture.tester.initial_state();

        fixture.tester.run(Intent::AuthorizeServiceAndFetchCertificates, &mut state).await;
        assert_let!(Some(error), &state.error);
        assert_eq!(error.message, expected);
        assert_eq!(error.on_retry, Some(Intent::AuthorizeServiceAndFetchCertificates));
        assert_eq!(error.on_cancel, Intent::Finish);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn fetch_certificates_once() {
        let service = FakeSigningService::new().with_latency(Duration::from_millis(10));
        let fixture = certificate_fixture(service.clone());
        let mut state = fixture.tester.initial_state();

        let first = fixture.tester.update(Intent::AuthorizeServiceAndFetchCertificates, &mut state);
        let second = fixture.tester.update(Intent::AuthorizeServiceAndFetchCertificates, &mut state);
        assert!(first.has_tasks());
        assert!(!second.has_tasks());

        first.resolve().await;
        assert_eq!(service.calls(Operation::AuthorizeService), 1);
    }

    #[tokio::test]
    async fn change_certificate() {
        let fixture = certificate_fixture(FakeSigningService::new());
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        let first_url = state.authorization_url.clone();

        fixture.tester.update(Intent::CertificateItemPressed, &mut state);
        assert_let!(Some(SheetContent::SelectCertificate(_)), &state.sheet_content);
        fixture.tester.update(Intent::CertificateIndexSelectedOnRadioButtonPressed(1), &mut state);

        let effects =
            fixture.tester.run(Intent::CertificateSelectedOnDoneButtonPressed(1), &mut state).await;
        assert_eq!(effects, vec![Effect::CloseBottomSheet]);
        assert_eq!(state.certificate_item.title, state.certificates[1].name);
        assert_eq!(fixture.session.certificate(), Some(state.certificates[1].clone()));
        assert!(state.is_bottom_bar_button_enabled);
        assert_ne!(state.authorization_url, first_url);
    }

    #[tokio::test]
    async fn change_certificate_failure_keeps_previous() {
        let service = FakeSigningService::new();
        let fixture = certificate_fixture(service.clone());
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        let first = state.certificates[0].clone();
        let first_url = state.authorization_url.clone();

        service.fail(Operation::CredentialAuthorizationUrl, Failure::Error("expired".into()));
        fixture.tester.update(Intent::CertificateItemPressed, &mut state);
        fixture.tester.update(Intent::CertificateIndexSelectedOnRadioButtonPressed(1), &mut state);
        fixture.tester.run(Intent::CertificateSelectedOnDoneButtonPressed(1), &mut state).await;
        assert_let!(Some(error), &state.error);
        assert_eq!(error.message, "expired");

        fixture.tester.update(Intent::DismissError, &mut state);
        assert_eq!(state.certificate_item.title, first.name);
        assert_eq!(state.selected_certificate_index, 0);
        assert_eq!(fixture.session.certificate(), Some(first));
        assert_eq!(state.authorization_url, first_url);
        assert!(state.is_bottom_bar_button_enabled);

        // a retry commits the new certificate
        service.recover(Operation::CredentialAuthorizationUrl);
        fixture.tester.run(Intent::CertificateSelectedOnDoneButtonPressed(1), &mut state).await;
        assert!(state.error.is_none());
        assert_eq!(state.certificate_item.title, state.certificates[1].name);
        assert_eq!(state.selected_certificate_index, 1);
        assert_eq!(fixture.session.certificate(), Some(state.certificates[1].clone()));
    }

    #[tokio::test]
    async fn bottom_bar_leaves_for_qtsp() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        let url = Url::parse("https://qtsp.example/authorize").expect("should parse");

        let update = fixture.tester.update(Intent::BottomBarButtonPressed(url.clone()), &mut state);
        assert_eq!(update.effects, vec![Effect::OpenUrl(url), Effect::Navigation(Navigation::Finish)]);
    }

    #[tokio::test]
    async fn pop_confirms_cancellation() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;

        let update = fixture.tester.update(Intent::Pop, &mut state);
        assert_eq!(update.effects, vec![Effect::ShowBottomSheet]);
        assert_let!(Some(SheetContent::ConfirmCancellation(_)), &state.sheet_content);
        assert!(state.is_bottom_sheet_open);

        let update = fixture
            .tester
            .update(Intent::BottomSheetAction(SheetAction::ContinueSigning), &mut state);
        assert_eq!(update.effects, vec![Effect::CloseBottomSheet]);

        fixture.tester.update(Intent::Pop, &mut state);
        let update =
            fixture.tester.update(Intent::BottomSheetAction(SheetAction::CancelSigning), &mut state);
        assert_eq!(
            update.effects,
            vec![Effect::CloseBottomSheet, Effect::Navigation(Navigation::Finish)]
        );
    }

    #[tokio::test]
    async fn error_closes_sheet() {
        let service = FakeSigningService::new();
        service.fail(Operation::CreateService, Failure::Error("rejected".into()));
        let fixture = fixture(service, OptionsSelectionState::QtspSelection);
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        fixture.tester.update(Intent::DocumentConfirmed, &mut state);
        fixture.tester.update(Intent::QtspItemPressed, &mut state);

        let update = fixture.tester.update(Intent::QtspSelectedOnDoneButtonPressed(0), &mut state);
        assert_eq!(update.effects, vec![Effect::CloseBottomSheet]);
        assert!(!state.is_bottom_sheet_open);
        assert_let!(Some(error), &state.error);
        assert_eq!(error.message, "rejected");
    }

    #[tokio::test]
    async fn dismiss_error() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.update(Intent::DismissError, &mut state);
        assert!(state.error.is_none());

        fixture.session.reset();
        fixture.tester.run(Intent::Initialize, &mut state).await;
        assert!(state.error.is_some());
        let update = fixture.tester.update(Intent::DismissError, &mut state);
        assert!(state.error.is_none());
        assert!(update.effects.is_empty());
    }

    #[tokio::test]
    async fn view_document() {
        let fixture = qtsp_fixture();
        let mut state = fixture.tester.initial_state();
        fixture.tester.run(Intent::Initialize, &mut state).await;

        let update = fixture.tester.update(Intent::ViewDocument, &mut state);
        assert_eq!(
            update.effects,
            vec![Effect::Navigation(Navigation::SwitchScreen(Route::DocumentViewer(
                DocumentViewerConfig {
                    is_signed: false,
                    document: sample::document(),
                }
            )))]
        );
    }
}
