//! # SDK Entry Point
//!
//! [`RqesUi`] is created once by the host application. It owns the signing
//! session and builds the screen workflows for each route.
//!
//! The flow leaves the app twice, once for each OAuth2 authorization. The
//! host calls [`RqesUi::resume`] with the authorization code from each
//! redirect and opens the returned route:
//!
//! ```text
//! initiate(document) -> options_selection (QTSP)         -> redirect
//! resume(code)       -> options_selection (certificate)  -> redirect
//! resume(code)       -> success
//! ```

use std::fmt;

use rqes_core::navigation::{
    DocumentViewerConfig, OptionsSelectionConfig, OptionsSelectionState, Route,
};
use rqes_core::provider::{DocumentStore, SigningService};
use rqes_core::{DocumentRef, Error, Localizer, Result, UiConfig};
use tracing::instrument;

use crate::interactor::Interactor;
use crate::logging;
use crate::screen::document_viewer::DocumentViewer;
use crate::screen::options_selection::OptionsSelection;
use crate::screen::success::Success;
use crate::session::{SdkState, Session};
use crate::workflow::Controller;

/// The SDK.
pub struct RqesUi<S, D> {
    config: UiConfig,
    localizer: Localizer,
    session: Session,
    interactor: Interactor<S, D>,
}

/// A started screen.
pub enum Screen<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    /// Options selection.
    OptionsSelection(Controller<OptionsSelection<S, D>>),

    /// Signing summary.
    Success(Controller<Success<S, D>>),

    /// Document viewer.
    DocumentViewer(Controller<DocumentViewer>),
}

impl<S, D> fmt::Debug for RqesUi<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RqesUi")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<S, D> fmt::Debug for Screen<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptionsSelection(controller) => {
                f.debug_tuple("OptionsSelection").field(controller).finish()
            }
            Self::Success(controller) => f.debug_tuple("Success").field(controller).finish(),
            Self::DocumentViewer(controller) => {
                f.debug_tuple("DocumentViewer").field(controller).finish()
            }
        }
    }
}

impl<S, D> RqesUi<S, D>
where
    S: SigningService + 'static,
    D: DocumentStore + 'static,
{
    /// Create the SDK.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `config` is invalid.
    pub fn new(config: UiConfig, service: S, store: D) -> Result<Self> {
        config.validate()?;
        logging::init(config.print_logs);

        let localizer = Localizer::new(config.locale.clone(), config.translations.clone())?;
        let session = Session::new();
        let interactor =
            Interactor::new(service, store, session.clone(), config.qtsps.clone(), localizer.clone());

        Ok(Self {
            config,
            localizer,
            session,
            interactor,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &UiConfig {
        &self.config
    }

    /// The signing session.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Current flow state.
    pub fn state(&self) -> SdkState {
        self.session.state()
    }

    /// Start a new flow for `document`, discarding any flow in progress.
    #[instrument(level = "debug", skip(self))]
    pub fn initiate(&self, document: DocumentRef) -> Route {
        self.session.reset();
        self.session.set_file(document);
        self.session.set_state(SdkState::Initial);

        Route::OptionsSelection(OptionsSelectionConfig {
            screen_state: OptionsSelectionState::QtspSelection,
        })
    }

    /// Continue the flow with the code from an authorization redirect.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an empty code and `Error::Navigation`
    /// when no authorization is pending.
    #[instrument(level = "debug", skip(self, authorization_code))]
    pub fn resume(&self, authorization_code: &str) -> Result<Route> {
        if authorization_code.trim().is_empty() {
            tracing::error!(target: "RqesUi::resume", "empty authorization code");
            return Err(Error::NotFound("authorization code".into()));
        }

        let (next, route) = match self.session.state() {
            SdkState::Initial => (
                SdkState::Certificate,
                Route::OptionsSelection(OptionsSelectionConfig {
                    screen_state: OptionsSelectionState::CertificateSelection,
                }),
            ),
            SdkState::Certificate => (SdkState::Sign, Route::Success),
            state => {
                tracing::error!(target: "RqesUi::resume", ?state, "no authorization pending");
                return Err(Error::Navigation(format!("cannot resume from {state:?}")));
            }
        };

        self.session.set_authorization_code(authorization_code);
        self.session.set_state(next);
        Ok(route)
    }

    /// End the flow and clear the session.
    #[instrument(level = "debug", skip(self))]
    pub fn finish(&self) {
        self.session.reset();
    }

    /// The route matching the current flow state, if a flow is in progress.
    pub fn current_route(&self) -> Option<Route> {
        match self.session.state() {
            SdkState::None => None,
            SdkState::Initial => Some(Route::OptionsSelection(OptionsSelectionConfig {
                screen_state: OptionsSelectionState::QtspSelection,
            })),
            SdkState::Certificate => Some(Route::OptionsSelection(OptionsSelectionConfig {
                screen_state: OptionsSelectionState::CertificateSelection,
            })),
            SdkState::Sign => Some(Route::Success),
        }
    }

    /// Options-selection workflow for `config`.
    pub fn options_selection(&self, config: OptionsSelectionConfig) -> OptionsSelection<S, D> {
        OptionsSelection::new(self.interactor.clone(), self.localizer.clone(), config)
    }

    /// Success workflow.
    pub fn success(&self) -> Success<S, D> {
        Success::new(self.interactor.clone(), self.localizer.clone())
    }

    /// Document viewer workflow for `config`.
    pub fn document_viewer(&self, config: DocumentViewerConfig) -> DocumentViewer {
        DocumentViewer::new(self.localizer.clone(), config)
    }

    /// Start the screen for `route`. The caller submits `Initialize` once
    /// observers are attached.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn open(&self, route: &Route) -> Screen<S, D> {
        tracing::debug!(target: "RqesUi::open", screen = route.screen());
        match route {
            Route::OptionsSelection(config) => {
                Screen::OptionsSelection(Controller::start(self.options_selection(config.clone())))
            }
            Route::Success => Screen::Success(Controller::start(self.success())),
            Route::DocumentViewer(config) => {
                Screen::DocumentViewer(Controller::start(self.document_viewer(config.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_let_bind::assert_let;
    use test_utils::sample;
    use test_utils::service::FakeSigningService;
    use test_utils::store::MemoryDocumentStore;

    use super::*;

    fn sdk() -> RqesUi<FakeSigningService, MemoryDocumentStore> {
        RqesUi::new(sample::config(), FakeSigningService::new(), MemoryDocumentStore::new())
            .expect("should create")
    }

    #[test]
    fn invalid_config() {
        let config = UiConfig {
            qtsps: vec![],
            ..sample::config()
        };
        let result = RqesUi::new(config, FakeSigningService::new(), MemoryDocumentStore::new());
        assert_let!(Err(Error::Configuration(_)), result);
    }

    #[test]
    fn state_transitions() {
        let sdk = sdk();
        assert_eq!(sdk.state(), SdkState::None);
        assert_eq!(sdk.current_route(), None);

        let route = sdk.initiate(sample::document());
        assert_eq!(sdk.state(), SdkState::Initial);
        assert_eq!(sdk.current_route(), Some(route));

        assert_let!(Ok(Route::OptionsSelection(config)), sdk.resume("service-code"));
        assert_eq!(config.screen_state, OptionsSelectionState::CertificateSelection);
        assert_eq!(sdk.state(), SdkState::Certificate);

        assert_eq!(sdk.resume("credential-code").expect("should resume"), Route::Success);
        assert_eq!(sdk.state(), SdkState::Sign);
        assert_eq!(sdk.session().authorization_code().as_deref(), Some("credential-code"));

        assert_let!(Err(Error::Navigation(_)), sdk.resume("another-code"));

        sdk.finish();
        assert_eq!(sdk.state(), SdkState::None);
        assert!(sdk.session().file().is_none());
    }

    #[test]
    fn resume_without_flow() {
        let sdk = sdk();
        assert_let!(Err(Error::Navigation(_)), sdk.resume("code"));

        sdk.initiate(sample::document());
        assert_let!(Err(Error::NotFound(_)), sdk.resume(" "));
        assert_eq!(sdk.state(), SdkState::Initial);
    }

    #[test]
    fn initiate_discards_previous_flow() {
        let sdk = sdk();
        sdk.initiate(sample::document());
        sdk.resume("service-code").expect("should resume");

        sdk.initiate(sample::document());
        assert_eq!(sdk.state(), SdkState::Initial);
        assert!(sdk.session().authorization_code().is_none());
    }

    #[tokio::test]
    async fn open_routes() {
        let sdk = sdk();
        let route = sdk.initiate(sample::document());
        assert_let!(Screen::OptionsSelection(controller), sdk.open(&route));
        assert_eq!(
            controller.state().screen_state,
            OptionsSelectionState::QtspSelection
        );

        assert_let!(Screen::Success(_), sdk.open(&Route::Success));

        let viewer = Route::DocumentViewer(DocumentViewerConfig {
            is_signed: false,
            document: sample::document(),
        });
        assert_let!(Screen::DocumentViewer(controller), sdk.open(&viewer));
        assert!(!controller.state().is_signed);
    }
}
