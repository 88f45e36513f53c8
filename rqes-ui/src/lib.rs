//! # RQES UI
//!
//! Workflow controllers for a remote qualified electronic signature (RQES)
//! flow: review a document, choose a Qualified Trust Service Provider (QTSP),
//! authorize the signing service, choose a certificate, authorize the
//! credential, sign, then view or share the signed document.
//!
//! The crate does not render anything. Each screen is a [`Workflow`] whose
//! state, intents and effects a platform UI binds to. Cryptography, OAuth2
//! and the CSC protocol are the job of an external signing-service library,
//! plugged in through the [`SigningService`] trait.
//!
//! # Design
//!
//! ** Workflows **
//!
//! A workflow reduces intents into state, emitting one-shot effects and
//! spawning service calls whose results come back as intents. A
//! [`Controller`] runs a workflow on the tokio runtime, publishing state as a
//! latest-value watch and effects through a single-consumer queue.
//!
//! ** Provider **
//!
//! Implementors provide a [`SigningService`] and a [`DocumentStore`]. Every
//! failure they report, including panics, is shown to the user as a
//! retryable error.
//!
//! ** Session **
//!
//! [`RqesUi`] owns the [`Session`] shared by the screens of a flow and
//! advances it as the host hands back authorization codes.

pub mod interactor;
pub mod logging;
pub mod provider;
pub mod screen;
pub mod sdk;
pub mod session;
pub mod testing;
pub mod workflow;

pub use rqes_core::navigation::{
    DocumentViewerConfig, Navigation, OptionsSelectionConfig, OptionsSelectionState, Route,
};
pub use rqes_core::preferences::{MemoryPreferences, Preferences};
pub use rqes_core::{
    DocumentRef, Error, LocalizableKey, Localizer, Outcome, QtspData, Result, UiConfig, UiError,
};

pub use crate::provider::{DocumentStore, FsDocumentStore, SigningService};
pub use crate::sdk::{RqesUi, Screen};
pub use crate::session::{SdkState, Session};
pub use crate::workflow::{Commands, Controller, Workflow};
