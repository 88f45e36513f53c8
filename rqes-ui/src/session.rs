//! # Session
//!
//! The signing session shared by every screen of a flow: the document being
//! signed, the selections made so far and the authorization code returned by
//! the most recent redirect.
//!
//! A `Session` is passed explicitly to the components that need it; clones
//! share the same underlying state. Accessors return copies and never hold
//! the lock across an await, so each caller re-reads current values.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rqes_core::provider::{AuthorizedService, CertificateData, ServiceHandle};
use rqes_core::{DocumentRef, QtspData};
use serde::{Deserialize, Serialize};

/// Progress of the overall flow across redirects to the QTSP.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum SdkState {
    /// No flow in progress.
    #[default]
    None,

    /// Document chosen; QTSP selection and service authorization pending.
    Initial,

    /// Service authorized; certificate selection pending.
    Certificate,

    /// Credential authorized; signing pending.
    Sign,
}

#[derive(Clone, Debug, Default)]
struct Inner {
    state: SdkState,
    file: Option<DocumentRef>,
    qtsp: Option<QtspData>,
    service: Option<ServiceHandle>,
    authorized_service: Option<AuthorizedService>,
    certificate: Option<CertificateData>,
    authorization_code: Option<String>,
}

/// Shared, mutable session context.
#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<RwLock<Inner>>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Writers replace whole fields, so a poisoned lock still holds consistent
    // data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear every selection and return to [`SdkState::None`].
    pub fn reset(&self) {
        *self.write() = Inner::default();
    }

    /// Current flow state.
    #[must_use]
    pub fn state(&self) -> SdkState {
        self.read().state
    }

    /// Set the flow state.
    pub fn set_state(&self, state: SdkState) {
        self.write().state = state;
    }

    /// Document being signed.
    #[must_use]
    pub fn file(&self) -> Option<DocumentRef> {
        self.read().file.clone()
    }

    /// Set the document being signed.
    pub fn set_file(&self, file: DocumentRef) {
        self.write().file = Some(file);
    }

    /// Selected QTSP.
    #[must_use]
    pub fn qtsp(&self) -> Option<QtspData> {
        self.read().qtsp.clone()
    }

    /// Record the selected QTSP and the service created for it. Selecting a
    /// QTSP invalidates any later selection.
    pub fn set_qtsp(&self, qtsp: QtspData, service: ServiceHandle) {
        let mut inner = self.write();
        inner.qtsp = Some(qtsp);
        inner.service = Some(service);
        inner.authorized_service = None;
        inner.certificate = None;
    }

    /// Service created for the selected QTSP.
    #[must_use]
    pub fn service(&self) -> Option<ServiceHandle> {
        self.read().service.clone()
    }

    /// Authorized service.
    #[must_use]
    pub fn authorized_service(&self) -> Option<AuthorizedService> {
        self.read().authorized_service.clone()
    }

    /// Record the authorized service.
    pub fn set_authorized_service(&self, service: AuthorizedService) {
        self.write().authorized_service = Some(service);
    }

    /// Selected certificate.
    #[must_use]
    pub fn certificate(&self) -> Option<CertificateData> {
        self.read().certificate.clone()
    }

    /// Record the selected certificate.
    pub fn set_certificate(&self, certificate: CertificateData) {
        self.write().certificate = Some(certificate);
    }

    /// Authorization code from the latest redirect.
    #[must_use]
    pub fn authorization_code(&self) -> Option<String> {
        self.read().authorization_code.clone()
    }

    /// Record the authorization code from a redirect.
    pub fn set_authorization_code(&self, code: impl Into<String>) {
        self.write().authorization_code = Some(code.into());
    }
}
