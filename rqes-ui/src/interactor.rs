//! # Interactor
//!
//! The interactor sits between the screens and the external signing-service
//! library. It reads the current selections from the [`Session`], calls the
//! service, records the results back into the session and converts every
//! failure into a [`UiError`]:
//!
//! - an `anyhow::Error` keeps its message, or the generic description when
//!   the message is empty;
//! - a panic inside a service call keeps its payload message, or the generic
//!   description when the payload carries none;
//! - a missing selection becomes a "not found" error for the step.
//!
//! Nothing escapes as a panic or a raw error, so screens only ever deal with
//! [`Outcome`]s.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use rqes_core::provider::{
    AuthorizedCredential, AuthorizedService, CertificateData, DocumentStore, ServiceHandle,
    SignedDocuments, SigningService,
};
use rqes_core::{DocumentRef, LocalizableKey, Localizer, Outcome, QtspData, UiError};
use tracing::instrument;
use url::Url;

use crate::session::Session;

/// Orchestrates calls into the signing service for the screens.
pub struct Interactor<S, D> {
    service: Arc<S>,
    store: Arc<D>,
    session: Session,
    qtsps: Arc<Vec<QtspData>>,
    localizer: Localizer,
}

impl<S, D> Clone for Interactor<S, D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            store: Arc::clone(&self.store),
            session: self.session.clone(),
            qtsps: Arc::clone(&self.qtsps),
            localizer: self.localizer.clone(),
        }
    }
}

impl<S, D> fmt::Debug for Interactor<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactor")
            .field("session", &self.session)
            .field("qtsps", &self.qtsps)
            .finish_non_exhaustive()
    }
}

impl<S, D> Interactor<S, D>
where
    S: SigningService,
    D: DocumentStore,
{
    /// Create an interactor over `service` and `store`.
    pub fn new(
        service: S, store: D, session: Session, qtsps: Vec<QtspData>, localizer: Localizer,
    ) -> Self {
        Self {
            service: Arc::new(service),
            store: Arc::new(store),
            session,
            qtsps: Arc::new(qtsps),
            localizer,
        }
    }

    /// The document being signed.
    ///
    /// # Errors
    ///
    /// Fails when no document has been handed to the SDK.
    pub fn get_selected_file(&self) -> Outcome<DocumentRef> {
        self.session.file().ok_or_else(|| self.not_found(LocalizableKey::GenericErrorDocumentNotFound))
    }

    /// The configured QTSPs.
    ///
    /// # Errors
    ///
    /// Fails when none are configured.
    pub fn get_qtsps(&self) -> Outcome<Vec<QtspData>> {
        if self.qtsps.is_empty() {
            return Err(self.not_found(LocalizableKey::GenericErrorQtspNotFound));
        }
        Ok(self.qtsps.to_vec())
    }

    /// The QTSP selected in this session.
    ///
    /// # Errors
    ///
    /// Fails when no QTSP has been selected.
    pub fn get_selected_qtsp(&self) -> Outcome<QtspData> {
        self.session.qtsp().ok_or_else(|| self.not_found(LocalizableKey::GenericErrorQtspNotFound))
    }

    /// Select `qtsp` and create a signing service for it.
    ///
    /// # Errors
    ///
    /// Fails when the signing service rejects the QTSP.
    #[instrument(level = "debug", skip(self), fields(qtsp = %qtsp.name))]
    pub fn set_selected_qtsp(&self, qtsp: &QtspData) -> Outcome<ServiceHandle> {
        let created = panic::catch_unwind(AssertUnwindSafe(|| self.service.create_service(qtsp)));
        let service = match created {
            Ok(Ok(service)) => service,
            Ok(Err(e)) => return Err(self.failure(&e)),
            Err(payload) => return Err(self.panic_failure(payload.as_ref())),
        };
        self.session.set_qtsp(qtsp.clone(), service.clone());
        Ok(service)
    }

    /// The authorized service recorded in this session.
    ///
    /// # Errors
    ///
    /// Fails when the service has not been authorized.
    pub fn get_authorized_service(&self) -> Outcome<AuthorizedService> {
        self.session
            .authorized_service()
            .ok_or_else(|| self.not_found(LocalizableKey::GenericErrorServiceNotFound))
    }

    /// URL the user visits to authorize `service`.
    ///
    /// # Errors
    ///
    /// Fails when the signing service fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_service_authorization_url(&self, service: &ServiceHandle) -> Outcome<Url> {
        self.guard(self.service.service_authorization_url(service)).await
    }

    /// Authorize the selected service with the code from the latest
    /// redirect.
    ///
    /// # Errors
    ///
    /// Fails when no service or code is recorded, or the signing service
    /// fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn authorize_service(&self) -> Outcome<AuthorizedService> {
        let service = self
            .session
            .service()
            .ok_or_else(|| self.not_found(LocalizableKey::GenericErrorServiceNotFound))?;
        let code = self.authorization_code()?;

        let authorized = self.guard(self.service.authorize_service(&service, &code)).await?;
        self.session.set_authorized_service(authorized.clone());
        Ok(authorized)
    }

    /// Certificates available through `service`.
    ///
    /// # Errors
    ///
    /// Fails when the signing service fails or returns no certificates.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_available_certificates(
        &self, service: &AuthorizedService,
    ) -> Outcome<Vec<CertificateData>> {
        let certificates = self.guard(self.service.list_certificates(service)).await?;
        if certificates.is_empty() {
            return Err(self.not_found(LocalizableKey::GenericErrorCertificatesNotFound));
        }
        Ok(certificates)
    }

    /// URL the user visits to authorize `certificate` for the selected
    /// document. Records `certificate` as the session's selection.
    ///
    /// # Errors
    ///
    /// Fails when no document is selected or the signing service fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_credential_authorization_url(
        &self, service: &AuthorizedService, certificate: &CertificateData,
    ) -> Outcome<Url> {
        let file = self.get_selected_file()?;
        let url = self
            .guard(self.service.credential_authorization_url(service, certificate, &[file]))
            .await?;
        self.session.set_certificate(certificate.clone());
        Ok(url)
    }

    /// Authorize the selected certificate with the code from the latest
    /// redirect.
    ///
    /// # Errors
    ///
    /// Fails when a selection or the code is missing, or the signing service
    /// fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn authorize_credential(&self) -> Outcome<AuthorizedCredential> {
        let service = self.get_authorized_service()?;
        let certificate = self
            .session
            .certificate()
            .ok_or_else(|| self.not_found(LocalizableKey::GenericErrorCertificatesNotFound))?;
        let code = self.authorization_code()?;

        self.guard(self.service.authorize_credential(&service, &certificate, &code)).await
    }

    /// Sign the selected document.
    ///
    /// # Errors
    ///
    /// Fails when no document is selected or the signing service fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn sign_documents(&self, credential: &AuthorizedCredential) -> Outcome<SignedDocuments> {
        let file = self.get_selected_file()?;
        self.guard(self.service.sign_documents(credential, &[file])).await
    }

    /// Save signed documents under `name`. When there is more than one
    /// document, each name is prefixed with its position.
    ///
    /// # Errors
    ///
    /// Fails when the document store fails.
    #[instrument(level = "debug", skip(self, documents))]
    pub async fn save_signed_documents(
        &self, name: &str, documents: &SignedDocuments,
    ) -> Outcome<Vec<Url>> {
        let single = documents.documents.len() == 1;
        let mut saved = Vec::with_capacity(documents.documents.len());

        for (index, document) in documents.documents.iter().enumerate() {
            let file_name = if single { name.to_string() } else { format!("{index}_{name}") };
            let uri = self.guard(self.store.save(&file_name, &document.content)).await?;
            saved.push(uri);
        }
        Ok(saved)
    }

    /// A "not found" failure for a missing selection.
    pub(crate) fn not_found(&self, key: LocalizableKey) -> UiError {
        let e = UiError::new(self.localizer.text(LocalizableKey::GenericErrorMessage), self.localizer.text(key));
        tracing::error!(target: "Interactor::not_found", ?e);
        e
    }

    fn authorization_code(&self) -> Outcome<String> {
        self.session
            .authorization_code()
            .ok_or_else(|| self.not_found(LocalizableKey::GenericErrorAuthorizationCodeNotFound))
    }

    // Await a service call, converting errors and panics into `UiError`s.
    async fn guard<T>(&self, call: impl Future<Output = anyhow::Result<T>>) -> Outcome<T> {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.failure(&e)),
            Err(payload) => Err(self.panic_failure(payload.as_ref())),
        }
    }

    fn failure(&self, e: &anyhow::Error) -> UiError {
        tracing::error!(target: "Interactor::failure", ?e);
        self.generic_error(e.to_string())
    }

    fn panic_failure(&self, payload: &(dyn Any + Send)) -> UiError {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(target: "Interactor::panic_failure", panic = %message, "signing service panicked");
        self.generic_error(message)
    }

    fn generic_error(&self, message: String) -> UiError {
        let title = self.localizer.text(LocalizableKey::GenericErrorMessage);
        if message.trim().is_empty() {
            return UiError::new(title, self.localizer.text(LocalizableKey::GenericErrorDescription));
        }
        UiError::new(title, message)
    }
}
