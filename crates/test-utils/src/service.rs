//! A scriptable [`SigningService`].
//!
//! Each operation succeeds with sample data unless a [`Failure`] has been
//! scripted for it. Calls are counted so tests can check for duplicates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use rqes_core::provider::{
    AuthorizedCredential, AuthorizedService, CertificateData, ServiceHandle, SignedDocument,
    SignedDocuments, SigningService,
};
use rqes_core::{DocumentRef, QtspData};
use url::Url;

use crate::sample;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateService,
    ServiceAuthorizationUrl,
    AuthorizeService,
    ListCertificates,
    CredentialAuthorizationUrl,
    AuthorizeCredential,
    SignDocuments,
}

#[derive(Clone, Debug)]
pub enum Failure {
    /// Return an error with the message.
    Error(String),

    /// Panic, with the message as payload. `None` panics with a payload
    /// carrying no message.
    Panic(Option<String>),
}

#[derive(Debug)]
struct Inner {
    failures: HashMap<Operation, Failure>,
    calls: HashMap<Operation, usize>,
    certificates: usize,
    latency: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct FakeSigningService {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeSigningService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSigningService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                failures: HashMap::new(),
                calls: HashMap::new(),
                certificates: 2,
                latency: None,
            })),
        }
    }

    /// Number of certificates listed.
    #[must_use]
    pub fn with_certificates(self, count: usize) -> Self {
        self.inner.lock().expect("should lock").certificates = count;
        self
    }

    /// Delay every async operation.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.lock().expect("should lock").latency = Some(latency);
        self
    }

    pub fn fail(&self, operation: Operation, failure: Failure) {
        self.inner.lock().expect("should lock").failures.insert(operation, failure);
    }

    pub fn recover(&self, operation: Operation) {
        self.inner.lock().expect("should lock").failures.remove(&operation);
    }

    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.inner.lock().expect("should lock").calls.get(&operation).copied().unwrap_or_default()
    }

    // Record the call and apply any scripted failure. The lock is released
    // before panicking so it is never poisoned.
    fn begin(&self, operation: Operation) -> Result<()> {
        let failure = {
            let mut inner = self.inner.lock().expect("should lock");
            *inner.calls.entry(operation).or_default() += 1;
            inner.failures.get(&operation).cloned()
        };

        match failure {
            None => Ok(()),
            Some(Failure::Error(message)) => Err(anyhow!("{message}")),
            Some(Failure::Panic(Some(message))) => std::panic::panic_any(message),
            Some(Failure::Panic(None)) => std::panic::panic_any(()),
        }
    }

    async fn delay(&self) {
        let latency = self.inner.lock().expect("should lock").latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl SigningService for FakeSigningService {
    fn create_service(&self, qtsp: &QtspData) -> Result<ServiceHandle> {
        self.begin(Operation::CreateService)?;
        Ok(sample::service(qtsp))
    }

    async fn service_authorization_url(&self, service: &ServiceHandle) -> Result<Url> {
        self.delay().await;
        self.begin(Operation::ServiceAuthorizationUrl)?;
        Ok(sample::service_authorization_url(service))
    }

    async fn authorize_service(
        &self, service: &ServiceHandle, authorization_code: &str,
    ) -> Result<AuthorizedService> {
        self.delay().await;
        self.begin(Operation::AuthorizeService)?;
        if authorization_code.is_empty() {
            return Err(anyhow!("invalid authorization code"));
        }
        Ok(sample::authorized_service(service))
    }

    async fn list_certificates(&self, _: &AuthorizedService) -> Result<Vec<CertificateData>> {
        self.delay().await;
        self.begin(Operation::ListCertificates)?;
        let count = self.inner.lock().expect("should lock").certificates;
        Ok(sample::certificates(count))
    }

    async fn credential_authorization_url(
        &self, service: &AuthorizedService, certificate: &CertificateData, documents: &[DocumentRef],
    ) -> Result<Url> {
        self.delay().await;
        self.begin(Operation::CredentialAuthorizationUrl)?;
        if documents.is_empty() {
            return Err(anyhow!("no documents to authorize"));
        }
        Ok(sample::credential_authorization_url(service, certificate))
    }

    async fn authorize_credential(
        &self, _: &AuthorizedService, certificate: &CertificateData, authorization_code: &str,
    ) -> Result<AuthorizedCredential> {
        self.delay().await;
        self.begin(Operation::AuthorizeCredential)?;
        if authorization_code.is_empty() {
            return Err(anyhow!("invalid authorization code"));
        }
        Ok(AuthorizedCredential {
            id: format!("authorized-{}", certificate.id),
            certificate: certificate.clone(),
        })
    }

    async fn sign_documents(
        &self, _: &AuthorizedCredential, documents: &[DocumentRef],
    ) -> Result<SignedDocuments> {
        self.delay().await;
        self.begin(Operation::SignDocuments)?;
        let documents = documents
            .iter()
            .map(|d| SignedDocument {
                name: d.name.clone(),
                content: sample::signed_content(),
            })
            .collect();
        Ok(SignedDocuments { documents })
    }
}
