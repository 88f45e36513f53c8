//! # Provider
//!
//! The provider traits exported by this module are the boundary between the
//! SDK and the external signing-service library. The library owns OAuth2,
//! the CSC protocol and the cryptography; the SDK only sequences calls and
//! renders their results.
//!
//! Implementations return `anyhow::Result`. The SDK converts every error
//! into a user-facing failure, so implementations should attach a readable
//! message.

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::QtspData;
use crate::document::DocumentRef;

/// A remote signing service created for a QTSP, not yet authorized.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceHandle {
    /// Identifier assigned by the signing-service library.
    pub id: String,

    /// The provider the service talks to.
    pub qtsp: QtspData,
}

/// A remote signing service the user has authorized.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizedService {
    /// Identifier assigned by the signing-service library.
    pub id: String,

    /// The service that was authorized.
    pub service: ServiceHandle,
}

/// A signing certificate (CSC credential) held by the user at a QTSP.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CertificateData {
    /// CSC credential identifier.
    pub id: String,

    /// Display name, usually the certificate subject.
    pub name: String,

    /// Certificate issuer, shown on the signed-document summary.
    pub issuer: String,
}

/// A credential the user has authorized for signing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizedCredential {
    /// Identifier assigned by the signing-service library.
    pub id: String,

    /// The certificate the credential signs with.
    pub certificate: CertificateData,
}

/// A signed document produced by the signing service.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SignedDocument {
    /// Name of the source document.
    pub name: String,

    /// Signed content (`PAdES` PDF).
    pub content: Vec<u8>,
}

/// Output of a signing operation, one entry per source document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SignedDocuments {
    /// The signed documents, in source order.
    pub documents: Vec<SignedDocument>,
}

/// `SigningService` is implemented by the external signing-service library.
///
/// Calls are made in flow order: create a service for the chosen QTSP, send
/// the user to the service authorization URL, authorize the service with the
/// returned code, list certificates, send the user to the credential
/// authorization URL, authorize the credential with the second code, and
/// sign.
pub trait SigningService: Send + Sync {
    /// Create a service for `qtsp`. Does not contact the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the QTSP configuration is unusable.
    fn create_service(&self, qtsp: &QtspData) -> anyhow::Result<ServiceHandle>;

    /// URL the user must visit to authorize the service.
    fn service_authorization_url(
        &self, service: &ServiceHandle,
    ) -> impl Future<Output = anyhow::Result<Url>> + Send;

    /// Exchange the authorization code for an authorized service.
    fn authorize_service(
        &self, service: &ServiceHandle, authorization_code: &str,
    ) -> impl Future<Output = anyhow::Result<AuthorizedService>> + Send;

    /// List the certificates available to the user.
    fn list_certificates(
        &self, service: &AuthorizedService,
    ) -> impl Future<Output = anyhow::Result<Vec<CertificateData>>> + Send;

    /// URL the user must visit to authorize `certificate` for signing
    /// `documents`.
    fn credential_authorization_url(
        &self, service: &AuthorizedService, certificate: &CertificateData,
        documents: &[DocumentRef],
    ) -> impl Future<Output = anyhow::Result<Url>> + Send;

    /// Exchange the authorization code for an authorized credential.
    fn authorize_credential(
        &self, service: &AuthorizedService, certificate: &CertificateData,
        authorization_code: &str,
    ) -> impl Future<Output = anyhow::Result<AuthorizedCredential>> + Send;

    /// Sign `documents` with an authorized credential.
    fn sign_documents(
        &self, credential: &AuthorizedCredential, documents: &[DocumentRef],
    ) -> impl Future<Output = anyhow::Result<SignedDocuments>> + Send;
}

/// `DocumentStore` persists signed documents so they can be viewed or
/// shared.
pub trait DocumentStore: Send + Sync {
    /// Save `content` under `name`, overwriting any previous document of the
    /// same name, and return its location.
    fn save(&self, name: &str, content: &[u8]) -> impl Future<Output = anyhow::Result<Url>> + Send;
}
