//! Sample documents, providers and service objects.

use rqes_core::provider::{AuthorizedService, CertificateData, ServiceHandle};
use rqes_core::{DocumentRef, QtspData, UiConfig};
use url::Url;

pub const DOCUMENT_NAME: &str = "contract.pdf";
pub const ISSUER: &str = "CN=Sample Qualified CA, O=Sample Trust, C=EU";

fn url(s: &str) -> Url {
    Url::parse(s).expect("should parse")
}

#[must_use]
pub fn document() -> DocumentRef {
    DocumentRef::new(DOCUMENT_NAME, url("file:///documents/contract.pdf"))
}

#[must_use]
pub fn remote_document() -> DocumentRef {
    DocumentRef::new(DOCUMENT_NAME, url("https://documents.example.com/contract.pdf"))
}

#[must_use]
pub fn qtsps() -> Vec<QtspData> {
    vec![
        QtspData {
            name: "Alpha Trust".into(),
            endpoint: url("https://alpha.example.com/csc/v2/"),
            tsa_url: Some(url("https://alpha.example.com/tsa")),
            client_id: "alpha-client".into(),
            client_secret: "alpha-secret".into(),
            redirect_uri: url("rqes://oauth/callback"),
        },
        QtspData {
            name: "Beta Sign".into(),
            endpoint: url("https://beta.example.com/csc/v2/"),
            tsa_url: None,
            client_id: "beta-client".into(),
            client_secret: "beta-secret".into(),
            redirect_uri: url("rqes://oauth/callback"),
        },
    ]
}

#[must_use]
pub fn config() -> UiConfig {
    UiConfig {
        qtsps: qtsps(),
        ..UiConfig::default()
    }
}

#[must_use]
pub fn service(qtsp: &QtspData) -> ServiceHandle {
    ServiceHandle {
        id: format!("service-{}", qtsp.client_id),
        qtsp: qtsp.clone(),
    }
}

#[must_use]
pub fn authorized_service(service: &ServiceHandle) -> AuthorizedService {
    AuthorizedService {
        id: format!("authorized-{}", service.id),
        service: service.clone(),
    }
}

#[must_use]
pub fn certificates(count: usize) -> Vec<CertificateData> {
    (0..count)
        .map(|i| CertificateData {
            id: format!("credential-{i}"),
            name: format!("Qualified signing certificate {}", i + 1),
            issuer: ISSUER.into(),
        })
        .collect()
}

#[must_use]
pub fn service_authorization_url(service: &ServiceHandle) -> Url {
    let mut url = service.qtsp.endpoint.join("oauth2/authorize").expect("should join");
    url.query_pairs_mut().append_pair("scope", "service").append_pair("service", &service.id);
    url
}

#[must_use]
pub fn credential_authorization_url(
    service: &AuthorizedService, certificate: &CertificateData,
) -> Url {
    let mut url = service.service.qtsp.endpoint.join("oauth2/authorize").expect("should join");
    url.query_pairs_mut()
        .append_pair("scope", "credential")
        .append_pair("credentialID", &certificate.id);
    url
}

#[must_use]
pub fn signed_content() -> Vec<u8> {
    b"%PDF-1.7 signed".to_vec()
}
