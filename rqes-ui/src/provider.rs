//! # Provider
//!
//! Re-exports the boundary traits implemented by the host application, along
//! with [`FsDocumentStore`], a document store backed by a local directory.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
pub use rqes_core::provider::{
    AuthorizedCredential, AuthorizedService, CertificateData, DocumentStore, ServiceHandle,
    SignedDocument, SignedDocuments, SigningService,
};
use url::Url;

/// Saves documents as files in a single directory.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    dir: PathBuf,
}

impl FsDocumentStore {
    /// Store documents in `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentStore for FsDocumentStore {
    async fn save(&self, name: &str, content: &[u8]) -> anyhow::Result<Url> {
        // only the final component is used, so a name cannot escape `dir`
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| anyhow!("invalid document name: {name}"))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("issue creating {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("issue writing {}", path.display()))?;

        let path = tokio::fs::canonicalize(&path).await?;
        Url::from_file_path(&path).map_err(|()| anyhow!("invalid document path: {}", path.display()))
    }
}
