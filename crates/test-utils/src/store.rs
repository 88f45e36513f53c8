//! An in-memory [`DocumentStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use rqes_core::provider::DocumentStore;
use url::Url;

#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save fail until reset.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Content saved at `uri`.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.documents.lock().expect("should lock").get(uri).cloned()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, name: &str, content: &[u8]) -> Result<Url> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("storage unavailable"));
        }
        let uri = Url::parse(&format!("memory:///{name}"))?;
        self.documents.lock().expect("should lock").insert(uri.to_string(), content.to_vec());
        Ok(uri)
    }
}
