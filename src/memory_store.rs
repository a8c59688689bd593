use crate::errors::StoreError;
use crate::storage::{DocumentStore, StoredDocument};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    generation: u64,
    documents: HashMap<String, StoredDocument>,
}

/// Process-local versioned store with the same conflict rules as the remote
/// one. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn revision(generation: u64, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(generation.to_be_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.documents.get(path).cloned())
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let current = inner.documents.get(path).map(|doc| doc.version.as_str());
        if current != expected_version {
            return Err(StoreError::VersionConflict(path.to_string()));
        }

        inner.generation += 1;
        let version = revision(inner.generation, bytes);
        inner.documents.insert(
            path.to_string(),
            StoredDocument {
                bytes: bytes.to_vec(),
                version,
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str, version: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let current = inner.documents.get(path).map(|doc| doc.version.clone());
        match current {
            None => Err(StoreError::NotFound(path.to_string())),
            Some(current) if current != version => {
                Err(StoreError::VersionConflict(path.to_string()))
            }
            Some(_) => {
                inner.documents.remove(path);
                Ok(())
            }
        }
    }
}
