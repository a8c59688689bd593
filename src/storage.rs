use crate::errors::StoreError;
use crate::models::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bytes of a stored document together with the revision that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub bytes: Vec<u8>,
    pub version: String,
}

/// A versioned, path-addressed blob store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Writes `bytes` if the current revision matches `expected_version`
    /// (`None` meaning "must not exist"), otherwise fails with
    /// `VersionConflict`.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Fails with `NotFound` when nothing is stored at `path`.
    async fn delete(&self, path: &str, version: &str) -> Result<(), StoreError>;
}

pub fn progress_path(uid: &UserId) -> String {
    format!("progress/{uid}.json")
}

/// Store access with the optimistic-concurrency protocol layered on top.
#[derive(Clone)]
pub struct DocumentClient {
    backend: Arc<dyn DocumentStore>,
}

impl DocumentClient {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        let doc = self.backend.get(path).await?;
        debug!(path, found = doc.is_some(), "fetched document");
        Ok(doc)
    }

    /// Writes `bytes` against `expected_version`. A version conflict triggers
    /// exactly one re-fetch and one resubmission with the freshest revision;
    /// whatever that second attempt returns is final.
    ///
    /// The resubmission carries this caller's payload, so a concurrent
    /// writer's changes are overwritten (last writer wins).
    pub async fn put_with_retry(
        &self,
        path: &str,
        bytes: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), StoreError> {
        match self.backend.put(path, bytes, expected_version).await {
            Err(StoreError::VersionConflict(_)) => {
                warn!(path, "version conflict, retrying once with latest revision");
                let latest = self.backend.get(path).await?.map(|doc| doc.version);
                self.backend.put(path, bytes, latest.as_deref()).await
            }
            other => other,
        }
    }

    /// Deleting something that is already gone succeeds.
    pub async fn delete(&self, path: &str, version: &str) -> Result<(), StoreError> {
        match self.backend.delete(path, version).await {
            Err(StoreError::NotFound(_)) => {
                debug!(path, "delete of absent document ignored");
                Ok(())
            }
            other => other,
        }
    }
}
