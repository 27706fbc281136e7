//! # Artifact Store Abstraction
//!
//! Defines the interoperability layer between the curation pipeline and the artifact store that
//! hosts both the remote (untrusted) and local (trusted) repositories.
//!
//! Paths passed to an [`ArtifactStore`] are repository-relative: the first segment names the
//! repository, the rest address a file or folder within it, eg
//! `demo-docker/library/nginx/1.25/manifest.json`.
//!
//! ## Known Implementations
//!
//! ### curator_artifactory
//!
//! Speaks the Artifactory REST API: plain `GET` for file content and `POST /api/copy` for
//! server-side copies between repositories.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::CurationConfig;
use crate::errors::{Error, Result};

/// Result of a successful server-side copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyStatus {
    /// The store created the object at the destination path.
    Copied,
    /// The store reported that the destination already exists.
    AlreadyExists,
}

/// Provides a common interface for the artifact store operations curation depends on.
///
/// Implementations are shared across concurrently running image pipelines and must arbitrate
/// concurrent writes to the same destination themselves, typically by reporting
/// [`CopyStatus::AlreadyExists`].
#[async_trait]
pub trait ArtifactStore: Send + Sync + 'static {
    /// Fetch the content at `path`. Returns `Ok(None)` when the store definitively reports that
    /// nothing exists there.
    async fn fetch(&self, path: &str) -> Result<Option<Bytes>>;

    /// Copy the object at `source` to `dest` without routing its content through the caller.
    async fn copy(&self, source: &str, dest: &str) -> Result<CopyStatus>;
}

/// Bound a single store call by `timeout`.
pub(crate) async fn timed<T, F>(timeout: Duration, f: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(r) => r,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}

/// Fetch `path` under the configured request timeout, retrying transient failures up to
/// `fetch_retries` times.
pub(crate) async fn fetch<S>(store: &S, path: &str, config: &CurationConfig) -> Result<Option<Bytes>>
where
    S: ArtifactStore + ?Sized,
{
    let mut attempt = 0;
    loop {
        match timed(config.request_timeout(), store.fetch(path)).await {
            Err(e) if e.is_transient() && attempt < config.fetch_retries => {
                attempt += 1;
                tracing::warn!(path, attempt, "retrying fetch after error: {e}");
                tokio::time::sleep(config.retry_backoff()).await;
            }
            r => return r,
        }
    }
}
