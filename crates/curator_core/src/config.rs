use std::time::Duration;

use serde::Deserialize;

/// Curation settings threaded through every image pipeline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Trusted repository that receives curated blobs.
    pub local_repository: String,

    /// Repository to read from in place of the project segment of each image reference, eg an
    /// Artifactory remote repository's `-cache` backing repository.
    pub remote_repository: Option<String>,

    /// Platform architectures to curate from multi-platform images.
    pub architectures: Vec<String>,

    /// Also copy the manifest documents so the curated image can be pulled from the local
    /// repository.
    pub include_manifests: bool,

    pub max_concurrent_images: usize,

    pub request_timeout_secs: u64,

    /// Extra attempts for a manifest fetch that failed in transit. A "not found" response is
    /// never retried.
    pub fetch_retries: u32,

    pub retry_backoff_ms: u64,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            local_repository: String::from("demo-docker-local"),
            remote_repository: None,
            architectures: vec![String::from("amd64")],
            include_manifests: false,
            max_concurrent_images: 4,
            request_timeout_secs: 30,
            fetch_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

impl CurationConfig {
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[inline]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
