use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed image reference: {0}")]
    MalformedReference(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(String),

    #[error("no manifest found for {0}")]
    ManifestNotFound(String),

    #[error("failed to fetch sub-manifest {digest}: {reason}")]
    SubManifestFetch { digest: String, reason: String },

    #[error("failed to copy {source_path}: {reason}")]
    BlobCopy { source_path: String, reason: String },

    #[error("manifest deserialization error: {0}")]
    ManifestDeserialize(#[from] serde_json::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The backend could not be reached or failed on its side.
    #[error("backend error: {0}")]
    BackendError(Box<dyn std::error::Error + Send + Sync>),
    /// The backend refused the request, eg bad credentials or missing permissions.
    #[error("backend rejected request: {0}")]
    BackendRejected(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Transport-level failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::BackendError(_))
    }
}
