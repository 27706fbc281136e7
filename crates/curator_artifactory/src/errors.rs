use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("http client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("invalid artifactory url {0}: {1}")]
    InvalidUrl(String, String),

    #[error("missing artifactory setting: {0}")]
    MissingSetting(&'static str),

    #[error("{method} {url} returned {status}: {body}")]
    UnexpectedStatus {
        method: http::Method,
        url: String,
        status: http::StatusCode,
        body: String,
    },
}

impl Error {
    /// Connection failures and server-side errors may clear up; everything else is the request
    /// itself being refused.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::ReqwestError(_) => true,
            Error::UnexpectedStatus { status, .. } => status.is_server_error(),
            Error::InvalidUrl(..) | Error::MissingSetting(_) => false,
        }
    }
}

impl From<Error> for curator_core::errors::Error {
    fn from(e: Error) -> Self {
        if e.is_transient() {
            curator_core::errors::Error::BackendError(Box::new(e))
        } else {
            curator_core::errors::Error::BackendRejected(Box::new(e))
        }
    }
}
