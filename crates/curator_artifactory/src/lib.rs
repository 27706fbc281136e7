//! [`curator_core::ArtifactStore`] backed by the Artifactory REST API.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};

use curator_core::{ArtifactStore, CopyStatus};

mod config;
pub use config::ArtifactoryConfig;

mod errors;
pub use errors::{Error, Result};

/// Longest response body echoed back in an [`Error::UnexpectedStatus`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for one Artifactory instance.
///
/// Content is read with plain `GET {url}/{path}`; copies are server-side through
/// `POST {url}/api/copy/{source}?to=/{dest}`. Every request carries basic auth.
#[derive(Clone)]
pub struct Artifactory {
    client: reqwest::Client,
    base: String,
    username: String,
    api_key: String,
    dry_run: bool,
}

impl Artifactory {
    pub(crate) fn new(config: &ArtifactoryConfig, dry_run: bool) -> Result<Self> {
        let base = config.url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base).map_err(|e| Error::InvalidUrl(base.clone(), e.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base,
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            dry_run,
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.api_key))
    }

    async fn get_content(&self, path: &str) -> Result<Option<Bytes>> {
        let url = format!("{}/{path}", self.base);
        tracing::debug!(url = %url, "GET");
        let resp = self.request(Method::GET, &url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.bytes().await?)),
            _ => Err(unexpected(Method::GET, url, resp).await),
        }
    }

    async fn post_copy(&self, source: &str, dest: &str) -> Result<CopyStatus> {
        let url = format!("{}/api/copy/{source}", self.base);
        let to = format!("/{dest}");
        if self.dry_run {
            tracing::info!(url = %url, to = %to, "dry run, skipping copy");
            return Ok(CopyStatus::Copied);
        }
        tracing::debug!(url = %url, to = %to, "POST");
        let resp = self
            .request(Method::POST, &url)
            .query(&[("to", to.as_str())])
            .send()
            .await?;
        match resp.status() {
            StatusCode::CONFLICT => Ok(CopyStatus::AlreadyExists),
            s if s.is_success() => Ok(CopyStatus::Copied),
            _ => Err(unexpected(Method::POST, url, resp).await),
        }
    }
}

async fn unexpected(method: Method, url: String, resp: reqwest::Response) -> Error {
    let status = resp.status();
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    Error::UnexpectedStatus {
        method,
        url,
        status,
        body,
    }
}

#[async_trait]
impl ArtifactStore for Artifactory {
    async fn fetch(&self, path: &str) -> curator_core::Result<Option<Bytes>> {
        Ok(self.get_content(path).await?)
    }

    async fn copy(&self, source: &str, dest: &str) -> curator_core::Result<CopyStatus> {
        Ok(self.post_copy(source, dest).await?)
    }
}
