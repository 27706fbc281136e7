use serde::Deserialize;

use super::errors::{Error, Result};
use super::Artifactory;

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Connection settings for an Artifactory instance.
///
/// `url` is the instance base, including any context path, eg
/// `https://artifactory.example.com/artifactory`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ArtifactoryConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ArtifactoryConfig {
    /// Validate the settings and build a client. With `dry_run` set, copy requests are logged
    /// rather than sent.
    pub fn new_store(&self, dry_run: bool) -> Result<Artifactory> {
        if self.url.is_empty() {
            return Err(Error::MissingSetting("url"));
        }
        if self.username.is_empty() {
            return Err(Error::MissingSetting("username"));
        }
        if self.api_key.is_empty() {
            return Err(Error::MissingSetting("api_key"));
        }
        Artifactory::new(self, dry_run)
    }
}
