use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use curator_artifactory::ArtifactoryConfig;
use curator_core::CurationConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub store: StoreBackend,
    #[serde(default)]
    pub curation: CurationConfig,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StoreBackend {
    Artifactory(ArtifactoryConfig),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreBackend::Artifactory(ArtifactoryConfig::default()),
            curation: CurationConfig::default(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Load from a YAML file, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Self::default()),
        };
        let mut f = File::open(path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Replace store connection settings with any supplied on the command line or environment.
    pub fn with_store_overrides(
        mut self,
        url: Option<String>,
        username: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        match &mut self.store {
            StoreBackend::Artifactory(cfg) => {
                if let Some(url) = url {
                    cfg.url = url;
                }
                if let Some(username) = username {
                    cfg.username = username;
                }
                if let Some(api_key) = api_key {
                    cfg.api_key = api_key;
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CONFIG: &str = r#"
store:
  type: Artifactory
  url: https://artifactory.example.com/artifactory
  username: curator
  api_key: secret
curation:
  local_repository: trusted-docker
  remote_repository: demo-docker-cache
  architectures: [amd64, arm64]
dry_run: true
"#;

    #[test]
    fn parse_full_config() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        let StoreBackend::Artifactory(store) = &config.store;
        assert_eq!(store.url, "https://artifactory.example.com/artifactory");
        assert_eq!(store.connect_timeout_secs, 10);
        assert_eq!(config.curation.local_repository, "trusted-docker");
        assert_eq!(
            config.curation.remote_repository.as_deref(),
            Some("demo-docker-cache")
        );
        assert_eq!(config.curation.architectures, vec!["amd64", "arm64"]);
        assert_eq!(config.curation.max_concurrent_images, 4);
        assert!(config.dry_run);
    }

    #[test]
    fn store_section_only() {
        let config: Config = serde_yaml::from_str("store:\n  type: Artifactory\n").unwrap();
        assert_eq!(config.curation.local_repository, "demo-docker-local");
        assert!(!config.dry_run);
    }

    #[test]
    fn unknown_store_type_rejected() {
        assert!(serde_yaml::from_str::<Config>("store:\n  type: Nexus\n").is_err());
    }

    #[test]
    fn overrides_replace_only_given_settings() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        let config = config.with_store_overrides(
            Some(String::from("https://other.example.com")),
            None,
            Some(String::from("rotated")),
        );
        let StoreBackend::Artifactory(store) = &config.store;
        assert_eq!(store.url, "https://other.example.com");
        assert_eq!(store.username, "curator");
        assert_eq!(store.api_key, "rotated");
    }
}
