use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Error, Result};

/// Number of `/`-delimited segments that must precede the tag: host, project, repository and
/// image name.
const MIN_SEGMENTS: usize = 4;

/// Leading path segments that address the registry rather than the image itself.
const REGISTRY_SEGMENTS: usize = 3;

/// A parsed image reference of the form `host/project/repo/image:tag`.
///
/// The registry path holds the first three segments. Anything after the third segment is the image
/// name, which may itself contain `/`. Formatting an `ImageReference` with [`std::fmt::Display`]
/// reproduces the string it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    registry_path: Vec<String>,
    name: String,
    tag: String,
}

impl ImageReference {
    /// Registry host, eg `registry.example.com`.
    pub fn host(&self) -> &str {
        &self.registry_path[0]
    }

    /// The repository segment the remote artifact store serves this image from.
    pub fn project(&self) -> &str {
        &self.registry_path[1]
    }

    /// The namespace segment between the project and the image name.
    pub fn namespace(&self) -> &str {
        &self.registry_path[2]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl std::str::FromStr for ImageReference {
    type Err = Error;

    /// Split on the last `:` for the tag and on `/` for path segments. The tag must match the
    /// OCI distribution tag grammar `[a-zA-Z0-9_][a-zA-Z0-9._-]{0,127}`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        static TAG_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9._-]{0,127}$").unwrap());

        let malformed = || Error::MalformedReference(s.to_string());

        let (path, tag) = s.rsplit_once(':').ok_or_else(malformed)?;
        if !TAG_RE.is_match(tag) {
            return Err(malformed());
        }

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < MIN_SEGMENTS || segments.iter().any(|seg| seg.is_empty()) {
            return Err(malformed());
        }

        let registry_path = segments[..REGISTRY_SEGMENTS]
            .iter()
            .map(|seg| seg.to_string())
            .collect();
        let name = segments[REGISTRY_SEGMENTS..].join("/");

        Ok(Self {
            registry_path,
            name,
            tag: tag.to_string(),
        })
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}/{}:{}",
            self.registry_path.join("/"),
            self.name,
            self.tag
        )
    }
}
