use bytes::Bytes;
use oci_spec::image::{ImageIndex, ImageManifest};
use serde::Serialize;

use crate::config::CurationConfig;
use crate::errors::{Error, Result};
use crate::locator::ImageCoordinates;
use crate::oci_digest::OciDigest;
use crate::store::{fetch, ArtifactStore};

/// File name under a tag folder holding a multi-platform manifest list.
pub const INDEX_MANIFEST_FILE: &str = "list.manifest.json";

/// File name under a tag or platform folder holding a single-platform image manifest.
pub const IMAGE_MANIFEST_FILE: &str = "manifest.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SchemaVersion {
    /// Single-platform image manifest.
    V1,
    /// Architecture-indexed manifest list.
    V2,
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

/// The manifest that describes an image, tagged by the schema it was found under.
///
/// Holds both the parsed document and the raw bytes as served by the store.
#[derive(Debug)]
pub enum ResolvedManifest {
    V1 { manifest: ImageManifest, raw: Bytes },
    V2 { index: ImageIndex, raw: Bytes },
}

impl ResolvedManifest {
    pub fn schema(&self) -> SchemaVersion {
        match self {
            ResolvedManifest::V1 { .. } => SchemaVersion::V1,
            ResolvedManifest::V2 { .. } => SchemaVersion::V2,
        }
    }

    pub fn raw(&self) -> &Bytes {
        match self {
            ResolvedManifest::V1 { raw, .. } => raw,
            ResolvedManifest::V2 { raw, .. } => raw,
        }
    }

    /// Platform entries of a manifest list, in document order. Always empty for a single
    /// manifest.
    ///
    /// Entries that carry no platform or an unparseable digest cannot be curated and are skipped.
    pub fn platforms(&self) -> Vec<PlatformManifestEntry> {
        let index = match self {
            ResolvedManifest::V1 { .. } => return Vec::new(),
            ResolvedManifest::V2 { index, .. } => index,
        };
        index
            .manifests()
            .iter()
            .filter_map(|d| {
                let platform = match d.platform() {
                    Some(p) => p,
                    None => {
                        tracing::debug!(digest = %d.digest(), "manifest list entry has no platform");
                        return None;
                    }
                };
                match OciDigest::try_from(d.digest()) {
                    Ok(digest) => Some(PlatformManifestEntry {
                        digest,
                        architecture: platform.architecture().to_string(),
                    }),
                    Err(e) => {
                        tracing::warn!("skipping manifest list entry: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

/// One platform-specific manifest referenced by a manifest list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformManifestEntry {
    pub digest: OciDigest,
    pub architecture: String,
}

/// The digests a single-platform manifest references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubManifest {
    pub config_digest: OciDigest,
    pub layer_digests: Vec<OciDigest>,
}

impl TryFrom<&ImageManifest> for SubManifest {
    type Error = Error;

    fn try_from(m: &ImageManifest) -> Result<Self> {
        let config_digest = OciDigest::try_from(m.config().digest())?;
        let layer_digests = m
            .layers()
            .iter()
            .map(|l| OciDigest::try_from(l.digest()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            config_digest,
            layer_digests,
        })
    }
}

impl TryFrom<&Bytes> for SubManifest {
    type Error = Error;

    fn try_from(bs: &Bytes) -> Result<Self> {
        let manifest: ImageManifest = serde_json::from_slice(bs)?;
        SubManifest::try_from(&manifest)
    }
}

/// Determine which schema describes the image at `coords`.
///
/// The store exposes no schema field, so the manifest list is tried first and the single manifest
/// second. Any failure of the first fetch, including a body that does not parse, falls through to
/// the second.
pub async fn resolve<S>(
    store: &S,
    coords: &ImageCoordinates,
    config: &CurationConfig,
) -> Result<ResolvedManifest>
where
    S: ArtifactStore + ?Sized,
{
    let index_path = coords.source_path(INDEX_MANIFEST_FILE);
    match fetch(store, &index_path, config).await {
        Ok(Some(raw)) => match serde_json::from_slice::<ImageIndex>(&raw) {
            Ok(index) => {
                tracing::debug!(path = %index_path, "resolved manifest list");
                return Ok(ResolvedManifest::V2 { index, raw });
            }
            Err(e) => {
                tracing::warn!(path = %index_path, "unable to deserialize manifest list: {e:?}");
            }
        },
        Ok(None) => tracing::debug!(path = %index_path, "no manifest list"),
        Err(e) => tracing::warn!(path = %index_path, "manifest list fetch failed: {e}"),
    }

    let manifest_path = coords.source_path(IMAGE_MANIFEST_FILE);
    match fetch(store, &manifest_path, config).await {
        Ok(Some(raw)) => match serde_json::from_slice::<ImageManifest>(&raw) {
            Ok(manifest) => {
                tracing::debug!(path = %manifest_path, "resolved single manifest");
                Ok(ResolvedManifest::V1 { manifest, raw })
            }
            Err(e) => {
                tracing::warn!(path = %manifest_path, "unable to deserialize manifest: {e:?}");
                Err(Error::ManifestNotFound(coords.to_string()))
            }
        },
        Ok(None) => Err(Error::ManifestNotFound(coords.to_string())),
        Err(e) => {
            tracing::warn!(path = %manifest_path, "manifest fetch failed: {e}");
            Err(Error::ManifestNotFound(coords.to_string()))
        }
    }
}
