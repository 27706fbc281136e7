//! Derives where every object an image depends on lives in the remote repository and where it
//! must land in the local repository.
//!
//! Artifactory lays a Docker repository out as `<repo>/<namespace>/<image>/<tag>/`, with each
//! blob stored in a file named after its digest (`sha256__<hex>`). Platform-specific manifests of
//! a multi-platform image live in a folder named after their own digest, one level below the tag
//! folder, next to the blobs they reference.
use serde::Serialize;

use crate::config::CurationConfig;
use crate::errors::Error;
use crate::filter::select_platforms;
use crate::manifests::{
    PlatformManifestEntry, ResolvedManifest, SubManifest, IMAGE_MANIFEST_FILE,
    INDEX_MANIFEST_FILE,
};
use crate::oci_digest::OciDigest;
use crate::reference::ImageReference;
use crate::store::{fetch, ArtifactStore};

/// Source and destination of one object to copy, both repository-relative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlobLocation {
    pub source: String,
    pub dest: String,
}

/// Roots of an image's tag folder in the remote and local repositories.
///
/// Both roots drop the registry host. The source root starts at the reference's project segment
/// (or the configured remote repository); the destination root swaps that segment for the local
/// repository, so V1 and V2 content map the same way.
#[derive(Clone, Debug)]
pub struct ImageCoordinates {
    reference: ImageReference,
    source_root: String,
    dest_root: String,
}

impl ImageCoordinates {
    pub fn new(reference: &ImageReference, config: &CurationConfig) -> Self {
        let source_repo = config
            .remote_repository
            .as_deref()
            .unwrap_or_else(|| reference.project());
        let tail = format!(
            "{}/{}/{}",
            reference.namespace(),
            reference.name(),
            reference.tag()
        );
        Self {
            reference: reference.clone(),
            source_root: format!("{source_repo}/{tail}"),
            dest_root: format!("{}/{tail}", config.local_repository),
        }
    }

    /// Path of `relative` under the image's tag folder in the remote repository.
    pub fn source_path(&self, relative: &str) -> String {
        format!("{}/{relative}", self.source_root)
    }

    /// Path of `relative` under the image's tag folder in the local repository.
    pub fn dest_path(&self, relative: &str) -> String {
        format!("{}/{relative}", self.dest_root)
    }

    pub fn locate(&self, relative: &str) -> BlobLocation {
        BlobLocation {
            source: self.source_path(relative),
            dest: self.dest_path(relative),
        }
    }

    /// Location of the blob named by `digest`, optionally nested under a platform folder.
    pub fn locate_blob(&self, platform: Option<&OciDigest>, digest: &OciDigest) -> BlobLocation {
        match platform {
            Some(p) => self.locate(&format!("{}/{}", p.path_component(), digest.path_component())),
            None => self.locate(&digest.path_component()),
        }
    }

    fn locate_platform_manifest(&self, platform: &OciDigest) -> BlobLocation {
        self.locate(&format!("{}/{IMAGE_MANIFEST_FILE}", platform.path_component()))
    }
}

impl std::fmt::Display for ImageCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Outcome of blob location for one image.
#[derive(Debug, Default)]
pub struct LocatedBlobs {
    /// Objects to copy, config before layers, platforms in manifest list order.
    pub locations: Vec<BlobLocation>,
    /// Platform manifests that could not be fetched or parsed. Their blobs are unknown, so each
    /// stands in for all of them.
    pub unreachable: Vec<BlobLocation>,
}

impl LocatedBlobs {
    /// True when platform manifests were selected but none of them could be retrieved, leaving
    /// no blob to copy.
    pub fn nothing_reachable(&self) -> bool {
        self.locations.is_empty() && !self.unreachable.is_empty()
    }
}

/// Emit the config location followed by one location per layer.
fn push_sub_manifest(
    coords: &ImageCoordinates,
    platform: Option<&OciDigest>,
    sub: &SubManifest,
    out: &mut Vec<BlobLocation>,
) {
    out.push(coords.locate_blob(platform, &sub.config_digest));
    out.extend(
        sub.layer_digests
            .iter()
            .map(|d| coords.locate_blob(platform, d)),
    );
}

/// Compute every [`BlobLocation`] the resolved manifest implies.
///
/// For a manifest list, only platforms whose architecture is configured are considered and each
/// selected platform's manifest is fetched from the store. A platform manifest that cannot be
/// retrieved degrades to an entry in [`LocatedBlobs::unreachable`] rather than failing the image.
pub async fn locate<S>(
    store: &S,
    coords: &ImageCoordinates,
    resolved: &ResolvedManifest,
    config: &CurationConfig,
) -> crate::errors::Result<LocatedBlobs>
where
    S: ArtifactStore + ?Sized,
{
    let mut located = LocatedBlobs::default();
    match resolved {
        ResolvedManifest::V1 { manifest, .. } => {
            let sub = SubManifest::try_from(manifest)?;
            push_sub_manifest(coords, None, &sub, &mut located.locations);
            if config.include_manifests {
                located.locations.push(coords.locate(IMAGE_MANIFEST_FILE));
            }
        }
        ResolvedManifest::V2 { .. } => {
            let selected = select_platforms(resolved.platforms(), &config.architectures);
            tracing::debug!(
                image = %coords,
                selected = selected.len(),
                "selected platform manifests"
            );
            let mut resolved_platforms = 0;
            for entry in &selected {
                match fetch_sub_manifest(store, coords, entry, config).await {
                    Ok(sub) => {
                        resolved_platforms += 1;
                        push_sub_manifest(
                            coords,
                            Some(&entry.digest),
                            &sub,
                            &mut located.locations,
                        );
                        if config.include_manifests {
                            located
                                .locations
                                .push(coords.locate_platform_manifest(&entry.digest));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(image = %coords, architecture = %entry.architecture, "{e}");
                        located
                            .unreachable
                            .push(coords.locate_platform_manifest(&entry.digest));
                    }
                }
            }
            // a manifest list is only pullable once at least one platform it names is present
            if config.include_manifests && resolved_platforms > 0 {
                located.locations.push(coords.locate(INDEX_MANIFEST_FILE));
            }
        }
    }
    Ok(located)
}

async fn fetch_sub_manifest<S>(
    store: &S,
    coords: &ImageCoordinates,
    entry: &PlatformManifestEntry,
    config: &CurationConfig,
) -> crate::errors::Result<SubManifest>
where
    S: ArtifactStore + ?Sized,
{
    let path = coords.locate_platform_manifest(&entry.digest).source;
    let failed = |reason: String| Error::SubManifestFetch {
        digest: entry.digest.to_string(),
        reason,
    };
    match fetch(store, &path, config).await {
        Ok(Some(raw)) => SubManifest::try_from(&raw).map_err(|e| failed(e.to_string())),
        Ok(None) => Err(failed(format!("{path} not found"))),
        Err(e) => Err(failed(e.to_string())),
    }
}
