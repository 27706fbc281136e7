mod config;
pub use config::CurationConfig;

pub mod errors;
pub use errors::{Error, Result};

mod oci_digest;
pub use oci_digest::OciDigest;

mod reference;
pub use reference::ImageReference;

pub mod store;
pub use store::{ArtifactStore, CopyStatus};

mod manifests;
pub use manifests::{
    resolve, PlatformManifestEntry, ResolvedManifest, SchemaVersion, SubManifest,
    IMAGE_MANIFEST_FILE, INDEX_MANIFEST_FILE,
};

mod filter;
pub use filter::select_platforms;

mod locator;
pub use locator::{locate, BlobLocation, ImageCoordinates, LocatedBlobs};

mod copy;
pub use copy::{copy_blob, copy_blobs, CopyReport};

mod result;
pub use result::{CurationResult, CurationSummary, Outcome, Stage};

mod curator;
pub use curator::{curate, curate_image};

#[cfg(test)]
mod testing;
