use crate::config::CurationConfig;
use crate::errors::{Error, Result};
use crate::locator::BlobLocation;
use crate::store::{timed, ArtifactStore, CopyStatus};

/// Per-image tally of copy attempts.
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Locations now present at their destination, including those that already were.
    pub copied: Vec<BlobLocation>,
    pub failed: Vec<BlobLocation>,
    /// How many of `copied` the store reported as already present.
    pub already_present: usize,
}

/// Copy one blob, mapping every failure to [`Error::BlobCopy`].
///
/// An "already exists" answer from the store is a success: re-curating an image must not turn
/// previously copied blobs into failures.
pub async fn copy_blob<S>(
    store: &S,
    location: &BlobLocation,
    config: &CurationConfig,
) -> Result<CopyStatus>
where
    S: ArtifactStore + ?Sized,
{
    timed(
        config.request_timeout(),
        store.copy(&location.source, &location.dest),
    )
    .await
    .map_err(|e| Error::BlobCopy {
        source_path: location.source.clone(),
        reason: e.to_string(),
    })
}

/// Attempt every location independently. A failed copy never stops the remaining ones and nothing
/// already copied is rolled back.
pub async fn copy_blobs<S>(
    store: &S,
    locations: Vec<BlobLocation>,
    config: &CurationConfig,
) -> CopyReport
where
    S: ArtifactStore + ?Sized,
{
    let mut report = CopyReport::default();
    for location in locations {
        match copy_blob(store, &location, config).await {
            Ok(CopyStatus::Copied) => {
                tracing::debug!(source = %location.source, dest = %location.dest, "copied");
                report.copied.push(location);
            }
            Ok(CopyStatus::AlreadyExists) => {
                tracing::debug!(dest = %location.dest, "already present");
                report.already_present += 1;
                report.copied.push(location);
            }
            Err(e) => {
                tracing::warn!(dest = %location.dest, "{e}");
                report.failed.push(location);
            }
        }
    }
    report
}
