//! Drives images through the curation pipeline.
//!
//! Each image moves through [`Stage::Parsed`], [`Stage::Resolved`], [`Stage::Located`] (platform
//! filtering included, for manifest lists) and [`Stage::Copied`] before it is [`Stage::Reported`].
//! Stages run strictly in sequence for one image; distinct images run as independent tasks that
//! share nothing but the store.
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::CurationConfig;
use crate::copy::copy_blobs;
use crate::locator::{locate, ImageCoordinates};
use crate::manifests::resolve;
use crate::reference::ImageReference;
use crate::result::{CurationResult, Stage};
use crate::store::ArtifactStore;

/// Curate every image in `images`, returning one result per image in input order.
///
/// Failures of individual images or blobs are captured in the results; nothing here aborts the
/// batch. At most `max_concurrent_images` pipelines run at once.
pub async fn curate<S>(
    images: Vec<String>,
    store: Arc<S>,
    config: &CurationConfig,
) -> Vec<CurationResult>
where
    S: ArtifactStore,
{
    let config = Arc::new(config.clone());
    let permits = Arc::new(Semaphore::new(config.max_concurrent_images.max(1)));

    let set = &mut JoinSet::new();
    for (i, image) in images.iter().cloned().enumerate() {
        let store = store.clone();
        let config = config.clone();
        let permits = permits.clone();
        let span = tracing::info_span!("curate", image = %image);
        set.spawn(
            async move {
                let _permit = permits.acquire_owned().await;
                let result = curate_image(store.as_ref(), &image, &config).await;
                (i, result)
            }
            .instrument(span),
        );
    }

    let mut results: Vec<Option<CurationResult>> = vec![None; images.len()];
    while let Some(res) = set.join_next().await {
        match res {
            Ok((i, result)) => results[i] = Some(result),
            Err(e) => {
                if e.is_panic() {
                    tracing::error!("curation task panicked: {e}");
                } else {
                    tracing::error!("curation task failed to complete: {e}");
                }
            }
        }
    }

    images
        .iter()
        .zip(results)
        .map(|(image, result)| {
            result.unwrap_or_else(|| {
                CurationResult::halted(image, Stage::Reported, "curation task did not complete")
            })
        })
        .collect()
}

/// Run the full pipeline for a single image reference.
pub async fn curate_image<S>(store: &S, image: &str, config: &CurationConfig) -> CurationResult
where
    S: ArtifactStore + ?Sized,
{
    let reference: ImageReference = match image.parse() {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("{e}");
            return CurationResult::halted(image, Stage::Parsed, e);
        }
    };
    let coords = ImageCoordinates::new(&reference, config);

    let resolved = match resolve(store, &coords, config).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("{e}");
            return CurationResult::halted(image, Stage::Resolved, e);
        }
    };
    let schema = resolved.schema();
    tracing::info!(
        %schema,
        registry = reference.host(),
        bytes = resolved.raw().len(),
        "resolved manifest"
    );

    let located = match locate(store, &coords, &resolved, config).await {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!("{e}");
            let mut result = CurationResult::halted(image, Stage::Located, e);
            result.schema = Some(schema);
            return result;
        }
    };
    if located.nothing_reachable() {
        tracing::warn!("no platform manifest could be retrieved");
        let mut result =
            CurationResult::halted(image, Stage::Located, "no platform manifest could be retrieved");
        result.schema = Some(schema);
        result.failed_blobs = located.unreachable;
        return result;
    }
    tracing::debug!(
        blobs = located.locations.len(),
        unreachable = located.unreachable.len(),
        "located blobs"
    );

    let mut report = copy_blobs(store, located.locations, config).await;
    report.failed.extend(located.unreachable);

    let result = CurationResult::from_copies(image, schema, report);
    tracing::info!(
        outcome = %result.outcome,
        copied = result.copied_blobs.len(),
        failed = result.failed_blobs.len(),
        already_present = result.already_present,
        "curated"
    );
    result
}
