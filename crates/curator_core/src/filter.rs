use std::collections::HashSet;

use crate::manifests::PlatformManifestEntry;

/// Keep the entries whose architecture is one of `architectures`, preserving order.
///
/// Multi-platform images routinely carry platforms nobody asked for; those are dropped without
/// complaint.
pub fn select_platforms(
    entries: Vec<PlatformManifestEntry>,
    architectures: &[String],
) -> Vec<PlatformManifestEntry> {
    let wanted: HashSet<&str> = architectures.iter().map(String::as_str).collect();
    entries
        .into_iter()
        .filter(|e| {
            let keep = wanted.contains(e.architecture.as_str());
            if !keep {
                tracing::trace!(architecture = %e.architecture, digest = %e.digest, "skipping platform");
            }
            keep
        })
        .collect()
}
