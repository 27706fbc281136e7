use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use curator_core::{CurationResult, CurationSummary, Outcome};

pub fn log_results(results: &[CurationResult]) {
    for result in results {
        let summary = result.summary();
        match summary.outcome {
            Outcome::Success => tracing::info!(
                image = %summary.image,
                copied = summary.copied,
                already_present = summary.already_present,
                "curated"
            ),
            Outcome::PartialFailure | Outcome::Failure => tracing::warn!(
                image = %summary.image,
                outcome = %summary.outcome,
                copied = summary.copied,
                failed = summary.failed,
                error = summary.error.as_deref().unwrap_or(""),
                "curation incomplete"
            ),
        }
        for blob in &result.failed_blobs {
            tracing::debug!(image = %result.image, source = %blob.source, dest = %blob.dest, "not copied");
        }
    }
    let failed = results.iter().filter(|r| !r.is_success()).count();
    tracing::info!(images = results.len(), failed, "curation finished");
}

/// Write every image that did not fully succeed, one per line.
pub fn write_failures(w: &mut impl Write, results: &[CurationResult]) -> Result<()> {
    for result in results.iter().filter(|r| !r.is_success()) {
        writeln!(w, "{}", result.image)?;
    }
    Ok(())
}

pub fn write_json_report(w: &mut impl Write, results: &[CurationResult]) -> Result<()> {
    let summaries: Vec<CurationSummary> = results.iter().map(CurationResult::summary).collect();
    serde_json::to_writer_pretty(&mut *w, &summaries)?;
    writeln!(w)?;
    Ok(())
}

pub fn write_file<F>(path: &Path, results: &[CurationResult], f: F) -> Result<()>
where
    F: FnOnce(&mut File, &[CurationResult]) -> Result<()>,
{
    let mut file = File::create(path)?;
    f(&mut file, results)
}
