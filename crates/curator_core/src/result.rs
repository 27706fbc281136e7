use serde::Serialize;

use crate::copy::CopyReport;
use crate::locator::BlobLocation;
use crate::manifests::SchemaVersion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    PartialFailure,
    Failure,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::PartialFailure => write!(f, "partial failure"),
            Outcome::Failure => write!(f, "failure"),
        }
    }
}

/// Pipeline stages an image passes through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Parsed,
    Resolved,
    Located,
    Copied,
    Reported,
}

/// Terminal record of one image's curation.
#[derive(Clone, Debug, Serialize)]
pub struct CurationResult {
    /// The reference exactly as supplied by the caller.
    pub image: String,
    pub outcome: Outcome,
    pub schema: Option<SchemaVersion>,
    pub copied_blobs: Vec<BlobLocation>,
    pub failed_blobs: Vec<BlobLocation>,
    pub already_present: usize,
    /// The stage the pipeline could not reach, for images that stopped early.
    pub halted_before: Option<Stage>,
    pub error: Option<String>,
}

impl CurationResult {
    /// Result for an image whose pipeline stopped before copying anything.
    pub fn halted(image: &str, stage: Stage, error: impl std::fmt::Display) -> Self {
        Self {
            image: image.to_string(),
            outcome: Outcome::Failure,
            schema: None,
            copied_blobs: Vec::new(),
            failed_blobs: Vec::new(),
            already_present: 0,
            halted_before: Some(stage),
            error: Some(error.to_string()),
        }
    }

    /// Result for an image that made it to the copy stage. When every copy failed the image is
    /// considered halted before [`Stage::Copied`].
    pub fn from_copies(image: &str, schema: SchemaVersion, report: CopyReport) -> Self {
        let outcome = classify(report.copied.len(), report.failed.len());
        let (halted_before, error) = match outcome {
            Outcome::Failure => (
                Some(Stage::Copied),
                Some(format!("none of {} blobs could be copied", report.failed.len())),
            ),
            _ => (None, None),
        };
        Self {
            image: image.to_string(),
            outcome,
            schema: Some(schema),
            copied_blobs: report.copied,
            failed_blobs: report.failed,
            already_present: report.already_present,
            halted_before,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn summary(&self) -> CurationSummary {
        CurationSummary {
            image: self.image.clone(),
            outcome: self.outcome,
            copied: self.copied_blobs.len(),
            failed: self.failed_blobs.len(),
            already_present: self.already_present,
            error: self.error.clone(),
        }
    }
}

/// Compact, serializable view of a [`CurationResult`] for reporting sinks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurationSummary {
    pub image: String,
    pub outcome: Outcome,
    pub copied: usize,
    pub failed: usize,
    pub already_present: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything copied is a success, including nothing to copy; nothing copied despite trying is
/// a failure.
fn classify(copied: usize, failed: usize) -> Outcome {
    match (copied, failed) {
        (_, 0) => Outcome::Success,
        (0, _) => Outcome::Failure,
        _ => Outcome::PartialFailure,
    }
}
