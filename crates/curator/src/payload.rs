use anyhow::{bail, Result};
use serde::Deserialize;

/// Job payload naming the images to curate.
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default, alias = "packages")]
    images: Vec<String>,
}

/// Merge images given as flags with those named by a JSON payload, flags first.
pub fn image_list(flags: Vec<String>, payload: Option<&str>) -> Result<Vec<String>> {
    let mut images = flags;
    if let Some(raw) = payload {
        let payload: Payload = serde_json::from_str(raw)?;
        images.extend(payload.images);
    }
    images.retain(|i| !i.trim().is_empty());
    if images.is_empty() {
        bail!("no images to curate");
    }
    Ok(images)
}
