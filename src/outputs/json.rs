//! JSON output for extraction results.
//!
//! Article records and error records serialize untagged, so the written
//! document is either the record's fields or `{"error": "..."}`.

use crate::models::ExtractionOutcome;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Pretty-printed JSON for an outcome.
pub fn to_json(outcome: &ExtractionOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

/// Write an outcome to `path`, creating parent directories as needed.
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation, serialization or
/// file writing fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_outcome(outcome: &ExtractionOutcome, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = to_json(outcome)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON result");
    Ok(())
}
