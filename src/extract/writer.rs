//! Per-subject export artifacts.
//!
//! An artifact is a transient UTF-8 text file, one `"{title}: {url}"` line
//! per record, named `{batch_id}_{subject_label}.txt`. It is written in
//! append mode, delivered once, then deleted.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::domain::ContentRecord;

/// Filename for one `(batch, subject)` artifact.
pub fn artifact_name(batch_id: &str, subject_label: &str) -> String {
    format!("{batch_id}_{subject_label}.txt")
}

/// Append records to the artifact for `(batch_id, subject_label)` under
/// `dir`, returning its path for delivery.
pub fn write_artifact(
    dir: &Path,
    batch_id: &str,
    subject_label: &str,
    records: &[ContentRecord],
) -> Result<PathBuf> {
    let path = dir.join(artifact_name(batch_id, subject_label));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open artifact file: {}", path.display()))?;

    for record in records {
        writeln!(file, "{}: {}", record.title, record.url)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
    }

    info!(path = %path.display(), records = records.len(), "artifact written");
    Ok(path)
}

/// Best-effort cleanup after delivery. Deletion failure is logged, never
/// surfaced to the user.
pub fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "artifact deleted"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete artifact"),
    }
}
