//! Moving processed source documents out of the input folder.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{InvexError, Result};
use crate::output::file_safe;

/// File name of an archived document: `<original stem>_<identifier>_<timestamp>.<ext>`.
pub fn archived_file_name(source: &Path, identifier: &str, timestamp: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let extension = source
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "pdf".to_string());

    format!("{}_{}_{}.{}", stem, file_safe(identifier), timestamp, extension)
}

/// Move `source` into `archive_dir` under its archived name.
///
/// Falls back to copy and delete when a rename is not possible (different file system).
pub fn archive_document(
    source: &Path,
    archive_dir: &Path,
    identifier: &str,
    timestamp: &str,
) -> Result<PathBuf> {
    let persistence = |path: &Path, e: std::io::Error| InvexError::Persistence {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    fs::create_dir_all(archive_dir).map_err(|e| persistence(archive_dir, e))?;
    let target = archive_dir.join(archived_file_name(source, identifier, timestamp));

    if let Err(e) = fs::rename(source, &target) {
        debug!("Rename failed ({}), copying {} instead", e, source.display());
        fs::copy(source, &target).map_err(|e| persistence(&target, e))?;
        fs::remove_file(source).map_err(|e| persistence(source, e))?;
    }

    info!("Archived {} as {}", source.display(), target.display());
    Ok(target)
}
