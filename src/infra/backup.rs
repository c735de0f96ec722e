use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::BACKUP_EXTENSION;
use crate::error::Result;

/// `schools.geojson` -> `schools.geojson.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(BACKUP_EXTENSION)
}

/// Copy `path` to its backup location unless a backup already exists.
///
/// Returns the backup path when one was created.
pub fn ensure_backup(path: &Path) -> Result<Option<PathBuf>> {
    let backup = backup_path(path);
    if backup.exists() {
        return Ok(None);
    }
    fs::copy(path, &backup)?;
    info!("Created backup of original file at {}", backup.display());
    Ok(Some(backup))
}
