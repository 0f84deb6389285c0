use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Copy `path` verbatim into `backups_dir` as `<basename>.<UTC stamp>`.
///
/// Returns `None` without error when `path` does not exist yet. Stamps have
/// second precision; two snapshots of the same file within one second are
/// last-write-wins at the filesystem-name level.
pub fn snapshot(backups_dir: &Path, path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    fs::create_dir_all(backups_dir)
        .with_context(|| format!("Failed to create backup directory {:?}", backups_dir))?;

    let basename = path
        .file_name()
        .with_context(|| format!("Backup source {:?} has no filename", path))?
        .to_string_lossy()
        .into_owned();
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let dest = backups_dir.join(format!("{basename}.{stamp}"));

    fs::copy(path, &dest)
        .with_context(|| format!("Failed to snapshot {:?} to {:?}", path, dest))?;

    tracing::debug!(source = ?path, dest = ?dest, "took backup snapshot");
    Ok(Some(dest))
}

/// Delete snapshots strictly older than the retention window.
///
/// A file whose age equals the window exactly is kept. Returns the number
/// of files removed.
pub fn purge(backups_dir: &Path, retention_days: u32) -> Result<usize> {
    if !backups_dir.exists() {
        return Ok(0);
    }

    let window = Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY);
    let now = SystemTime::now();
    let mut removed = 0;

    let entries = fs::read_dir(backups_dir)
        .with_context(|| format!("Failed to read backup directory {:?}", backups_dir))?;

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let modified = entry
            .metadata()
            .with_context(|| format!("Failed to stat backup {:?}", entry.path()))?
            .modified()?;
        let age = now.duration_since(modified).unwrap_or_default();

        if expired(age, window) {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove backup {:?}", entry.path()))?;
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::debug!(removed, retention_days, "purged expired backups");
    }
    Ok(removed)
}

/// Strict comparison: a snapshot exactly at the boundary is retained.
fn expired(age: Duration, window: Duration) -> bool {
    age > window
}
