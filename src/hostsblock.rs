use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::error::Error;
use crate::hosts::HostTable;
use crate::settings::Settings;
use crate::store::Store;

pub const BEGIN_MARKER: &str = "# BEGIN roster managed hosts";
pub const END_MARKER: &str = "# END roster managed hosts";

/// Render the managed hosts block.
///
/// Categories are emitted in declared order, hosts in table order, one
/// `address<TAB>name alias...` line per host. The address falls back to the
/// host name itself, so every host in a table is renderable; categories
/// absent from `tables` (no table file on disk) are skipped - warning the
/// user about those is the caller's job.
pub fn render(settings: &Settings, tables: &BTreeMap<String, HostTable>) -> String {
    let mut out = String::new();
    out.push_str(BEGIN_MARKER);
    out.push('\n');

    for category in &settings.categories {
        let Some(table) = tables.get(&category.name) else {
            continue;
        };

        if category.emoji.is_empty() {
            out.push_str(&format!("# {}\n", category.name));
        } else {
            out.push_str(&format!("# {} {}\n", category.emoji, category.name));
        }

        for host in &table.hosts {
            out.push_str(host.effective_address());
            out.push('\t');
            out.push_str(&host.name);
            for alias in &host.aliases {
                out.push(' ');
                out.push_str(alias);
            }
            out.push('\n');
        }
    }

    out.push_str(END_MARKER);
    out.push('\n');
    out
}

/// Replace the managed block inside `target`, leaving all other content
/// byte-identical and appending the fresh block at the end.
///
/// Idempotent: a second apply with the same block produces byte-identical
/// output. The pre-existing content is snapshotted before the rewrite, and
/// an unwritable target fails with [`Error::PermissionDenied`] before any
/// write is attempted.
pub fn apply(store: &Store, settings: &Settings, target: &Path, block: &str) -> Result<()> {
    let current = if target.exists() {
        ensure_writable(target)?;
        fs::read_to_string(target)
            .with_context(|| format!("Failed to read target file {:?}", target))?
    } else {
        String::new()
    };

    let (mut next, _previous) = excise(&current);
    if !next.is_empty() && !next.ends_with('\n') {
        next.push('\n');
    }
    next.push_str(block);

    let snapshotted = backup::snapshot(&store.backups_dir(), target)?;
    replace_file(target, &next)?;
    if snapshotted.is_some() {
        backup::purge(&store.backups_dir(), settings.backup_retention_days)?;
    }
    Ok(())
}

/// Split `content` into (everything outside the managed block, the block
/// itself). A begin marker with no end marker after it is not a well-formed
/// pair and is treated as "no existing block".
fn excise(content: &str) -> (String, Option<String>) {
    let Some(begin) = content.find(BEGIN_MARKER) else {
        return (content.to_string(), None);
    };
    let after_begin = begin + BEGIN_MARKER.len();
    let Some(end_offset) = content[after_begin..].find(END_MARKER) else {
        return (content.to_string(), None);
    };

    let mut end = after_begin + end_offset + END_MARKER.len();
    if content[end..].starts_with('\n') {
        end += 1;
    }

    let mut remainder = String::with_capacity(content.len() - (end - begin));
    remainder.push_str(&content[..begin]);
    remainder.push_str(&content[end..]);
    (remainder, Some(content[begin..end].to_string()))
}

/// Probe write access without modifying the file.
fn ensure_writable(path: &Path) -> Result<()> {
    match OpenOptions::new().write(true).open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            Err(Error::PermissionDenied(path.to_path_buf()).into())
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to open target file {:?}", path))
        }
    }
}

/// Full-file replace through a sibling temp file so a reader never observes
/// a half-written target.
fn replace_file(target: &Path, contents: &str) -> Result<()> {
    let tmp = sibling_tmp(target)?;

    if let Err(err) = fs::write(&tmp, contents) {
        if err.kind() == io::ErrorKind::PermissionDenied {
            return Err(Error::PermissionDenied(target.to_path_buf()).into());
        }
        return Err(err).with_context(|| format!("Failed to write {:?}", tmp));
    }

    if let Err(err) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        if err.kind() == io::ErrorKind::PermissionDenied {
            return Err(Error::PermissionDenied(target.to_path_buf()).into());
        }
        return Err(err).with_context(|| format!("Failed to replace {:?}", target));
    }
    Ok(())
}

fn sibling_tmp(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .with_context(|| format!("Target path {:?} has no filename", target))?
        .to_string_lossy();
    Ok(target.with_file_name(format!("{name}.roster-tmp")))
}
