// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One-way file synchronization from the source tree into the mirror.
//!
//! ```text
//! source files ──┐
//!                ├─ absent / newer mtime / size differs ──> copy   (updated)
//! mirror files ──┤
//!                └─ not in source, not metadata ─────────> delete (deleted)
//!                                 copy/delete error ─────> record (failed)
//! then: prune empty mirror directories, deepest first
//! ```
//!
//! A symbolic link in the source is copied as the file it points to; links
//! to directories and dangling links are recorded as failed.
//!
//! Change detection compares modification time and size only; a same-size
//! edit with an unchanged or older timestamp is not noticed.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{BackupResult, SyncError};
use crate::utility::fs::copy::{FileStamp, copy_preserving_mtime, remove_empty_dirs};
use crate::utility::fs::walk::{WalkResult, parallel_walk};

/// What happened to a path during one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Updated,
    Deleted,
    Failed,
}

/// Per-category totals of a [`SyncStatusMap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.updated + self.deleted + self.failed
    }
}

/// Relative path (`/`-separated) to the status it reached in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncStatusMap(BTreeMap<String, SyncStatus>);

impl SyncStatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<String>, status: SyncStatus) {
        self.0.insert(path.into(), status);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<SyncStatus> {
        self.0.get(path).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SyncStatus)> {
        self.0.iter().map(|(path, status)| (path.as_str(), *status))
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.0
            .values()
            .fold(StatusCounts::default(), |mut counts, status| {
                match status {
                    SyncStatus::Updated => counts.updated += 1,
                    SyncStatus::Deleted => counts.deleted += 1,
                    SyncStatus::Failed => counts.failed += 1,
                }
                counts
            })
    }
}

/// True for paths owned by the version-control system rather than the user:
/// anything inside a `.git` entry, and top-level `.git*` entries such as
/// `.gitignore` or `.gitmodules`.
#[must_use]
pub fn is_metadata(rel: &Path) -> bool {
    let mut components = rel.components();
    let first_is_git = components
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|name| name.starts_with(".git"));
    first_is_git || rel.components().any(|c| c.as_os_str() == ".git")
}

/// Make `destination` hold exactly the files of `source`.
///
/// Individual copy or delete failures are recorded as [`SyncStatus::Failed`]
/// and do not stop the pass.
///
/// # Errors
///
/// Returns `SyncError::Traversal` if either tree cannot be walked completely.
pub fn sync(source: &Path, destination: &Path) -> BackupResult<SyncStatusMap> {
    let mut status = SyncStatusMap::new();

    std::fs::create_dir_all(destination).map_err(|e| traversal(destination, e))?;
    let source_files = collect_source_files(source, list_files(source)?, &mut status);
    let destination_listing = list_files(destination)?;
    let destination_files: BTreeSet<PathBuf> = destination_listing
        .files()
        .iter()
        .chain(destination_listing.links())
        .filter(|rel| !is_metadata(rel))
        .cloned()
        .collect();
    debug!(
        source = source_files.len(),
        destination = destination_files.len(),
        "enumerated files"
    );

    for rel in &source_files {
        let key = path_key(rel);
        let src = source.join(rel);
        let dst = destination.join(rel);

        let Some(src_stamp) = FileStamp::of(&src) else {
            warn!(path = %key, "source file disappeared during sync");
            status.record(key, SyncStatus::Failed);
            continue;
        };
        let changed = FileStamp::of(&dst).is_none_or(|dst_stamp| src_stamp.is_newer_than(&dst_stamp));
        if !changed {
            continue;
        }

        match copy_preserving_mtime(&src, &dst) {
            Ok(_) => {
                info!(path = %key, "updated");
                status.record(key, SyncStatus::Updated);
            }
            Err(e) => {
                warn!(path = %key, error = %e, "failed to copy");
                status.record(key, SyncStatus::Failed);
            }
        }
    }

    let source_set: BTreeSet<&PathBuf> = source_files.iter().collect();
    for rel in destination_files.iter().filter(|rel| !source_set.contains(rel)) {
        let key = path_key(rel);
        match std::fs::remove_file(destination.join(rel)) {
            Ok(()) => {
                info!(path = %key, "deleted");
                status.record(key, SyncStatus::Deleted);
            }
            Err(e) => {
                warn!(path = %key, error = %e, "failed to delete");
                status.record(key, SyncStatus::Failed);
            }
        }
    }

    match remove_empty_dirs(destination, &is_metadata) {
        Ok(removed) => {
            for dir in removed {
                info!(path = %dir.display(), "removed empty directory");
            }
        }
        Err(e) => warn!(error = %e, "failed to prune empty directories"),
    }

    let counts = status.counts();
    info!(
        updated = counts.updated,
        deleted = counts.deleted,
        failed = counts.failed,
        "sync complete"
    );
    Ok(status)
}

/// Regular files plus links that resolve to a regular file; the copy reads
/// through the link. Other links are recorded as failed.
fn collect_source_files(source: &Path, walk: WalkResult, status: &mut SyncStatusMap) -> Vec<PathBuf> {
    let mut files = walk.files().to_vec();
    for rel in walk.links() {
        let key = path_key(rel);
        match std::fs::metadata(source.join(rel)) {
            Ok(meta) if meta.is_file() => files.push(rel.clone()),
            Ok(_) => {
                warn!(path = %key, "skipping symbolic link that is not a file");
                status.record(key, SyncStatus::Failed);
            }
            Err(e) => {
                warn!(path = %key, error = %e, "skipping dangling symbolic link");
                status.record(key, SyncStatus::Failed);
            }
        }
    }
    files.sort();
    files
}

fn list_files(root: &Path) -> BackupResult<WalkResult> {
    let walk = parallel_walk(root, &[".git"]).map_err(|e| SyncError::Traversal {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;
    if walk.error_count() > 0 {
        return Err(SyncError::Traversal {
            path: root.display().to_string(),
            message: format!("{} entries could not be read", walk.error_count()),
        }
        .into());
    }
    Ok(walk)
}

fn path_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn traversal(path: &Path, err: std::io::Error) -> SyncError {
    SyncError::Traversal {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
