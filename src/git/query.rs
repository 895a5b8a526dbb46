// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only repository queries using gix.
//!
//! ```text
//! query.rs --> gix::open --> <path>/.git (no subprocess)
//! ```
//!
//! `gix::open` is used instead of discovery: a directory nested inside
//! another repository only counts when it has its own metadata.

use crate::error::{BackupResult, GitError, GixError};
use std::path::Path;

fn open(path: &Path) -> BackupResult<gix::Repository> {
    let repo = gix::open(path).map_err(|e| GitError::Gix(GixError::Open(Box::new(e))))?;
    Ok(repo)
}

/// True if `path` itself holds a git repository.
#[must_use]
pub fn is_repository(path: &Path) -> bool {
    gix::open(path).is_ok()
}

/// URL of the `origin` remote, `None` if unset or empty.
///
/// # Errors
///
/// Returns a `GitError` if `path` is not a repository.
pub fn origin_url(path: &Path) -> BackupResult<Option<String>> {
    let repo = open(path)?;
    let url = repo
        .config_snapshot()
        .string("remote.origin.url")
        .map(|value| value.to_string())
        .filter(|value| !value.trim().is_empty());
    Ok(url)
}

/// Current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if the repository cannot be opened or HEAD cannot be read.
pub fn current_branch(path: &Path) -> BackupResult<Option<String>> {
    let repo = open(path)?;
    let head = repo
        .head_name()
        .map_err(|e| GitError::Gix(GixError::Head(e.to_string())))?;
    Ok(head.map(|name| name.shorten().to_string()))
}
