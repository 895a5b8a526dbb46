// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recovery from a conflicted pull.
//!
//! Conflicted files that still have content are copied to `<path>.backup`,
//! then the working tree is hard-reset to `HEAD`. The incoming remote
//! changes are discarded. If any copy fails the reset is skipped and the
//! merge is left for the user to resolve.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{BackupResult, PublishError};
use crate::git::backend::VcsClient;
use crate::git::porcelain::StatusEntry;

/// Suffix appended to preserved conflict files.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Preserve conflicted files and reset the working tree.
///
/// Returns the `.backup` copies that were written.
///
/// # Errors
///
/// Returns `PublishError::Preserve` without resetting if a copy fails, or a
/// `GitError` if the hard reset fails.
pub fn handle_conflicts(
    client: &dyn VcsClient,
    repo: &Path,
    conflicts: &[StatusEntry],
) -> BackupResult<Vec<PathBuf>> {
    let mut preserved = Vec::new();
    for entry in conflicts.iter().filter(|entry| entry.is_preservable()) {
        let path = repo.join(&entry.path);
        let mut backup = path.clone().into_os_string();
        backup.push(BACKUP_SUFFIX);
        let backup = PathBuf::from(backup);

        if let Err(e) = std::fs::copy(&path, &backup) {
            error!(path = %entry.path, error = %e, "failed to preserve conflicted file, not resetting");
            return Err(PublishError::Preserve {
                path: entry.path.clone(),
                message: e.to_string(),
            }
            .into());
        }
        info!(path = %entry.path, code = %entry.code, "preserved conflicted file");
        preserved.push(backup);
    }

    client.reset_hard(repo, "HEAD")?;
    info!("reset working tree to pre-conflict state");
    Ok(preserved)
}
