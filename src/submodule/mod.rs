// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Linking one nested repository of the source into the mirror.
//!
//! ```text
//! submodule status <rel>
//!   tracked ──> AlreadyLinked
//!   empty   ──> clean stale state ──> <source>/<rel> is a repo?
//!                                       no  ──> NotARepository
//!                                       yes ──> origin url?
//!                                                 none ──> MissingRemoteUrl
//!                                                 url  ──> submodule add
//!                                                   "already exists in the index"
//!                                                       ──> init + update (Recovered)
//! ```
//!
//! Every failure here is reported to the caller, which logs it and carries on
//! without the submodule.


use serde::Serialize;
use std::path::{Component, Path};
use tracing::{debug, info, warn};

use crate::error::{BackupError, BackupResult, GitError, SubmoduleError};
use crate::git::backend::VcsClient;
use crate::git::query;

/// Message of the commit recording removal of stale submodule state.
pub const CLEANUP_COMMIT_MESSAGE: &str = "Clean up submodule state";

const INDEX_CONFLICT: &str = "already exists in the index";

/// How the submodule ended up linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LinkOutcome {
    /// Status already reported a tracked entry.
    AlreadyLinked,
    /// Added from the nested repository's origin.
    Linked { url: String },
    /// Path was already in the index; registration was re-initialized.
    Recovered,
}

/// Ensure `rel_path` is a linked submodule of the mirror at `repo`.
///
/// The nested repository is looked up at `<source_root>/<rel_path>`.
///
/// # Errors
///
/// Returns `SubmoduleError` if the nested directory is not a repository, has
/// no origin URL, or cannot be added.
pub fn ensure_linked(
    client: &dyn VcsClient,
    repo: &Path,
    source_root: &Path,
    rel_path: &str,
) -> BackupResult<LinkOutcome> {
    let rel_path = normalize(rel_path)?;

    let status = client.submodule_status(repo, &rel_path)?;
    if !status.trim().is_empty() {
        debug!(path = %rel_path, status = %status.trim(), "submodule already linked");
        return Ok(LinkOutcome::AlreadyLinked);
    }

    clean_stale_state(client, repo, &rel_path);

    let nested = source_root.join(&rel_path);
    if !query::is_repository(&nested) {
        return Err(SubmoduleError::NotARepository {
            path: nested.display().to_string(),
        }
        .into());
    }
    let url = query::origin_url(&nested)?.ok_or_else(|| SubmoduleError::MissingRemoteUrl {
        path: nested.display().to_string(),
    })?;

    match client.submodule_add(repo, &url, &rel_path) {
        Ok(()) => {
            info!(path = %rel_path, url = %url, "linked submodule");
            Ok(LinkOutcome::Linked { url })
        }
        Err(BackupError::Git(e)) if e.diagnostics().contains(INDEX_CONFLICT) => {
            warn!(path = %rel_path, "submodule already in index, re-initializing");
            if let Err(e) = client.submodule_init(repo) {
                warn!(error = %e, "submodule init failed");
            }
            if let Err(e) = client.submodule_update(repo) {
                warn!(error = %e, "submodule update failed");
            }
            Ok(LinkOutcome::Recovered)
        }
        Err(BackupError::Git(e)) => Err(SubmoduleError::Link {
            path: rel_path,
            message: e.diagnostics(),
        }
        .into()),
        Err(e) => Err(e),
    }
}

/// Remove registration left behind by an earlier, broken link. Best-effort.
fn clean_stale_state(client: &dyn VcsClient, repo: &Path, rel_path: &str) {
    let section = format!("submodule.{rel_path}");

    if repo.join(".gitmodules").is_file()
        && client
            .config_remove_section(repo, Some(".gitmodules"), &section)
            .is_ok()
    {
        debug!(%section, "removed section from .gitmodules");
    }
    if client.config_remove_section(repo, None, &section).is_ok() {
        debug!(%section, "removed section from repository config");
    }
    if client.rm_cached(repo, rel_path).is_ok() {
        debug!(path = %rel_path, "untracked stale submodule path");
    }

    let modules_dir = repo.join(".git").join("modules").join(rel_path);
    if modules_dir.is_dir() {
        match std::fs::remove_dir_all(&modules_dir) {
            Ok(()) => debug!(path = %modules_dir.display(), "removed submodule metadata"),
            Err(e) => warn!(path = %modules_dir.display(), error = %e, "failed to remove submodule metadata"),
        }
    }

    let committed = client
        .add(repo, ".gitmodules")
        .and_then(|()| client.commit(repo, CLEANUP_COMMIT_MESSAGE));
    if let Err(e) = committed {
        debug!(error = %e, "nothing to commit after submodule cleanup");
    }
}

/// Forward-slash relative path without `.`/`..` components.
fn normalize(rel_path: &str) -> BackupResult<String> {
    let path = Path::new(rel_path.trim());
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(GitError::InvalidPath(rel_path.to_string()).into()),
        }
    }
    if parts.is_empty() {
        return Err(GitError::InvalidPath(rel_path.to_string()).into());
    }
    Ok(parts.join("/"))
}
