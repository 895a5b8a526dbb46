// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository mirror lifecycle.
//!
//! ```text
//!   Absent ──mkdir──> PresentNoRepo ──init──> PresentWithRepo
//!                          |                        ^
//!                          | init, checkout -b,     | no-op (warn on
//!                          | remote add, .gitignore,|  origin drift)
//!                          | initial commit         |
//!                          '------------------------'
//! ```
//!
//! Initialization happens exactly once per mirror; an existing repository is
//! never reconfigured.

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{BackupError, BackupResult, RepoError};
use crate::git::backend::VcsClient;
use crate::git::query;

/// Name used when none can be derived from the remote URL.
pub const FALLBACK_NAME: &str = "backup_repository";

/// Message of the commit that adds the ignore policy.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit: Setup repository";

/// Ignore policy written into a new mirror.
pub const DEFAULT_GITIGNORE: &str = "\
.*
!.gitignore
!.github/
.DS_Store
Thumbs.db
*.swp
*.bak
*.tmp
.env
node_modules/
__pycache__/
*.pyc";

/// Directory name of the mirror, derived from the remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Derive the name from a remote URL.
    ///
    /// ```text
    /// git@host:user/repo.git      -> repo
    /// https://host/user/repo.git  -> repo
    /// <anything unusable>         -> backup_repository
    /// ```
    #[must_use]
    pub fn from_remote_url(url: &str) -> Self {
        Self::derive(url.trim()).map_or_else(
            || {
                warn!(url = %crate::git::context::redact_credentials(url), "could not derive repository name");
                Self(FALLBACK_NAME.to_string())
            },
            |name| Self(name.to_string()),
        )
    }

    fn derive(url: &str) -> Option<&str> {
        let path = if crate::auth::is_ssh_url(url) {
            url.rsplit_once(':').map(|(_, path)| path)?
        } else {
            url.rsplit_once('/').map(|(_, last)| last)?
        };
        let last = path.rsplit('/').next().unwrap_or(path);
        let name = last.strip_suffix(".git").unwrap_or(last);
        let usable = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['\\', ':', '@'])
            && !name.chars().any(char::is_whitespace);
        usable.then_some(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observed state of the mirror directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoState {
    /// Directory does not exist.
    Absent,
    /// Directory exists without version-control metadata.
    PresentNoRepo,
    /// Directory holds a repository.
    PresentWithRepo,
}

impl RepoState {
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        if !path.is_dir() {
            Self::Absent
        } else if query::is_repository(path) {
            Self::PresentWithRepo
        } else {
            Self::PresentNoRepo
        }
    }
}

/// Parameters for creating a mirror.
#[derive(Debug, Clone, Copy)]
pub struct InitOptions<'a> {
    pub branch: &'a str,
    pub remote_name: &'a str,
    /// Effective URL, possibly carrying embedded credentials.
    pub remote_url: &'a str,
}

/// Bring the mirror at `path` to `PresentWithRepo`.
///
/// Returns the state observed before any work was done.
///
/// # Errors
///
/// Returns `RepoError` if the directory cannot be created or a mandatory
/// step (init, branch, remote, ignore file) fails. A failed initial commit
/// is only logged.
pub fn ensure_repository(
    client: &dyn VcsClient,
    path: &Path,
    options: &InitOptions<'_>,
) -> BackupResult<RepoState> {
    let state = RepoState::detect(path);
    debug!(path = %path.display(), ?state, "repository state");

    match state {
        RepoState::PresentWithRepo => {
            warn_on_origin_drift(client, path, options);
            return Ok(state);
        }
        RepoState::Absent => {
            std::fs::create_dir_all(path).map_err(|source| RepoError::CreateDir {
                path: path.display().to_string(),
                source,
            })?;
            info!(path = %path.display(), "created repository directory");
        }
        RepoState::PresentNoRepo => {}
    }

    initialize(client, path, options)?;
    Ok(state)
}

fn initialize(client: &dyn VcsClient, path: &Path, options: &InitOptions<'_>) -> BackupResult<()> {
    client.init(path).map_err(|e| step_error("init", e))?;
    client
        .checkout_new_branch(path, options.branch)
        .map_err(|e| step_error("create branch", e))?;

    if client.remote_remove(path, options.remote_name).is_ok() {
        debug!(remote = options.remote_name, "removed stale remote");
    }
    client
        .remote_add(path, options.remote_name, options.remote_url)
        .map_err(|e| step_error("add remote", e))?;

    std::fs::write(path.join(".gitignore"), DEFAULT_GITIGNORE)
        .map_err(|e| step_error("write .gitignore", e.into()))?;

    let committed = client
        .add(path, ".gitignore")
        .and_then(|()| client.commit(path, INITIAL_COMMIT_MESSAGE));
    if let Err(e) = committed {
        warn!(error = %e, "initial commit failed, continuing");
    }

    info!(path = %path.display(), branch = options.branch, "initialized repository");
    Ok(())
}

fn warn_on_origin_drift(client: &dyn VcsClient, path: &Path, options: &InitOptions<'_>) {
    let key = format!("remote.{}.url", options.remote_name);
    match client.config_get(path, None, &key) {
        Ok(Some(configured)) if strip_userinfo(&configured) != strip_userinfo(options.remote_url) => {
            warn!(
                configured = %strip_userinfo(&configured),
                requested = %strip_userinfo(options.remote_url),
                "existing repository points at a different remote; leaving it unchanged"
            );
        }
        Ok(None) => warn!(remote = options.remote_name, "existing repository has no remote configured"),
        Ok(Some(_)) => {}
        Err(e) => debug!(error = %e, "could not read configured remote"),
    }
}

/// Drops `user[:secret]@` from `scheme://` URLs.
fn strip_userinfo(url: &str) -> String {
    let url = url.trim();
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://{}", &rest[at + 1..]),
        None => url.to_string(),
    }
}

fn step_error(step: &'static str, err: BackupError) -> RepoError {
    let message = match &err {
        BackupError::Git(git) => git.diagnostics(),
        other => other.to_string(),
    };
    RepoError::Step { step, message }
}
