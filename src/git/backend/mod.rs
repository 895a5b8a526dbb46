// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Version-control client abstraction.
//!
//! ```text
//! VcsClient (trait, &self)  <-- backup engine, test doubles
//!      |
//!      v
//! ShellBackend { GitContext } --> git -c k=v <args>
//! ```
//!
//! The engine only sees `VcsClient`, so the publish pipeline and submodule
//! handling can be exercised without a network or a git binary.

use crate::error::{BackupResult, GitError, ProcessError};
use std::path::Path;
use std::process::Command;
use tracing::{debug, trace};

use super::context::{GitContext, redact_credentials};

/// Operations the backup engine needs from a version-control system.
///
/// Every method takes the working directory of the repository it acts on.
/// Failures carry the captured diagnostics in [`GitError::CommandFailed`].
pub trait VcsClient: Send + Sync {
    /// Create a repository in `repo`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if initialization fails.
    fn init(&self, repo: &Path) -> BackupResult<()>;

    /// Create and switch to `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn checkout_new_branch(&self, repo: &Path, branch: &str) -> BackupResult<()>;

    /// Remove a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote does not exist.
    fn remote_remove(&self, repo: &Path, name: &str) -> BackupResult<()>;

    /// Add a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote already exists.
    fn remote_add(&self, repo: &Path, name: &str, url: &str) -> BackupResult<()>;

    /// Stage a single pathspec.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn add(&self, repo: &Path, pathspec: &str) -> BackupResult<()>;

    /// Stage every change, including deletions.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn add_all(&self, repo: &Path) -> BackupResult<()>;

    /// Commit staged changes.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails, including when there is
    /// nothing to commit.
    fn commit(&self, repo: &Path, message: &str) -> BackupResult<()>;

    /// Working-tree status in porcelain v1 format.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status query fails.
    fn status_porcelain(&self, repo: &Path) -> BackupResult<String>;

    /// Fetch from a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the fetch fails.
    fn fetch(&self, repo: &Path, remote: &str) -> BackupResult<()>;

    /// Resolve a revision to a commit id, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be run.
    fn rev_parse(&self, repo: &Path, rev: &str) -> BackupResult<Option<String>>;

    /// Merge `remote/branch` into the current branch without rebasing.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the pull fails or leaves conflicts.
    fn pull_no_rebase(&self, repo: &Path, remote: &str, branch: &str) -> BackupResult<()>;

    /// Push `branch` to `remote`, optionally forced.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the push is rejected or the remote is unreachable.
    fn push(&self, repo: &Path, remote: &str, branch: &str, force: bool) -> BackupResult<()>;

    /// `git submodule status` for one path; empty if not a submodule.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be run.
    fn submodule_status(&self, repo: &Path, path: &str) -> BackupResult<String>;

    /// Add a submodule at `path` cloned from `url`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the submodule cannot be added.
    fn submodule_add(&self, repo: &Path, url: &str, path: &str) -> BackupResult<()>;

    /// `git submodule init`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` on failure.
    fn submodule_init(&self, repo: &Path) -> BackupResult<()>;

    /// `git submodule update`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` on failure.
    fn submodule_update(&self, repo: &Path) -> BackupResult<()>;

    /// Run a git command inside every checked-out submodule.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the command fails in any submodule.
    fn submodule_foreach(&self, repo: &Path, args: &[&str]) -> BackupResult<()>;

    /// Read a config value from the repository config, or from `file` if given.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be run.
    fn config_get(&self, repo: &Path, file: Option<&str>, key: &str)
    -> BackupResult<Option<String>>;

    /// Remove a config section from the repository config, or from `file`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the section does not exist.
    fn config_remove_section(
        &self,
        repo: &Path,
        file: Option<&str>,
        section: &str,
    ) -> BackupResult<()>;

    /// Untrack `path` without touching the working tree.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `path` is not in the index.
    fn rm_cached(&self, repo: &Path, path: &str) -> BackupResult<()>;

    /// Reset index and working tree to `rev`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reset fails.
    fn reset_hard(&self, repo: &Path, rev: &str) -> BackupResult<()>;
}

// --- ShellBackend Implementation (Git CLI) ---

/// `VcsClient` backed by the git command-line tool.
#[derive(Debug, Clone, Default)]
pub struct ShellBackend {
    context: GitContext,
}

impl ShellBackend {
    #[must_use]
    pub const fn new(context: GitContext) -> Self {
        Self { context }
    }

    #[must_use]
    pub const fn context(&self) -> &GitContext {
        &self.context
    }

    /// Checks that a `git` executable is on PATH.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` if git cannot be found.
    pub fn ensure_available() -> BackupResult<()> {
        which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
            name: "git".to_string(),
        })?;
        Ok(())
    }

    /// Runs git and returns trimmed stdout. Sets `GCM_INTERACTIVE=never` and
    /// `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(&self, args: &[&str], cwd: &Path) -> BackupResult<String> {
        let command_line = redact_credentials(&format!("git {}", args.join(" ")));
        debug!(cwd = %cwd.display(), cmd = %command_line, "exec");

        let output = Command::new("git")
            .args(self.context.config_args())
            .args(args)
            .current_dir(cwd)
            .envs(self.context.env().iter().map(|(k, v)| (k, v)))
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| ProcessError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        trace!(cmd = %command_line, status = ?output.status.code(), "finished");

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: command_line,
                stderr: redact_credentials(&stderr),
                stdout: redact_credentials(&stdout),
            }
            .into());
        }
        Ok(stdout)
    }

    /// Like [`Self::git_command`], but a non-zero exit yields `None`.
    fn git_query(&self, args: &[&str], cwd: &Path) -> BackupResult<Option<String>> {
        match self.git_command(args, cwd) {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(crate::error::BackupError::Git(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl VcsClient for ShellBackend {
    fn init(&self, repo: &Path) -> BackupResult<()> {
        self.git_command(&["init", "--quiet"], repo)?;
        Ok(())
    }

    fn checkout_new_branch(&self, repo: &Path, branch: &str) -> BackupResult<()> {
        self.git_command(&["checkout", "-q", "-b", branch], repo)?;
        Ok(())
    }

    fn remote_remove(&self, repo: &Path, name: &str) -> BackupResult<()> {
        self.git_command(&["remote", "remove", name], repo)?;
        Ok(())
    }

    fn remote_add(&self, repo: &Path, name: &str, url: &str) -> BackupResult<()> {
        self.git_command(&["remote", "add", name, url], repo)?;
        Ok(())
    }

    fn add(&self, repo: &Path, pathspec: &str) -> BackupResult<()> {
        self.git_command(&["add", "--", pathspec], repo)?;
        Ok(())
    }

    fn add_all(&self, repo: &Path) -> BackupResult<()> {
        self.git_command(&["add", "-A"], repo)?;
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> BackupResult<()> {
        self.git_command(&["commit", "-m", message], repo)?;
        Ok(())
    }

    fn status_porcelain(&self, repo: &Path) -> BackupResult<String> {
        self.git_command(&["-c", "core.quotePath=false", "status", "--porcelain"], repo)
    }

    fn fetch(&self, repo: &Path, remote: &str) -> BackupResult<()> {
        self.git_command(&["fetch", "--quiet", remote], repo)?;
        Ok(())
    }

    fn rev_parse(&self, repo: &Path, rev: &str) -> BackupResult<Option<String>> {
        self.git_query(&["rev-parse", "--verify", "--quiet", rev], repo)
    }

    fn pull_no_rebase(&self, repo: &Path, remote: &str, branch: &str) -> BackupResult<()> {
        self.git_command(&["pull", "--no-rebase", "--quiet", remote, branch], repo)?;
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, branch: &str, force: bool) -> BackupResult<()> {
        let mut args = vec!["push", "--quiet"];
        if force {
            args.push("--force");
        }
        args.extend([remote, branch]);
        self.git_command(&args, repo)?;
        Ok(())
    }

    fn submodule_status(&self, repo: &Path, path: &str) -> BackupResult<String> {
        Ok(self
            .git_query(&["submodule", "status", "--", path], repo)?
            .unwrap_or_default())
    }

    fn submodule_add(&self, repo: &Path, url: &str, path: &str) -> BackupResult<()> {
        self.git_command(&["submodule", "add", "--quiet", url, path], repo)?;
        Ok(())
    }

    fn submodule_init(&self, repo: &Path) -> BackupResult<()> {
        self.git_command(&["submodule", "init"], repo)?;
        Ok(())
    }

    fn submodule_update(&self, repo: &Path) -> BackupResult<()> {
        self.git_command(&["submodule", "update"], repo)?;
        Ok(())
    }

    fn submodule_foreach(&self, repo: &Path, args: &[&str]) -> BackupResult<()> {
        let mut full = vec!["submodule", "--quiet", "foreach", "git"];
        full.extend_from_slice(args);
        self.git_command(&full, repo)?;
        Ok(())
    }

    fn config_get(
        &self,
        repo: &Path,
        file: Option<&str>,
        key: &str,
    ) -> BackupResult<Option<String>> {
        let mut args = vec!["config"];
        if let Some(file) = file {
            args.extend(["--file", file]);
        }
        args.extend(["--get", key]);
        Ok(self
            .git_query(&args, repo)?
            .filter(|value| !value.is_empty()))
    }

    fn config_remove_section(
        &self,
        repo: &Path,
        file: Option<&str>,
        section: &str,
    ) -> BackupResult<()> {
        let mut args = vec!["config"];
        if let Some(file) = file {
            args.extend(["--file", file]);
        }
        args.extend(["--remove-section", section]);
        self.git_command(&args, repo)?;
        Ok(())
    }

    fn rm_cached(&self, repo: &Path, path: &str) -> BackupResult<()> {
        self.git_command(&["rm", "--cached", "-f", "-q", "--", path], repo)?;
        Ok(())
    }

    fn reset_hard(&self, repo: &Path, rev: &str) -> BackupResult<()> {
        self.git_command(&["reset", "--hard", "-q", rev], repo)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
