// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI arguments for the `backup` and `check-ssh` commands.
//!
//! ```text
//! repo-backup backup --source ~/notes --remote git@github.com:me/notes.git
//! repo-backup backup --username me --secret $TOKEN --force-push never
//! repo-backup check-ssh --key ~/.ssh/id_ed25519 --host github.com
//! ```
//!
//! Every flag maps onto a config key and wins over config files and env.

use clap::Args;
use std::path::PathBuf;

use crate::config::types::ForcePolicy;

/// Arguments for the `backup` command.
#[derive(Debug, Clone, Default, Args)]
pub struct BackupArgs {
    /// Directory to back up.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Remote repository URL.
    #[arg(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Branch to publish to.
    #[arg(short = 'b', long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Private ssh key for key-based authentication.
    #[arg(short = 'k', long, value_name = "FILE", conflicts_with_all = ["username", "secret"])]
    pub key: Option<PathBuf>,

    /// Username for token-based authentication.
    #[arg(short = 'u', long, value_name = "USER", requires = "secret")]
    pub username: Option<String>,

    /// Token or password for token-based authentication.
    #[arg(long, value_name = "SECRET", requires = "username")]
    pub secret: Option<String>,

    /// Relative path of a nested repository to link as a submodule.
    #[arg(long, value_name = "REL")]
    pub submodule: Option<String>,

    /// Directory that holds the local mirror.
    #[arg(long = "repo-root", value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Commit and push even if nothing changed.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// What to do when a normal push fails (ask, always, never).
    #[arg(long = "force-push", value_name = "POLICY")]
    pub force_push: Option<ForcePolicy>,

    /// Test the ssh key before backing up and stop if it is rejected.
    #[arg(long = "verify-ssh")]
    pub verify_ssh: bool,

    /// Print the report as JSON instead of a summary line.
    #[arg(long)]
    pub json: bool,
}

impl BackupArgs {
    /// Converts the flags to configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();

        if let Some(ref source) = self.source {
            overrides.push(format!("backup/source={}", source.display()));
        }
        if let Some(ref remote) = self.remote {
            overrides.push(format!("backup/remote_url={remote}"));
        }
        if let Some(ref branch) = self.branch {
            overrides.push(format!("backup/branch={branch}"));
        }
        if let Some(ref submodule) = self.submodule {
            overrides.push(format!("backup/submodule={submodule}"));
        }
        if let Some(ref root) = self.repo_root {
            overrides.push(format!("backup/repo_root={}", root.display()));
        }
        if self.force {
            overrides.push("backup/force=true".to_string());
        }
        if let Some(ref key) = self.key {
            overrides.push(format!("auth/key_path={}", key.display()));
        }
        if let Some(ref username) = self.username {
            overrides.push(format!("auth/username={username}"));
        }
        if let Some(ref secret) = self.secret {
            overrides.push(format!("auth/secret={secret}"));
        }
        if self.verify_ssh {
            overrides.push("auth/verify_ssh=true".to_string());
        }
        if let Some(policy) = self.force_push {
            overrides.push(format!("push/force_policy={policy}"));
        }

        overrides
    }
}

/// Arguments for the `check-ssh` command.
#[derive(Debug, Clone, Default, Args)]
pub struct CheckSshArgs {
    /// Private key to test (default: auth.key_path, then ~/.ssh/id_*).
    #[arg(short = 'k', long, value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// Host to authenticate against (default: auth.ssh_host).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}
