// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for repo-backup.
//!
//! ```text
//! Config: GlobalConfig, BackupConfig, AuthConfig, GitConfig, PushConfig
//! ForcePolicy:        ask (default) | always | never
//! PullFailurePolicy:  push-anyway (default) | abort
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// What to do when a normal push fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcePolicy {
    /// Ask the operator interactively.
    #[default]
    Ask,
    /// Force push without asking.
    Always,
    /// Never force push; the backup fails instead.
    Never,
}

impl std::fmt::Display for ForcePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

impl std::str::FromStr for ForcePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(ConfigError::InvalidValue {
                section: "push".to_string(),
                key: "force_policy".to_string(),
                message: format!("expected 'ask', 'always', or 'never', got '{s}'"),
            }),
        }
    }
}

/// What to do when a pull fails without leaving merge conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullFailurePolicy {
    /// Log a warning and push anyway.
    #[default]
    PushAnyway,
    /// Fail the backup without pushing.
    Abort,
}

impl std::fmt::Display for PullFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PushAnyway => write!(f, "push-anyway"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file (no file log if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Write the log file as JSON lines instead of text.
    pub log_json: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
            log_json: false,
        }
    }
}

/// What to back up and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Directory to back up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Remote repository URL (`git@host:user/repo.git` or `https://...`).
    pub remote_url: String,
    /// Branch to publish to.
    pub branch: String,
    /// Relative path of a nested repository to link as a submodule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodule: Option<String>,
    /// Directory that holds the local mirror (default: home directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_root: Option<PathBuf>,
    /// Commit even when the working tree reports no changes.
    pub force: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            source: None,
            remote_url: String::new(),
            branch: "main".to_string(),
            submodule: None,
            repo_root: None,
            force: false,
        }
    }
}

/// Credentials for the remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Private ssh key for key-based auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<PathBuf>,
    /// Username for token-based auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Token or password for token-based auth.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Value for ssh's `StrictHostKeyChecking` option.
    pub host_key_checking: String,
    /// Run the ssh handshake test before backing up and fail if it fails.
    pub verify_ssh: bool,
    /// Host used by the ssh handshake test.
    pub ssh_host: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_path: None,
            username: None,
            secret: None,
            host_key_checking: "no".to_string(),
            verify_ssh: false,
            ssh_host: "github.com".to_string(),
        }
    }
}

/// Per-invocation git settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Commit author name (falls back to the user's git config).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Commit author email (falls back to the user's git config).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Name of the remote to publish to.
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            user_name: None,
            user_email: None,
            remote: "origin".to_string(),
        }
    }
}

/// Push retry and reconciliation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PushConfig {
    /// Total push attempts, including the first.
    pub max_attempts: u32,
    /// Fixed wait between failed attempts.
    pub backoff_secs: u64,
    /// Force-push decision after the first failure.
    pub force_policy: ForcePolicy,
    /// Behavior after a pull that fails without conflicts.
    pub on_pull_failure: PullFailurePolicy,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: 2,
            force_policy: ForcePolicy::Ask,
            on_pull_failure: PullFailurePolicy::PushAnyway,
        }
    }
}
