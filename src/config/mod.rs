// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for repo-backup.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. repo-backup.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. REPO_BACKUP_* env vars
//! 5. CLI flags and --set overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REPO_BACKUP_BACKUP__BRANCH=notes     → backup.branch = "notes"
//! REPO_BACKUP_AUTH__KEY_PATH=~/.ssh/k  → auth.key_path = "~/.ssh/k"
//! REPO_BACKUP_PUSH__MAX_ATTEMPTS=5     → push.max_attempts = 5
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{BackupResult, ConfigError, Result};

use loader::ConfigLoader;
use types::{AuthConfig, BackupConfig, GitConfig, GlobalConfig, PushConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Source, remote, and branch.
    pub backup: BackupConfig,
    /// Credentials.
    pub auth: AuthConfig,
    /// Per-invocation git settings.
    pub git: GitConfig,
    /// Push retry policy.
    pub push: PushConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repo_backup::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("repo-backup.toml")
    ///     .with_env_prefix("REPO_BACKUP")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check that everything a backup run needs is present and consistent.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the source is missing or not a directory,
    /// the remote URL is empty, both credential kinds are set, token
    /// credentials are incomplete, or `push.max_attempts` is zero.
    pub fn validate_for_backup(&self) -> BackupResult<()> {
        let source = self
            .backup
            .source
            .as_deref()
            .ok_or_else(|| missing("backup", "source"))?;
        if !source.is_dir() {
            return Err(ConfigError::InvalidSource {
                path: source.display().to_string(),
                reason: "not a directory".to_string(),
            }
            .into());
        }

        if self.backup.remote_url.trim().is_empty() {
            return Err(missing("backup", "remote_url").into());
        }

        if self.backup.branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "backup".to_string(),
                key: "branch".to_string(),
                message: "branch name must not be empty".to_string(),
            }
            .into());
        }

        let has_token = self.auth.username.is_some() || self.auth.secret.is_some();
        if self.auth.key_path.is_some() && has_token {
            return Err(ConfigError::ConflictingCredentials.into());
        }
        if has_token {
            if self.auth.username.is_none() {
                return Err(missing("auth", "username").into());
            }
            if self.auth.secret.is_none() {
                return Err(missing("auth", "secret").into());
            }
        }

        if self.push.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                section: "push".to_string(),
                key: "max_attempts".to_string(),
                message: "at least one push attempt is required".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Secrets are shown as `[hidden]`. Output is sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_backup_options(&mut options);
        self.format_auth_options(&mut options);
        self.format_git_options(&mut options);
        self.format_push_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file".into(), fmt_path(&self.global.log_file));
        options.insert("global.log_json".into(), self.global.log_json.to_string());
    }

    fn format_backup_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("backup.source".into(), fmt_path(&self.backup.source));
        options.insert(
            "backup.remote_url".into(),
            self.backup.remote_url.clone(),
        );
        options.insert("backup.branch".into(), self.backup.branch.clone());
        options.insert(
            "backup.submodule".into(),
            self.backup.submodule.clone().unwrap_or_default(),
        );
        options.insert("backup.repo_root".into(), fmt_path(&self.backup.repo_root));
        options.insert("backup.force".into(), self.backup.force.to_string());
    }

    fn format_auth_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("auth.key_path".into(), fmt_path(&self.auth.key_path));
        options.insert(
            "auth.username".into(),
            self.auth.username.clone().unwrap_or_default(),
        );
        if self.auth.secret.is_some() {
            options.insert("auth.secret".into(), "[hidden]".into());
        }
        options.insert(
            "auth.host_key_checking".into(),
            self.auth.host_key_checking.clone(),
        );
        options.insert(
            "auth.verify_ssh".into(),
            self.auth.verify_ssh.to_string(),
        );
        options.insert("auth.ssh_host".into(), self.auth.ssh_host.clone());
    }

    fn format_git_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "git.user_name".into(),
            self.git.user_name.clone().unwrap_or_default(),
        );
        options.insert(
            "git.user_email".into(),
            self.git.user_email.clone().unwrap_or_default(),
        );
        options.insert("git.remote".into(), self.git.remote.clone());
    }

    fn format_push_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "push.max_attempts".into(),
            self.push.max_attempts.to_string(),
        );
        options.insert(
            "push.backoff_secs".into(),
            self.push.backoff_secs.to_string(),
        );
        options.insert(
            "push.force_policy".into(),
            self.push.force_policy.to_string(),
        );
        options.insert(
            "push.on_pull_failure".into(),
            self.push.on_pull_failure.to_string(),
        );
    }
}

fn missing(section: &str, key: &str) -> ConfigError {
    ConfigError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(String::new, |p| p.display().to_string())
}
