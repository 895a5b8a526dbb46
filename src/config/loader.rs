// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered configuration loading.
//!
//! ```text
//!   repo-backup.toml (optional, cwd)
//!   --config FILE ...            later files win
//!   REPO_BACKUP_<SECTION>__<KEY>
//!   section/key=value overrides  always win
//!        |
//!        v
//!   build() --> Config
//! ```
//!
//! Every source is recorded so `repo-backup options` can show where the
//! effective values came from.

use std::fmt;
use std::path::{Path, PathBuf};

use super::Config;
use crate::error::Result;

/// File read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "repo-backup.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "REPO_BACKUP";

/// One layer that contributed to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    OptionalFile(PathBuf),
    Inline,
    Environment(String),
    /// Key only; override values may carry credentials.
    Override(String),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "[file] {}", path.display()),
            Self::OptionalFile(path) => write!(f, "[optional] {}", path.display()),
            Self::Inline => f.write_str("[string] <inline>"),
            Self::Environment(prefix) => write!(f, "[env] {prefix}_*"),
            Self::Override(key) => write!(f, "[set] {key}"),
        }
    }
}

pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            sources: Vec::new(),
        }
    }

    /// The stack the binary uses: the default file if present, each of
    /// `files` in order, then `REPO_BACKUP_*` variables.
    #[must_use]
    pub fn for_command_line<P: AsRef<Path>>(files: &[P]) -> Self {
        files
            .iter()
            .fold(
                Self::new().add_toml_file_optional(DEFAULT_CONFIG_FILE),
                |loader, file| loader.add_toml_file(file),
            )
            .with_env_prefix(ENV_PREFIX)
    }

    fn add_file(mut self, path: &Path, required: bool) -> Self {
        use config::{File, FileFormat};
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        if required {
            self.sources.push(ConfigSource::File(path.to_path_buf()));
        } else if path.is_file() {
            self.sources
                .push(ConfigSource::OptionalFile(path.to_path_buf()));
        }
        self
    }

    /// Adds a TOML file; `build` fails if it is missing.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), true)
    }

    /// Adds a TOML file that is skipped when absent.
    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), false)
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        use config::{File, FileFormat};
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.sources.push(ConfigSource::Inline);
        self
    }

    /// Reads `PREFIX_SECTION__KEY` variables, e.g. `REPO_BACKUP_PUSH__MAX_ATTEMPTS`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.sources
            .push(ConfigSource::Environment(prefix.to_string()));
        self
    }

    /// Overrides a dotted key such as `backup.branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed as a config path.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("invalid override '{key}': {e}"))?;
        self.sources.push(ConfigSource::Override(key.to_string()));
        Ok(self)
    }

    /// Applies one `section/key=value` (or `section.key=value`) string.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no `=` or the key is invalid.
    pub fn set_from_str(self, option: &str) -> Result<Self> {
        let Some((key, value)) = option.split_once('=') else {
            anyhow::bail!("invalid option '{option}', expected KEY=VALUE");
        };
        let key = key.trim().replace('/', ".");
        self.set(&key, value.trim().to_string())
    }

    /// Applies override strings in order; later ones win.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed override.
    pub fn set_all<I, S>(self, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        options
            .into_iter()
            .try_fold(self, |loader, option| loader.set_from_str(option.as_ref()))
    }

    #[must_use]
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Numbered source list, lowest precedence first.
    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| format!("{}. {source}", i + 1))
            .collect()
    }

    /// Merges every source and deserializes the result.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing required file, malformed TOML, an
    /// environment value of the wrong type, or an unknown key.
    pub fn build(self) -> Result<Config> {
        let mut builder = self.builder;
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        Ok(builder.build()?.try_deserialize::<Config>()?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
