// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Options shared by every subcommand.
//!
//! Each flag is turned into a `section/key=value` string and applied on top
//! of the loaded configuration, after the raw `--set` strings.
//!
//! ```text
//! -c, --config FILE        [config files]
//! -l, --log-level N        global/output_log_level (+ file level if unset)
//!     --file-log-level N   global/file_log_level
//!     --log-file FILE      global/log_file
//!     --json-log           global/log_json
//! -s, --set KEY=VAL        any key
//! ```

use clap::Args;
use std::path::PathBuf;

/// Verbosity accepted by `--log-level` and `--file-log-level`.
fn level_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..=6)
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Extra TOML configuration file, read after `repo-backup.toml`.
    /// Repeat to layer several files; later files win.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Console verbosity: 0 silent, 1 errors, 2 warnings, 3 info, 4 debug, 5 trace, 6 dump.
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = level_parser())]
    pub log_level: Option<u8>,

    /// Verbosity of the log file; defaults to --log-level.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = level_parser())]
    pub file_log_level: Option<u8>,

    /// Append log records to FILE.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Write the log file as JSON lines.
    #[arg(long = "json-log", requires = "log_file")]
    pub json_log: bool,

    /// Raw option such as 'push/max_attempts=5' or 'backup.branch=notes'.
    /// Repeatable.
    #[arg(short = 's', long = "set", value_name = "OPTION", action = clap::ArgAction::Append)]
    pub options: Vec<String>,
}

impl GlobalOptions {
    /// `--set` strings first, then the dedicated flags so they win.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let console = self
            .log_level
            .map(|level| format!("global/output_log_level={level}"));
        let file = self
            .file_log_level
            .or(self.log_level)
            .map(|level| format!("global/file_log_level={level}"));
        let log_file = self
            .log_file
            .as_ref()
            .map(|path| format!("global/log_file={}", path.display()));
        let json = self.json_log.then(|| "global/log_json=true".to_string());

        self.options
            .iter()
            .cloned()
            .chain([console, file, log_file, json].into_iter().flatten())
            .collect()
    }
}
