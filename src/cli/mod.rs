// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for repo-backup using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! repo-backup [global options] <command>
//! backup      mirror, commit and push a directory
//! check-ssh   test an ssh key against the hosting service
//! options     print the effective configuration
//! version
//! ```

pub mod backup;
pub mod global;


use crate::cli::backup::{BackupArgs, CheckSshArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "repo-backup",
    author,
    version,
    about = "Directory-to-Git Backup Tool",
    long_about = "repo-backup Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Mirrors a local directory into a git repository under the\n\
                  home directory, commits the changes and pushes them to a\n\
                  remote. See `repo-backup <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  repo-backup reads `repo-backup.toml` from the current directory\n\
                  if it exists, then every file given with --config in order.\n\
                  REPO_BACKUP_<SECTION>__<KEY> environment variables come next,\n\
                  and command-line flags and --set options win over everything."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Backs up a directory to its remote repository.
    Backup(BackupArgs),

    /// Checks that an ssh key is accepted by the hosting service.
    #[command(name = "check-ssh")]
    CheckSsh(CheckSshArgs),
}

impl Cli {
    /// Override strings from global flags followed by command flags.
    #[must_use]
    pub fn config_overrides(&self) -> Vec<String> {
        let mut overrides = self.global.to_config_overrides();
        if let Some(Command::Backup(args)) = &self.command {
            overrides.extend(args.to_config_overrides());
        }
        overrides
    }
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
