// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `options` command.

use crate::config::Config;

/// Prints the configuration sources as comments, then every effective option.
pub fn run_options_command(config: &Config, sources: &[String]) {
    if sources.is_empty() {
        println!("# defaults only");
    }
    for line in sources {
        println!("# {line}");
    }
    for line in config.format_options() {
        println!("{line}");
    }
}
