// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `check-ssh` command: one handshake, one verdict.

use anyhow::Context;
use std::path::PathBuf;

use crate::auth::{default_key_path, preflight};
use crate::cli::backup::CheckSshArgs;
use crate::config::Config;
use crate::error::{AuthError, Result};

/// Run the ssh pre-flight check.
///
/// # Errors
///
/// Returns an error if no key can be found or the handshake fails.
pub async fn run_check_ssh_command(args: &CheckSshArgs, config: &Config) -> Result<()> {
    let key = resolve_key(args, config)?;
    let host = args.host.as_deref().unwrap_or(&config.auth.ssh_host);

    preflight::check_ssh_key(&key, host)
        .await
        .with_context(|| format!("ssh check with {} failed", key.display()))?;
    println!("SSH key {} accepted by {host}", key.display());
    Ok(())
}

pub(crate) fn resolve_key(args: &CheckSshArgs, config: &Config) -> Result<PathBuf> {
    args.key
        .clone()
        .or_else(|| config.auth.key_path.clone())
        .or_else(|| dirs::home_dir().as_deref().and_then(default_key_path))
        .ok_or_else(|| AuthError::NoDefaultKey.into())
}
