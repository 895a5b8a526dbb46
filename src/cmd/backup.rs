// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup command implementation.
//!
//! ```text
//! ensure git ──> BackupSession ──> BackupRunner::start
//!                                        |
//!        stderr <── render(BackupEvent) <┘
//!                                        |
//! stdout <── summary line | JSON report <┘
//! ```

use anyhow::Context;
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use crate::backup::runner::BackupRunner;
use crate::backup::{BackupEvent, BackupReport, BackupSession};
use crate::cli::backup::BackupArgs;
use crate::config::Config;
use crate::config::types::ForcePolicy;
use crate::error::Result;
use crate::git::backend::ShellBackend;
use crate::publish::push::{ForceDecision, ForcePushPolicy, PushFailure, headless_policy};

/// Asks on the terminal whether to force push.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptPolicy;

impl ForcePushPolicy for PromptPolicy {
    fn decide(&self, failure: &PushFailure) -> ForceDecision {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "Push to {}/{} failed: {}\nForce push and overwrite the remote branch? [y/N] ",
            failure.remote, failure.branch, failure.message
        );
        let _ = stderr.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => parse_answer(&line),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read answer, declining force push");
                ForceDecision::Decline
            }
        }
    }
}

/// `y`/`yes` (any case) forces; everything else declines.
pub(crate) fn parse_answer(line: &str) -> ForceDecision {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => ForceDecision::Force,
        _ => ForceDecision::Decline,
    }
}

/// Policy for this process: prompt only if someone can answer.
pub(crate) fn select_policy(policy: ForcePolicy, interactive: bool) -> Arc<dyn ForcePushPolicy> {
    match policy {
        ForcePolicy::Ask if interactive => Arc::new(PromptPolicy),
        other => Arc::from(headless_policy(other)),
    }
}

/// One log line per event; `None` for the final report.
pub(crate) fn render_event(event: &BackupEvent) -> Option<String> {
    match event {
        BackupEvent::StageStarted(stage) => Some(format!("==> {stage}")),
        BackupEvent::Warning(message) => Some(format!("warning: {message}")),
        BackupEvent::Finished(_) => None,
    }
}

/// Main handler for the backup command.
///
/// Returns the report; the caller decides the exit status from its outcome.
///
/// # Errors
///
/// Returns an error if git is missing, the configuration is unusable, or the
/// backup worker cannot be started or joined.
pub async fn run_backup_command(args: &BackupArgs, config: &Config) -> Result<BackupReport> {
    ShellBackend::ensure_available()?;
    let session = BackupSession::from_config(config).context("invalid backup configuration")?;
    let policy = select_policy(config.push.force_policy, std::io::stdin().is_terminal());

    let runner = BackupRunner::new();
    let handle = runner.start(session, policy)?;

    let events = handle.events().clone();
    while let Ok(event) = events.recv_async().await {
        if let Some(line) = render_event(&event) {
            eprintln!("{line}");
        }
    }
    let report = handle.join().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(report)
}
