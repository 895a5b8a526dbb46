// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit and publish pipeline.
//!
//! ```text
//! submodules: add -A, commit        (warn only)
//!      v
//! add -A                            (fatal)
//!      v
//! status --porcelain ──empty && !force──> NoChanges
//!      v
//! commit "Backup: <ts>" ──"nothing to commit" && !force──> NoChanges
//!      v
//! fetch, HEAD vs <remote>/<branch>
//!      │differ
//!      v
//! pull --no-rebase ──fail──> unmerged entries? ──yes──> conflict::handle_conflicts, Conflict
//!      │                                        no ──> on_pull_failure policy
//!      v
//! push::push_with_retry
//! ```
//!
//! Order is fixed: nothing reaches the network before the local commit.

pub mod conflict;
pub mod message;
pub mod push;


use chrono::Local;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::types::PullFailurePolicy;
use crate::error::{BackupError, BackupResult, PublishError};
use crate::git::backend::VcsClient;
use crate::git::porcelain;
use crate::sync::StatusCounts;

use push::{Backoff, ForcePushPolicy, PushReport};

const NOTHING_TO_COMMIT: &str = "nothing to commit";

/// Settings for one publish run.
#[derive(Debug, Clone, Copy)]
pub struct PublishOptions<'a> {
    pub remote: &'a str,
    pub branch: &'a str,
    /// Commit and push even when the working tree is clean.
    pub force: bool,
    pub max_attempts: u32,
    pub on_pull_failure: PullFailurePolicy,
}

/// How publishing ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PublishOutcome {
    /// Nothing to commit; no network activity.
    NoChanges,
    /// Local commit reached the remote.
    Pushed(PushReport),
}

/// Caller-supplied decisions for the push step.
pub struct PushControl<'a> {
    pub policy: &'a dyn ForcePushPolicy,
    pub backoff: &'a dyn Backoff,
}

/// Stage, commit, reconcile with the remote, and push.
///
/// # Errors
///
/// Returns a `PublishError` if staging, committing, fetching, or pushing
/// fails, if the pull produced conflicts, or if a failed pull is not allowed
/// to continue under `on_pull_failure`.
pub fn publish(
    client: &dyn VcsClient,
    repo: &Path,
    options: &PublishOptions<'_>,
    counts: &StatusCounts,
    control: &PushControl<'_>,
) -> BackupResult<PublishOutcome> {
    let now = Local::now();

    commit_submodules(client, repo, &message::submodule_message(&now));

    client
        .add_all(repo)
        .map_err(|e| PublishError::Stage(diagnostics(&e)))?;

    let status = client
        .status_porcelain(repo)
        .map_err(|e| PublishError::Stage(diagnostics(&e)))?;
    if status.trim().is_empty() && !options.force {
        info!("no changes detected to back up");
        return Ok(PublishOutcome::NoChanges);
    }

    let message = message::commit_message(counts, &now);
    match client.commit(repo, &message) {
        Ok(()) => info!(
            updated = counts.updated,
            deleted = counts.deleted,
            failed = counts.failed,
            "committed"
        ),
        Err(e) if diagnostics(&e).contains(NOTHING_TO_COMMIT) => {
            if !options.force {
                info!("no changes to commit");
                return Ok(PublishOutcome::NoChanges);
            }
            info!("nothing new to commit, pushing existing history");
        }
        Err(e) => return Err(PublishError::Commit(diagnostics(&e)).into()),
    }

    reconcile(client, repo, options)?;

    let report = push::push_with_retry(
        client,
        repo,
        options.remote,
        options.branch,
        options.max_attempts,
        control.policy,
        control.backoff,
    )?;
    info!("changes successfully pushed to repository");
    Ok(PublishOutcome::Pushed(report))
}

fn commit_submodules(client: &dyn VcsClient, repo: &Path, message: &str) {
    if let Err(e) = client.submodule_foreach(repo, &["add", "-A"]) {
        warn!(error = %e, "submodule staging failed");
    }
    if let Err(e) = client.submodule_foreach(repo, &["commit", "-m", message]) {
        warn!(error = %e, "submodule commit failed");
    }
}

/// Bring in remote changes before pushing.
fn reconcile(client: &dyn VcsClient, repo: &Path, options: &PublishOptions<'_>) -> BackupResult<()> {
    client
        .fetch(repo, options.remote)
        .map_err(|e| PublishError::Remote(diagnostics(&e)))?;

    let remote_ref = format!("{}/{}", options.remote, options.branch);
    let local = client.rev_parse(repo, "HEAD")?;
    let Some(remote) = client.rev_parse(repo, &remote_ref)? else {
        debug!(%remote_ref, "remote branch does not exist yet");
        return Ok(());
    };
    if local.as_deref() == Some(remote.as_str()) {
        debug!(%remote_ref, "already up to date");
        return Ok(());
    }

    let Err(pull_err) = client.pull_no_rebase(repo, options.remote, options.branch) else {
        info!(%remote_ref, "merged remote changes");
        return Ok(());
    };
    let reason = diagnostics(&pull_err);
    warn!(error = %reason, "pull failed");

    let status = client.status_porcelain(repo).unwrap_or_default();
    let conflicts = porcelain::conflicts(&status);
    if !conflicts.is_empty() {
        error!(count = conflicts.len(), "merge conflicts detected");
        let preserved = conflict::handle_conflicts(client, repo, &conflicts)?;
        debug!(preserved = preserved.len(), "conflict copies written");
        return Err(PublishError::Conflict {
            count: conflicts.len(),
        }
        .into());
    }

    match options.on_pull_failure {
        PullFailurePolicy::PushAnyway => {
            warn!("pull failed without conflicts, attempting to continue");
            Ok(())
        }
        PullFailurePolicy::Abort => Err(PublishError::PullFailed(reason).into()),
    }
}

fn diagnostics(err: &BackupError) -> String {
    match err {
        BackupError::Git(e) => e.diagnostics(),
        other => other.to_string(),
    }
}
