// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push with bounded retry.
//!
//! ```text
//! attempt 1: push ──ok──> done
//!              │fail
//!              v
//!       ForcePushPolicy::decide ──Decline──> ForcePushDeclined
//!              │Force
//!              v
//!       Backoff::wait ──> attempt 2..n: push --force
//!                             fail on last attempt ──> PushExhausted
//! ```
//!
//! The engine never prompts; the caller supplies the policy.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::types::ForcePolicy;
use crate::error::{BackupError, BackupResult, PublishError};
use crate::git::backend::VcsClient;

/// A failed push attempt.
#[derive(Debug, Clone)]
pub struct PushFailure {
    /// 1-based attempt number.
    pub attempt: u32,
    pub remote: String,
    pub branch: String,
    /// Diagnostics reported by git.
    pub message: String,
}

/// Answer to a failed normal push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceDecision {
    Force,
    Decline,
}

/// Decides whether to overwrite the remote after a normal push failed.
pub trait ForcePushPolicy: Send + Sync {
    fn decide(&self, failure: &PushFailure) -> ForceDecision;
}

/// Always force.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysForce;

impl ForcePushPolicy for AlwaysForce {
    fn decide(&self, _failure: &PushFailure) -> ForceDecision {
        ForceDecision::Force
    }
}

/// Never force.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverForce;

impl ForcePushPolicy for NeverForce {
    fn decide(&self, _failure: &PushFailure) -> ForceDecision {
        ForceDecision::Decline
    }
}

/// Headless policy for a configured [`ForcePolicy`].
///
/// `Ask` has no one to ask here and declines.
#[must_use]
pub fn headless_policy(policy: ForcePolicy) -> Box<dyn ForcePushPolicy> {
    match policy {
        ForcePolicy::Always => Box::new(AlwaysForce),
        ForcePolicy::Never | ForcePolicy::Ask => Box::new(NeverForce),
    }
}

/// Pause between push attempts.
pub trait Backoff: Send + Sync {
    /// Called after failed attempt `attempt` when another attempt follows.
    fn wait(&self, attempt: u32);
}

/// Sleeps the calling thread for a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct ThreadBackoff {
    interval: Duration,
}

impl ThreadBackoff {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Backoff for ThreadBackoff {
    fn wait(&self, attempt: u32) {
        info!(attempt, secs = self.interval.as_secs(), "waiting before next push attempt");
        std::thread::sleep(self.interval);
    }
}

/// Successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub attempts: u32,
    pub forced: bool,
}

/// Push `branch` to `remote`, escalating to a forced push if the policy allows.
///
/// # Errors
///
/// Returns `PublishError::ForcePushDeclined` if the policy declines after the
/// first failure, or `PublishError::PushExhausted` once `max_attempts` pushes
/// have failed.
pub fn push_with_retry(
    client: &dyn VcsClient,
    repo: &Path,
    remote: &str,
    branch: &str,
    max_attempts: u32,
    policy: &dyn ForcePushPolicy,
    backoff: &dyn Backoff,
) -> BackupResult<PushReport> {
    let max_attempts = max_attempts.max(1);
    let mut force = false;

    for attempt in 1..=max_attempts {
        let message = match client.push(repo, remote, branch, force) {
            Ok(()) => {
                info!(attempt, forced = force, %remote, %branch, "pushed");
                return Ok(PushReport {
                    attempts: attempt,
                    forced: force,
                });
            }
            Err(BackupError::Git(e)) => e.diagnostics(),
            Err(e) => return Err(e),
        };

        if attempt == max_attempts {
            return Err(PublishError::PushExhausted {
                attempts: max_attempts,
                message,
            }
            .into());
        }
        warn!(attempt, error = %message, "push attempt failed, retrying");

        if !force {
            let failure = PushFailure {
                attempt,
                remote: remote.to_string(),
                branch: branch.to_string(),
                message,
            };
            match policy.decide(&failure) {
                ForceDecision::Force => {
                    warn!("retrying with force push");
                    force = true;
                }
                ForceDecision::Decline => {
                    warn!("force push declined");
                    return Err(PublishError::ForcePushDeclined.into());
                }
            }
        }

        backoff.wait(attempt);
    }

    Err(PublishError::PushExhausted {
        attempts: max_attempts,
        message: String::new(),
    }
    .into())
}
