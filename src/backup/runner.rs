// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-worker execution of backups.
//!
//! ```text
//! BackupRunner::start ──busy?──> Err("backup already in progress")
//!        |
//!        v
//! spawn_blocking( run(session, ShellBackend) ) ──BackupEvent──> flume ──> CLI
//!        |
//!        v
//! RunHandle::join ──> BackupReport        (busy flag cleared on exit)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{BackupEvent, BackupReport, BackupSession, RunContext, run};
use crate::auth::preflight;
use crate::error::{BackupResult, bail_out};
use crate::git::backend::{ShellBackend, VcsClient};
use crate::publish::PushControl;
use crate::publish::push::{Backoff, ForcePushPolicy, ThreadBackoff};

/// Runs at most one backup at a time.
#[derive(Debug, Default, Clone)]
pub struct BackupRunner {
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the worker ends, even by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A backup in flight.
pub struct RunHandle {
    events: flume::Receiver<BackupEvent>,
    task: tokio::task::JoinHandle<BackupReport>,
}

impl RunHandle {
    /// Progress events; the stream ends after [`BackupEvent::Finished`].
    #[must_use]
    pub const fn events(&self) -> &flume::Receiver<BackupEvent> {
        &self.events
    }

    /// Wait for the worker to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker panicked.
    pub async fn join(self) -> BackupResult<BackupReport> {
        self.task
            .await
            .map_err(|e| bail_out(format!("backup worker failed: {e}")))
    }
}

impl BackupRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start `session` on a blocking worker with the git command-line client.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `BackupError::Bailed` if a backup is already running.
    pub fn start(
        &self,
        session: BackupSession,
        policy: Arc<dyn ForcePushPolicy>,
    ) -> BackupResult<RunHandle> {
        let backoff = Arc::new(ThreadBackoff::new(Duration::from_secs(session.backoff_secs())));
        self.start_with(session, policy, backoff, |ctx| Box::new(ShellBackend::new(ctx)))
    }

    /// Like [`Self::start`], with explicit backoff and client construction.
    ///
    /// # Errors
    ///
    /// Returns `BackupError::Bailed` if a backup is already running.
    pub fn start_with<F>(
        &self,
        mut session: BackupSession,
        policy: Arc<dyn ForcePushPolicy>,
        backoff: Arc<dyn Backoff>,
        make_client: F,
    ) -> BackupResult<RunHandle>
    where
        F: FnOnce(crate::git::context::GitContext) -> Box<dyn VcsClient> + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(bail_out("backup already in progress"));
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (tx, rx) = flume::unbounded();
        let handle = tokio::runtime::Handle::current();
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            debug!(repo = %session.name(), "backup worker started");
            let ssh_check = |key: &std::path::Path, host: &str| {
                handle.block_on(preflight::check_ssh_key(key, host))
            };
            let ctx = RunContext {
                control: PushControl {
                    policy: policy.as_ref(),
                    backoff: backoff.as_ref(),
                },
                events: &tx,
                ssh_check: Some(&ssh_check),
            };
            run(&mut session, make_client, &ctx)
        });

        Ok(RunHandle { events: rx, task })
    }
}
