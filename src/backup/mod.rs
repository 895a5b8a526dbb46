// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One backup invocation, end to end.
//!
//! ```text
//! BackupSession (from Config)
//!      |
//!      v
//! run():  authenticate ──> initialize ──> submodule ──> sync ──> publish
//!           AuthContext      repo::          (warn on      sync::   publish::
//!           (guard, dropped  ensure_         failure)      sync     publish
//!            on every path)  repository
//!      |
//!      v
//! BackupReport ──> BackupEvent::Finished ──> presentation
//! ```
//!
//! `runner::BackupRunner` moves `run` onto a blocking worker and allows only
//! one backup at a time.

pub mod runner;

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn};

use crate::auth::{AuthContext, AuthDescriptor};
use crate::config::Config;
use crate::config::types::{GitConfig, PullFailurePolicy};
use crate::error::{BackupError, BackupResult, ConfigError};
use crate::git::backend::VcsClient;
use crate::git::context::{GitContext, redact_credentials};
use crate::publish::push::PushReport;
use crate::publish::{self, PublishOptions, PublishOutcome, PushControl};
use crate::repo::{self, InitOptions, RepositoryName};
use crate::submodule::{self, LinkOutcome};
use crate::sync::{self, StatusCounts, SyncStatusMap};

/// Everything one backup needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct BackupSession {
    source: PathBuf,
    remote_url: String,
    branch: String,
    name: RepositoryName,
    repo_root: PathBuf,
    submodule: Option<String>,
    auth: AuthDescriptor,
    host_key_checking: String,
    verify_ssh: bool,
    ssh_host: String,
    git: GitConfig,
    force: bool,
    max_attempts: u32,
    backoff_secs: u64,
    on_pull_failure: PullFailurePolicy,
    status: SyncStatusMap,
}

impl BackupSession {
    /// Validate `config` and derive the session from it.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is incomplete or
    /// inconsistent, or if no repository root is set and the home directory
    /// is unknown.
    pub fn from_config(config: &Config) -> BackupResult<Self> {
        config.validate_for_backup()?;

        let home = dirs::home_dir();
        let repo_root = config
            .backup
            .repo_root
            .clone()
            .or_else(|| home.clone())
            .ok_or(ConfigError::NoHomeDirectory)?;

        let source = config
            .backup
            .source
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                section: "backup".to_string(),
                key: "source".to_string(),
            })?;
        let source = std::path::absolute(source)?;

        let remote_url = config.backup.remote_url.trim().to_string();
        let auth = AuthDescriptor::from_config(&config.auth)?
            .with_default_key(&remote_url, home.as_deref());

        let session = Self {
            source,
            name: RepositoryName::from_remote_url(&remote_url),
            remote_url,
            branch: config.backup.branch.trim().to_string(),
            repo_root,
            submodule: config
                .backup
                .submodule
                .clone()
                .filter(|rel| !rel.trim().is_empty()),
            auth,
            host_key_checking: config.auth.host_key_checking.clone(),
            verify_ssh: config.auth.verify_ssh,
            ssh_host: config.auth.ssh_host.clone(),
            git: config.git.clone(),
            force: config.backup.force,
            max_attempts: config.push.max_attempts,
            backoff_secs: config.push.backoff_secs,
            on_pull_failure: config.push.on_pull_failure,
            status: SyncStatusMap::new(),
        };
        session.check_separate()?;
        Ok(session)
    }

    /// The source and the mirror must not be the same directory or nest
    /// inside one another, after resolving symbolic links.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSource` naming the overlap.
    pub fn check_separate(&self) -> BackupResult<()> {
        let source = resolve(&self.source)?;
        let mirror = resolve(&self.repository_path())?;
        let reason = if source == mirror {
            "it is the mirror repository itself"
        } else if mirror.starts_with(&source) {
            "it contains the mirror repository"
        } else if source.starts_with(&mirror) {
            "it lies inside the mirror repository"
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidSource {
            path: source.display().to_string(),
            reason: format!("{reason} ({})", mirror.display()),
        }
        .into())
    }

    /// `<repo_root>/<name>`, computed on every call.
    #[must_use]
    pub fn repository_path(&self) -> PathBuf {
        self.repo_root.join(self.name.as_str())
    }

    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthDescriptor {
        &self.auth
    }

    /// Status map of the most recent sync pass.
    #[must_use]
    pub const fn status(&self) -> &SyncStatusMap {
        &self.status
    }

    #[must_use]
    pub const fn backoff_secs(&self) -> u64 {
        self.backoff_secs
    }

    /// Key to check with the ssh handshake before starting, if requested.
    #[must_use]
    pub fn ssh_gate(&self) -> Option<(&Path, &str)> {
        match &self.auth {
            AuthDescriptor::Key { key_path } if self.verify_ssh => {
                Some((key_path.as_path(), self.ssh_host.as_str()))
            }
            _ => None,
        }
    }

    /// Redirect the mirror to another root.
    pub fn set_repo_root(&mut self, root: impl Into<PathBuf>) {
        self.repo_root = root.into();
    }

    fn remote_name(&self) -> &str {
        &self.git.remote
    }
}

/// Step of the control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Authenticate,
    Initialize,
    Submodule,
    Sync,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authenticate => "authenticate",
            Self::Initialize => "initialize",
            Self::Submodule => "submodule",
            Self::Sync => "sync",
            Self::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Result of a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BackupOutcome {
    /// Changes were committed and pushed.
    Pushed { attempts: u32, forced: bool },
    /// Nothing changed; nothing was published.
    NoChanges,
    Failed { stage: Stage, reason: String },
}

impl BackupOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Serializable summary handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub outcome: BackupOutcome,
    pub repository: RepositoryName,
    pub path: PathBuf,
    pub branch: String,
    pub counts: StatusCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodule: Option<LinkOutcome>,
}

impl BackupReport {
    /// The single outcome line shown to the user.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.outcome {
            BackupOutcome::Pushed { attempts, forced } => {
                let mut line = format!(
                    "Backup succeeded: {} updated, {} deleted, {} failed; pushed to {}",
                    self.counts.updated, self.counts.deleted, self.counts.failed, self.branch
                );
                if *forced {
                    line.push_str(" (forced)");
                }
                if *attempts > 1 {
                    line.push_str(&format!(" after {attempts} attempts"));
                }
                line
            }
            BackupOutcome::NoChanges => "Backup succeeded: no changes to back up".to_string(),
            BackupOutcome::Failed { stage, reason } => {
                format!("Backup failed during {stage}: {reason}")
            }
        }
    }
}

/// Progress notifications sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupEvent {
    StageStarted(Stage),
    /// A non-fatal problem; the backup continues.
    Warning(String),
    Finished(BackupReport),
}

/// Caller-supplied collaborators of [`run`].
pub struct RunContext<'a> {
    pub control: PushControl<'a>,
    pub events: &'a flume::Sender<BackupEvent>,
    /// Gate run before authentication is configured.
    pub ssh_check: Option<&'a dyn Fn(&Path, &str) -> BackupResult<()>>,
}

impl RunContext<'_> {
    fn emit(&self, event: BackupEvent) {
        // A gone receiver only means nobody is watching.
        let _ = self.events.send(event);
    }
}

/// Run one backup.
///
/// `make_client` receives the git settings of this backup (identity, merge
/// strategy, credentials) and returns the client every step uses. Failures
/// never escape: they end up in the report.
pub fn run(
    session: &mut BackupSession,
    make_client: impl FnOnce(GitContext) -> Box<dyn VcsClient>,
    ctx: &RunContext<'_>,
) -> BackupReport {
    let span = info_span!("backup", repo = %session.name);
    let _entered = span.enter();

    session.status = SyncStatusMap::new();
    let mut submodule = None;
    let result = execute(session, make_client, ctx, &mut submodule);

    let outcome = match result {
        Ok(PublishOutcome::NoChanges) => BackupOutcome::NoChanges,
        Ok(PublishOutcome::Pushed(PushReport { attempts, forced })) => {
            BackupOutcome::Pushed { attempts, forced }
        }
        Err((stage, err)) => {
            let reason = redact_credentials(&err.to_string());
            error!(%stage, error = %reason, "backup failed");
            BackupOutcome::Failed { stage, reason }
        }
    };

    let report = BackupReport {
        outcome,
        repository: session.name.clone(),
        path: session.repository_path(),
        branch: session.branch.clone(),
        counts: session.status.counts(),
        submodule,
    };
    info!(success = report.outcome.is_success(), "{}", report.summary());
    ctx.emit(BackupEvent::Finished(report.clone()));
    report
}

/// Absolute form of `path` with every existing ancestor canonicalized.
fn resolve(path: &Path) -> BackupResult<PathBuf> {
    let path = std::path::absolute(path)?;
    if let Ok(real) = std::fs::canonicalize(&path) {
        return Ok(real);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve(parent)?.join(name)),
        _ => Ok(path),
    }
}

type StageResult<T> = Result<T, (Stage, BackupError)>;

fn at<T>(stage: Stage, result: BackupResult<T>) -> StageResult<T> {
    result.map_err(|err| (stage, err))
}

fn execute(
    session: &mut BackupSession,
    make_client: impl FnOnce(GitContext) -> Box<dyn VcsClient>,
    ctx: &RunContext<'_>,
    submodule_outcome: &mut Option<LinkOutcome>,
) -> StageResult<PublishOutcome> {
    // The mirror root may have changed since the session was built.
    at(Stage::Initialize, session.check_separate())?;

    ctx.emit(BackupEvent::StageStarted(Stage::Authenticate));
    if let (Some(check), Some((key, host))) = (ctx.ssh_check, session.ssh_gate()) {
        at(Stage::Authenticate, check(key, host))?;
    }
    // Released on drop, whichever way this function returns.
    let auth = at(
        Stage::Authenticate,
        AuthContext::acquire(&session.auth, &session.remote_url, &session.host_key_checking),
    )?;
    let client = make_client(GitContext::from_config(&session.git).merged(auth.git_context()));
    let client = client.as_ref();
    let repo_path = session.repository_path();

    ctx.emit(BackupEvent::StageStarted(Stage::Initialize));
    at(
        Stage::Initialize,
        repo::ensure_repository(
            client,
            &repo_path,
            &InitOptions {
                branch: &session.branch,
                remote_name: session.remote_name(),
                remote_url: auth.remote_url(),
            },
        ),
    )?;

    if let Some(rel) = session.submodule.as_deref() {
        ctx.emit(BackupEvent::StageStarted(Stage::Submodule));
        match submodule::ensure_linked(client, &repo_path, &session.source, rel) {
            Ok(outcome) => *submodule_outcome = Some(outcome),
            Err(e) => {
                warn!(path = rel, error = %e, "continuing backup without submodule");
                ctx.emit(BackupEvent::Warning(format!("submodule '{rel}' skipped: {e}")));
            }
        }
    }

    ctx.emit(BackupEvent::StageStarted(Stage::Sync));
    session.status = at(Stage::Sync, sync::sync(&session.source, &repo_path))?;
    let counts = session.status.counts();
    if counts.failed > 0 {
        ctx.emit(BackupEvent::Warning(format!("{} file(s) failed to sync", counts.failed)));
    }

    ctx.emit(BackupEvent::StageStarted(Stage::Publish));
    at(
        Stage::Publish,
        publish::publish(
            client,
            &repo_path,
            &PublishOptions {
                remote: session.remote_name(),
                branch: &session.branch,
                force: session.force,
                max_attempts: session.max_attempts,
                on_pull_failure: session.on_pull_failure,
            },
            &counts,
            &ctx.control,
        ),
    )
}
