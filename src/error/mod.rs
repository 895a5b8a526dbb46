// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                BackupError (~24 bytes)
//!                       |
//!   +------+------+-----+-----+------+-----+------+----+
//!   |      |      |     |     |      |     |      |    |
//!   v      v      v     v     v      v     v      v    v
//! Bail   Cfg    Auth  Repo  Subm   Sync   Git  Publ  Proc/Io/Other
//!        Box    Box   Box   Box    Box    Box  Box   Box<..>
//!
//! Sub-errors:
//!   Config     MissingKey, InvalidValue, ConflictingCredentials
//!   Auth       PublicKeyFile, KeyLoad, Connect, Rejected, Timeout
//!   Repo       CreateDir, Step
//!   Submodule  NotARepository, MissingRemoteUrl, Link
//!   Sync       Traversal
//!   Git        CommandFailed, Gix
//!   Publish    Stage, Commit, Conflict, PullFailed,
//!              ForcePushDeclined, PushExhausted
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`BackupError`].
pub type BackupResult<T> = std::result::Result<T, BackupError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Fatal error that should terminate the current operation.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Authentication setup or pre-flight failed.
    #[error("authentication error: {0}")]
    Auth(#[from] Box<AuthError>),

    /// Repository lifecycle setup failed.
    #[error("repository init error: {0}")]
    Repo(#[from] Box<RepoError>),

    /// Nested repository could not be linked.
    #[error("submodule error: {0}")]
    Submodule(#[from] Box<SubmoduleError>),

    /// File synchronization failed.
    #[error("sync error: {0}")]
    Sync(#[from] Box<SyncError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Commit/publish pipeline failed.
    #[error("publish error: {0}")]
    Publish(#[from] Box<PublishError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`BackupError::Bailed`].
pub fn bail_out(message: impl Into<String>) -> BackupError {
    BackupError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for BackupError {
                fn from(err: $error) -> Self {
                    BackupError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ConfigError => Config,
    AuthError => Auth,
    RepoError => Repo,
    SubmoduleError => Submodule,
    SyncError => Sync,
    GitError => Git,
    PublishError => Publish,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to open repository.
    #[error("failed to open repository: {0}")]
    Open(#[from] Box<gix::open::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to resolve head: {0}")]
    Head(String),
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command exited with a non-zero status.
    #[error("git command failed: {command} - {stderr}")]
    CommandFailed {
        command: String,
        stderr: String,
        stdout: String,
    },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Path could not be passed to git.
    #[error("invalid path for git: {0}")]
    InvalidPath(String),
}

impl GitError {
    /// Captured diagnostic output (stderr followed by stdout).
    #[must_use]
    pub fn diagnostics(&self) -> String {
        match self {
            Self::CommandFailed { stderr, stdout, .. } => {
                if stdout.is_empty() {
                    stderr.clone()
                } else if stderr.is_empty() {
                    stdout.clone()
                } else {
                    format!("{stderr}\n{stdout}")
                }
            }
            other => other.to_string(),
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Both key-based and token-based credentials were supplied.
    #[error("key-based and token-based credentials are mutually exclusive")]
    ConflictingCredentials,

    /// Source directory is unusable.
    #[error("invalid source '{path}': {reason}")]
    InvalidSource { path: String, reason: String },

    /// Home directory could not be determined.
    #[error("could not determine the home directory")]
    NoHomeDirectory,
}

// --- Auth Errors ---

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A public key was given where a private key is required.
    #[error("cannot use public key '{path}' for ssh authentication")]
    PublicKeyFile { path: String },

    /// Private key could not be read or decoded.
    #[error("failed to load private key '{path}': {message}")]
    KeyLoad { path: String, message: String },

    /// TCP connection or ssh handshake failed.
    #[error("ssh connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    /// Server refused the key.
    #[error("ssh authentication to {host} rejected for key '{path}'")]
    Rejected { host: String, path: String },

    /// Handshake did not finish in time.
    #[error("ssh connection to {host} timed out after {timeout_secs} seconds")]
    Timeout { host: String, timeout_secs: u64 },

    /// Credential record could not be written.
    #[error("failed to write credential record: {0}")]
    CredentialStore(#[source] std::io::Error),

    /// No private key found in the default locations.
    #[error("no ssh key given and none found in ~/.ssh")]
    NoDefaultKey,
}

// --- Repository Errors ---

/// Repository initialization errors.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Repository directory could not be created.
    #[error("failed to create repository directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A mandatory initialization step failed.
    #[error("initialization step '{step}' failed: {message}")]
    Step { step: &'static str, message: String },
}

// --- Submodule Errors ---

/// Submodule linking errors (non-fatal to a backup).
#[derive(Debug, Error)]
pub enum SubmoduleError {
    /// The expected location is not a git repository.
    #[error("target directory '{path}' is not a git repository")]
    NotARepository { path: String },

    /// The nested repository has no origin URL.
    #[error("no remote URL found in existing repository '{path}'")]
    MissingRemoteUrl { path: String },

    /// `git submodule add` failed.
    #[error("failed to link submodule '{path}': {message}")]
    Link { path: String, message: String },
}

// --- Sync Errors ---

/// File synchronization errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Directory traversal failed; fatal to the sync pass.
    #[error("failed to traverse '{path}': {message}")]
    Traversal { path: String, message: String },
}

// --- Publish Errors ---

/// Commit and publish pipeline errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Staging changes failed.
    #[error("failed to stage changes: {0}")]
    Stage(String),

    /// Commit failed for a reason other than "nothing to commit".
    #[error("commit failed: {0}")]
    Commit(String),

    /// Fetch or revision lookup failed.
    #[error("failed to sync with remote: {0}")]
    Remote(String),

    /// Pull produced merge conflicts; conflicted files were preserved.
    #[error("merge conflicts detected in {count} file(s)")]
    Conflict { count: usize },

    /// A conflicted file could not be copied aside; the working tree was
    /// left unresolved instead of being reset.
    #[error("failed to preserve conflicted file '{path}': {message}")]
    Preserve { path: String, message: String },

    /// Pull failed without conflicts and policy forbids pushing.
    #[error("pull failed: {0}")]
    PullFailed(String),

    /// Force push was declined after a failed push.
    #[error("push cancelled: force push declined")]
    ForcePushDeclined,

    /// All push attempts failed.
    #[error("failed to push changes after {attempts} attempts: {message}")]
    PushExhausted { attempts: u32, message: String },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
