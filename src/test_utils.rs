// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! `ScriptedClient` stands in for git: every call is recorded and answered
//! from a per-operation queue (empty queue = success with empty output).
//! `capture_logs` collects tracing output of a closure.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{BackupResult, GitError};
use crate::git::backend::VcsClient;

type Script = HashMap<&'static str, VecDeque<Result<String, String>>>;

/// Clones share the same call log and script.
#[derive(Clone, Default)]
pub(crate) struct ScriptedClient {
    calls: Arc<Mutex<Vec<String>>>,
    script: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer for the next call of `op`.
    pub(crate) fn respond(&self, op: &'static str, output: &str) -> &Self {
        self.push(op, Ok(output.to_string()))
    }

    /// Queue a failure for the next call of `op`.
    pub(crate) fn fail(&self, op: &'static str, stderr: &str) -> &Self {
        self.push(op, Err(stderr.to_string()))
    }

    fn push(&self, op: &'static str, outcome: Result<String, String>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(outcome);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(op))
            .count()
    }

    fn next(&self, op: &'static str, call: String) -> BackupResult<String> {
        self.calls.lock().unwrap().push(call.clone());
        let scripted = self
            .script
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        match scripted {
            None => Ok(String::new()),
            Some(Ok(output)) => Ok(output),
            Some(Err(stderr)) => Err(GitError::CommandFailed {
                command: call,
                stderr,
                stdout: String::new(),
            }
            .into()),
        }
    }

    fn unit(&self, op: &'static str, call: String) -> BackupResult<()> {
        self.next(op, call).map(|_| ())
    }

    fn optional(&self, op: &'static str, call: String) -> BackupResult<Option<String>> {
        self.next(op, call)
            .map(|out| Some(out).filter(|out| !out.is_empty()))
    }
}

impl VcsClient for ScriptedClient {
    fn init(&self, _repo: &Path) -> BackupResult<()> {
        self.unit("init", "init".into())
    }

    fn checkout_new_branch(&self, _repo: &Path, branch: &str) -> BackupResult<()> {
        self.unit("checkout", format!("checkout -b {branch}"))
    }

    fn remote_remove(&self, _repo: &Path, name: &str) -> BackupResult<()> {
        self.unit("remote_remove", format!("remote_remove {name}"))
    }

    fn remote_add(&self, _repo: &Path, name: &str, url: &str) -> BackupResult<()> {
        self.unit("remote_add", format!("remote_add {name} {url}"))
    }

    fn add(&self, _repo: &Path, pathspec: &str) -> BackupResult<()> {
        self.unit("add", format!("add {pathspec}"))
    }

    fn add_all(&self, _repo: &Path) -> BackupResult<()> {
        self.unit("add_all", "add_all".into())
    }

    fn commit(&self, _repo: &Path, message: &str) -> BackupResult<()> {
        self.unit("commit", format!("commit {}", message.lines().next().unwrap_or("")))
    }

    fn status_porcelain(&self, _repo: &Path) -> BackupResult<String> {
        self.next("status", "status".into())
    }

    fn fetch(&self, _repo: &Path, remote: &str) -> BackupResult<()> {
        self.unit("fetch", format!("fetch {remote}"))
    }

    fn rev_parse(&self, _repo: &Path, rev: &str) -> BackupResult<Option<String>> {
        self.optional("rev_parse", format!("rev_parse {rev}"))
    }

    fn pull_no_rebase(&self, _repo: &Path, remote: &str, branch: &str) -> BackupResult<()> {
        self.unit("pull", format!("pull {remote} {branch}"))
    }

    fn push(&self, _repo: &Path, remote: &str, branch: &str, force: bool) -> BackupResult<()> {
        self.unit("push", format!("push {remote} {branch} force={force}"))
    }

    fn submodule_status(&self, _repo: &Path, path: &str) -> BackupResult<String> {
        self.next("submodule_status", format!("submodule_status {path}"))
    }

    fn submodule_add(&self, _repo: &Path, url: &str, path: &str) -> BackupResult<()> {
        self.unit("submodule_add", format!("submodule_add {url} {path}"))
    }

    fn submodule_init(&self, _repo: &Path) -> BackupResult<()> {
        self.unit("submodule_init", "submodule_init".into())
    }

    fn submodule_update(&self, _repo: &Path) -> BackupResult<()> {
        self.unit("submodule_update", "submodule_update".into())
    }

    fn submodule_foreach(&self, _repo: &Path, args: &[&str]) -> BackupResult<()> {
        self.unit("submodule_foreach", format!("submodule_foreach {}", args[0]))
    }

    fn config_get(
        &self,
        _repo: &Path,
        file: Option<&str>,
        key: &str,
    ) -> BackupResult<Option<String>> {
        self.optional(
            "config_get",
            format!("config_get {} {key}", file.unwrap_or("-")),
        )
    }

    fn config_remove_section(
        &self,
        _repo: &Path,
        file: Option<&str>,
        section: &str,
    ) -> BackupResult<()> {
        self.unit(
            "config_remove_section",
            format!("config_remove_section {} {section}", file.unwrap_or("-")),
        )
    }

    fn rm_cached(&self, _repo: &Path, path: &str) -> BackupResult<()> {
        self.unit("rm_cached", format!("rm_cached {path}"))
    }

    fn reset_hard(&self, _repo: &Path, rev: &str) -> BackupResult<()> {
        self.unit("reset_hard", format!("reset_hard {rev}"))
    }
}

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Runs `f` while capturing tracing output at `DEBUG` and above.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.lock().unwrap()).to_string();
    (value, logs)
}
