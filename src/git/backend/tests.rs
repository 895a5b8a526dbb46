// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ShellBackend, VcsClient};
use crate::error::BackupError;
use crate::git::context::GitContext;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn backend() -> ShellBackend {
    ShellBackend::new(
        GitContext::new()
            .with_config("user.name", "Test")
            .with_config("user.email", "test@example.com")
            .with_config("commit.gpgsign", "false"),
    )
}

#[test]
fn test_init_and_branch() {
    let temp = temp_dir();
    let git = backend();
    git.init(temp.path()).unwrap();
    git.checkout_new_branch(temp.path(), "backup").unwrap();
    assert_eq!(
        crate::git::query::current_branch(temp.path()).unwrap().as_deref(),
        Some("backup")
    );
}

#[test]
fn test_commit_and_status() {
    let temp = temp_dir();
    let git = backend();
    git.init(temp.path()).unwrap();
    assert_eq!(git.status_porcelain(temp.path()).unwrap(), "");

    std::fs::write(temp.path().join("a.txt"), "hello").unwrap();
    assert_eq!(git.status_porcelain(temp.path()).unwrap(), "?? a.txt");

    git.add_all(temp.path()).unwrap();
    git.commit(temp.path(), "first").unwrap();
    assert_eq!(git.status_porcelain(temp.path()).unwrap(), "");
    assert!(git.rev_parse(temp.path(), "HEAD").unwrap().is_some());
}

#[test]
fn test_commit_nothing_reports_diagnostics() {
    let temp = temp_dir();
    let git = backend();
    git.init(temp.path()).unwrap();
    std::fs::write(temp.path().join("a.txt"), "hello").unwrap();
    git.add_all(temp.path()).unwrap();
    git.commit(temp.path(), "first").unwrap();

    let err = git.commit(temp.path(), "second").unwrap_err();
    match err {
        BackupError::Git(e) => assert!(e.diagnostics().contains("nothing to commit")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rev_parse_missing_is_none() {
    let temp = temp_dir();
    let git = backend();
    git.init(temp.path()).unwrap();
    assert_eq!(git.rev_parse(temp.path(), "origin/main").unwrap(), None);
}

#[test]
fn test_remote_add_remove() {
    let temp = temp_dir();
    let git = backend();
    git.init(temp.path()).unwrap();
    assert!(git.remote_remove(temp.path(), "origin").is_err());
    git.remote_add(temp.path(), "origin", "https://example.com/a.git")
        .unwrap();
    assert_eq!(
        git.config_get(temp.path(), None, "remote.origin.url").unwrap().as_deref(),
        Some("https://example.com/a.git")
    );
    git.remote_remove(temp.path(), "origin").unwrap();
    assert_eq!(git.config_get(temp.path(), None, "remote.origin.url").unwrap(), None);
}

#[test]
fn test_context_overrides_reach_git() {
    let temp = temp_dir();
    let git = ShellBackend::new(GitContext::new().with_config("backup.marker", "yes"));
    git.init(temp.path()).unwrap();
    assert_eq!(
        git.config_get(temp.path(), None, "backup.marker").unwrap().as_deref(),
        Some("yes")
    );
    // Overrides are never written to the repository config.
    let plain = ShellBackend::default();
    assert_eq!(plain.config_get(temp.path(), None, "backup.marker").unwrap(), None);
}

#[test]
fn test_ensure_available() {
    assert!(ShellBackend::ensure_available().is_ok());
}
