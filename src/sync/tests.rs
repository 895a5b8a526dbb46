// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{StatusCounts, SyncStatus, SyncStatusMap, is_metadata, sync};
use crate::error::{BackupError, SyncError};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn set_mtime(path: &Path, time: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn source_tree() -> TempDir {
    let source = temp_dir();
    write(source.path(), "README.md", "# notes");
    write(source.path(), "daily/2026-10-19.md", "today");
    write(source.path(), "daily/archive/old.md", "old");
    write(source.path(), ".obsidian/app.json", "{}");
    source
}

#[test]
fn test_sync_into_empty_destination() {
    let source = source_tree();
    let dest = temp_dir();

    let status = sync(source.path(), dest.path()).unwrap();

    insta::assert_debug_snapshot!(status, @r#"
    SyncStatusMap(
        {
            ".obsidian/app.json": Updated,
            "README.md": Updated,
            "daily/2026-10-19.md": Updated,
            "daily/archive/old.md": Updated,
        },
    )
    "#);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("daily/archive/old.md")).unwrap(),
        "old"
    );
}

#[test]
fn test_sync_is_idempotent() {
    let source = source_tree();
    let dest = temp_dir();
    sync(source.path(), dest.path()).unwrap();

    let status = sync(source.path(), dest.path()).unwrap();
    assert!(status.is_empty(), "{status:?}");
}

#[test]
fn test_sync_copies_newer_and_resized_files() {
    let source = source_tree();
    let dest = temp_dir();
    sync(source.path(), dest.path()).unwrap();

    let readme = source.path().join("README.md");
    set_mtime(&readme, SystemTime::now() + Duration::from_secs(60));
    write(source.path(), "daily/2026-10-19.md", "today, longer");
    let old = dest.path().join("daily/archive/old.md");
    // Destination newer with same size: left alone.
    set_mtime(&old, SystemTime::now() + Duration::from_secs(3600));

    let status = sync(source.path(), dest.path()).unwrap();
    assert_eq!(status.get("README.md"), Some(SyncStatus::Updated));
    assert_eq!(status.get("daily/2026-10-19.md"), Some(SyncStatus::Updated));
    assert_eq!(status.get("daily/archive/old.md"), None);
    assert_eq!(status.len(), 2);
}

#[test]
fn test_sync_deletes_and_prunes() {
    let source = source_tree();
    let dest = temp_dir();
    sync(source.path(), dest.path()).unwrap();

    std::fs::remove_dir_all(source.path().join("daily/archive")).unwrap();
    let status = sync(source.path(), dest.path()).unwrap();

    assert_eq!(status.get("daily/archive/old.md"), Some(SyncStatus::Deleted));
    assert_eq!(status.len(), 1);
    assert!(!dest.path().join("daily/archive").exists());
    assert!(dest.path().join("daily/2026-10-19.md").is_file());
}

#[test]
fn test_sync_leaves_metadata_alone() {
    let source = source_tree();
    let dest = temp_dir();
    write(dest.path(), ".git/HEAD", "ref: refs/heads/main");
    std::fs::create_dir_all(dest.path().join(".git/refs/tags")).unwrap();
    write(dest.path(), ".gitignore", ".*");
    write(dest.path(), ".gitmodules", "");
    write(dest.path(), "sub/repo/.git", "gitdir: ../../.git/modules/sub/repo");

    let status = sync(source.path(), dest.path()).unwrap();
    assert_eq!(status.counts().deleted, 0);
    assert!(dest.path().join(".git/HEAD").is_file());
    assert!(dest.path().join(".git/refs/tags").is_dir());
    assert!(dest.path().join(".gitignore").is_file());
    assert!(dest.path().join("sub/repo/.git").is_file());
}

#[test]
fn test_sync_missing_source_is_fatal() {
    let temp = temp_dir();
    let err = sync(&temp.path().join("missing"), &temp.path().join("dest")).unwrap_err();
    assert!(matches!(err, BackupError::Sync(ref e) if matches!(**e, SyncError::Traversal { .. })));
}

#[test]
fn test_sync_records_copy_failure_and_continues() {
    let source = source_tree();
    let dest = temp_dir();
    write(source.path(), "clash", "file in source");
    // A directory where the file should go makes the copy fail.
    write(dest.path(), "clash/inner.txt", "stale");

    let status = sync(source.path(), dest.path()).unwrap();
    assert_eq!(status.get("clash"), Some(SyncStatus::Failed));
    assert_eq!(status.get("clash/inner.txt"), Some(SyncStatus::Deleted));
    assert_eq!(status.get("README.md"), Some(SyncStatus::Updated));
    assert_eq!(
        status.counts(),
        StatusCounts { updated: 4, deleted: 1, failed: 1 }
    );
}

#[test]
fn test_is_metadata() {
    assert!(is_metadata(Path::new(".git/HEAD")));
    assert!(is_metadata(Path::new(".gitignore")));
    assert!(is_metadata(Path::new(".github/workflows/ci.yml")));
    assert!(is_metadata(Path::new("sub/repo/.git")));
    assert!(!is_metadata(Path::new("notes/.gitkeep-not-top")));
    assert!(!is_metadata(Path::new("README.md")));
}

#[test]
fn test_status_counts() {
    let mut status = SyncStatusMap::new();
    status.record("a", SyncStatus::Updated);
    status.record("b", SyncStatus::Updated);
    status.record("c", SyncStatus::Updated);
    status.record("d", SyncStatus::Deleted);
    assert_eq!(
        status.counts(),
        StatusCounts { updated: 3, deleted: 1, failed: 0 }
    );
    assert_eq!(status.counts().total(), 4);
}
