// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Copies `src` to `dst`, creating parent directories and carrying over the
/// modification time.
///
/// Permissions are copied too, so a read-only `dst` left by an earlier pass
/// is removed before it is replaced.
///
/// # Errors
///
/// Returns an error if the parent cannot be created, the copy fails, or the
/// timestamp cannot be set.
///
/// # Example
/// ```no_run
/// use repo_backup::utility::fs::copy::copy_preserving_mtime;
/// use std::path::Path;
///
/// copy_preserving_mtime(Path::new("/notes/a.md"), Path::new("/mirror/a.md"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn copy_preserving_mtime(src: &Path, dst: &Path) -> io::Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let modified = fs::metadata(src)?.modified()?;
    if fs::symlink_metadata(dst).is_ok_and(|meta| meta.is_file() && meta.permissions().readonly()) {
        fs::remove_file(dst)?;
    }
    let bytes = fs::copy(src, dst)?;
    open_for_times(dst)?.set_modified(modified)?;
    Ok(bytes)
}

/// Handle that may change timestamps without needing write access to the
/// file contents.
#[cfg(unix)]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    File::options().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::options().write(true).open(path)
}

/// Modification time and size of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

impl FileStamp {
    /// Stamp of `path`, `None` if it does not exist or is not a file.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok().filter(fs::Metadata::is_file)?;
        Some(Self {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }

    /// True if a file stamped `self` should replace one stamped `existing`.
    #[must_use]
    pub fn is_newer_than(&self, existing: &Self) -> bool {
        self.modified > existing.modified || self.len != existing.len
    }
}

/// Removes empty directories under `root`, deepest first.
///
/// `root` itself and directories for which `keep` returns true (given the
/// path relative to `root`) are never removed, nor is anything below them.
/// Returns the removed directories.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn remove_empty_dirs(root: &Path, keep: &dyn Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    prune(root, root, keep, &mut removed)?;
    Ok(removed)
}

/// Returns whether `dir` is empty after pruning its children.
fn prune(
    root: &Path,
    dir: &Path,
    keep: &dyn Fn(&Path) -> bool,
    removed: &mut Vec<PathBuf>,
) -> io::Result<bool> {
    let mut empty = true;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_dir = entry.file_type()?.is_dir();
        let rel = path.strip_prefix(root).unwrap_or(&path);

        if !is_dir || keep(rel) {
            empty = false;
            continue;
        }
        if prune(root, &path, keep, removed)? {
            fs::remove_dir(&path)?;
            removed.push(path);
        } else {
            empty = false;
        }
    }
    Ok(empty)
}
