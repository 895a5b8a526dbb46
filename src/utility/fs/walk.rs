// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parallel tree listing for the sync pass.
//!
//! Every entry is visited, hidden or git-ignored alike. Directories named in
//! `skip_dirs` are pruned before descending. Symbolic links are reported
//! separately and never followed.

use crate::error::Result;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

enum Found {
    File(PathBuf),
    Link(PathBuf),
}

/// Paths collected by [`parallel_walk`], relative to the walked root and sorted.
#[derive(Debug, Default)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    links: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    /// Regular files.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Symbolic links of any kind, including dangling ones.
    #[must_use]
    pub fn links(&self) -> &[PathBuf] {
        &self.links
    }

    /// Entries that could not be read.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

fn build_walker(root: &Path, skip_dirs: &[&str]) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false).follow_links(false);

    if skip_dirs.is_empty() {
        return builder;
    }
    // Pruned before descending; the root itself is never skipped.
    let skip_dirs: Arc<[String]> = skip_dirs.iter().map(|dir| (*dir).to_string()).collect();
    builder.filter_entry(move |entry| {
        let pruned = entry.depth() > 0
            && entry.file_type().is_some_and(|ft| ft.is_dir())
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| skip_dirs.iter().any(|skip| skip == name));
        !pruned
    });
    builder
}

fn relative(root: &Path, mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.retain_mut(|path| match path.strip_prefix(root) {
        Ok(rel) => {
            *path = rel.to_path_buf();
            true
        }
        Err(_) => false,
    });
    paths.sort();
    paths
}

/// Lists the files and symbolic links under `root` using `ignore::WalkParallel`.
///
/// Results are collected over a flume channel. Unreadable entries are counted
/// in [`WalkResult::error_count`] rather than aborting the walk.
///
/// # Errors
///
/// Returns an error if `root` is not a directory.
///
/// # Example
/// ```no_run
/// use repo_backup::utility::fs::walk::parallel_walk;
///
/// let result = parallel_walk("/path/to/notes", &[".git"])?;
/// println!("Found {} files", result.files().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(root: P, skip_dirs: &[&str]) -> Result<WalkResult> {
    let root = root.as_ref();

    if !root.is_dir() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    // Bounded to cap memory on huge trees; drained while the walk runs.
    let (tx, rx) = bounded::<Found>(1000);
    let errors = AtomicUsize::new(0);
    let parallel = build_walker(root, skip_dirs).build_parallel();

    let (files, links) = std::thread::scope(|scope| {
        let collector = scope.spawn(move || {
            let mut files = Vec::new();
            let mut links = Vec::new();
            for found in rx {
                match found {
                    Found::File(path) => files.push(path),
                    Found::Link(path) => links.push(path),
                }
            }
            (files, links)
        });

        parallel.run(|| {
            let tx = tx.clone();
            let errors = &errors;
            Box::new(move |entry| {
                let found = match entry {
                    Ok(entry) => match entry.file_type() {
                        Some(ft) if ft.is_file() => Some(Found::File(entry.into_path())),
                        Some(ft) if ft.is_symlink() => Some(Found::Link(entry.into_path())),
                        _ => None,
                    },
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        errors.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                };
                if let Some(found) = found
                    && tx.send(found).is_err()
                {
                    return ignore::WalkState::Quit;
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        collector.join().unwrap_or_default()
    });

    Ok(WalkResult {
        files: relative(root, files),
        links: relative(root, links),
        error_count: errors.into_inner(),
    })
}
