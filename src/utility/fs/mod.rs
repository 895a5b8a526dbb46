// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities.
//!
//! ```text
//! walk:  parallel_walk()   ignore::WalkParallel, files + links, flume collection
//! copy:  copy_preserving_mtime()  copy + set_modified
//!        FileStamp                 (mtime, size) change heuristic
//!        remove_empty_dirs()       bottom-up pruning
//! ```

pub mod copy;
pub mod walk;
