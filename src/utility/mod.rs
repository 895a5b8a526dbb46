// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   walk:  parallel_walk(), WalkResult
//!   copy:  copy_preserving_mtime(), FileStamp, remove_empty_dirs()
//! ```

pub mod fs;
