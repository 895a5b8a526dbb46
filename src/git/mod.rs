// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!      repo / submodule / publish
//!                 |
//!                 v
//!      ,----------------------,
//!      |  VcsClient (trait)   |
//!      '---+--------------+---'
//!          |              |
//!          v              v
//!    ShellBackend     test doubles
//!    git -c k=v ..
//!          ^
//!          |
//!     GitContext   (identity, ssh command, credential helper)
//!
//!    query.rs      gix, read-only (is repo, origin url, branch)
//!    porcelain.rs  status parsing, unmerged detection
//! ```

pub mod backend;
pub mod context;
pub mod porcelain;
pub mod query;
