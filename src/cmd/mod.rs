// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   backup, check-ssh, options
//! ```

pub mod backup;
pub mod check_ssh;
pub mod config;

#[cfg(test)]
mod tests;
