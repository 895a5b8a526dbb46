// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit messages.

use chrono::{DateTime, Local};

use crate::sync::StatusCounts;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Top-level backup commit message.
///
/// ```text
/// Backup: 2026-10-19 08:30:00
///
/// Files updated: 3
/// Files deleted: 1
/// ```
///
/// Categories with a zero count are left out.
#[must_use]
pub fn commit_message(counts: &StatusCounts, now: &DateTime<Local>) -> String {
    let mut message = format!("Backup: {}\n\n", now.format(TIMESTAMP_FORMAT));
    for (label, count) in [
        ("updated", counts.updated),
        ("deleted", counts.deleted),
        ("failed", counts.failed),
    ] {
        if count > 0 {
            message.push_str(&format!("Files {label}: {count}\n"));
        }
    }
    message
}

/// Message for commits made inside linked submodules.
#[must_use]
pub fn submodule_message(now: &DateTime<Local>) -> String {
    format!("Submodule update: {}", now.format(TIMESTAMP_FORMAT))
}
