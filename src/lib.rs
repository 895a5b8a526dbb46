// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |         backup / check-ssh / options
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            v
//!                         backup
//!              session, run(), single runner
//!                            |
//!     +--------+--------+----+-----+----------+
//!     v        v        v          v          v
//!   auth     repo   submodule    sync      publish
//!  (guard,  (init)   (link)    (mirror)  (commit, pull,
//!   ssh)                                  conflicts, push)
//!     |        |        |          |          |
//!     +--------+--------+----+-----+----------+
//!                            v
//!                git  VcsClient, ShellBackend, gix queries
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod auth;
pub mod backup;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod publish;
pub mod repo;
pub mod submodule;
pub mod sync;
pub mod utility;

#[cfg(test)]
mod test_utils;
