// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-invocation git settings.
//!
//! ```text
//! GitContext
//!   overrides  -> git -c key=value ...   (never written to any config file)
//!   env        -> child environment
//! ```
//!
//! Every git process the backup spawns receives the same context, so the
//! ssh command, credential helper, identity and merge strategy exist only
//! for the lifetime of one backup.

use crate::config::types::GitConfig;

/// Configuration and environment threaded into every git call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitContext {
    overrides: Vec<(String, String)>,
    env: Vec<(String, String)>,
}

impl GitContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base context for a backup: identity from config and a merging pull.
    #[must_use]
    pub fn from_config(git: &GitConfig) -> Self {
        let mut ctx = Self::new().with_config("pull.rebase", "false");
        if let Some(name) = &git.user_name {
            ctx = ctx.with_config("user.name", name);
        }
        if let Some(email) = &git.user_email {
            ctx = ctx.with_config("user.email", email);
        }
        ctx
    }

    /// Adds (or replaces) a `-c key=value` override.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.overrides.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.overrides.push((key, value)),
        }
        self
    }

    /// Adds (or replaces) an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    /// Layers `other` on top of `self`; later values win.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (k, v) in &other.overrides {
            self = self.with_config(k.clone(), v.clone());
        }
        for (k, v) in &other.env {
            self = self.with_env(k.clone(), v.clone());
        }
        self
    }

    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn overrides(&self) -> &[(String, String)] {
        &self.overrides
    }

    #[must_use]
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Leading `-c key=value` arguments for a git command line.
    #[must_use]
    pub fn config_args(&self) -> Vec<String> {
        self.overrides
            .iter()
            .flat_map(|(k, v)| ["-c".to_string(), format!("{k}={v}")])
            .collect()
    }
}

/// Replaces `user:secret@` in any URL inside `text` with `***@`.
#[must_use]
pub fn redact_credentials(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(scheme) = rest.find("://") {
        let (head, tail) = rest.split_at(scheme + 3);
        out.push_str(head);
        let authority_end = tail.find(['/', ' ', '\n']).unwrap_or(tail.len());
        match tail[..authority_end].rfind('@') {
            Some(at) => {
                out.push_str("***");
                rest = &tail[at..];
            }
            None => rest = tail,
        }
    }
    out.push_str(rest);
    out
}
