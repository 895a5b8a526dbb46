// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::backup::{parse_answer, render_event, select_policy};
use super::check_ssh::resolve_key;
use crate::backup::{BackupEvent, Stage};
use crate::cli::backup::CheckSshArgs;
use crate::config::Config;
use crate::config::types::ForcePolicy;
use crate::publish::push::{ForceDecision, PushFailure};
use std::path::PathBuf;

fn failure() -> PushFailure {
    PushFailure {
        attempt: 1,
        remote: "origin".to_string(),
        branch: "main".to_string(),
        message: "rejected".to_string(),
    }
}

#[test]
fn test_parse_answer() {
    assert_eq!(parse_answer("y\n"), ForceDecision::Force);
    assert_eq!(parse_answer("  YES "), ForceDecision::Force);
    assert_eq!(parse_answer("\n"), ForceDecision::Decline);
    assert_eq!(parse_answer("no"), ForceDecision::Decline);
    assert_eq!(parse_answer("yep"), ForceDecision::Decline);
}

#[test]
fn test_select_policy_headless() {
    assert_eq!(
        select_policy(ForcePolicy::Ask, false).decide(&failure()),
        ForceDecision::Decline
    );
    assert_eq!(
        select_policy(ForcePolicy::Always, false).decide(&failure()),
        ForceDecision::Force
    );
    assert_eq!(
        select_policy(ForcePolicy::Never, true).decide(&failure()),
        ForceDecision::Decline
    );
}

#[test]
fn test_render_event() {
    assert_eq!(
        render_event(&BackupEvent::StageStarted(Stage::Publish)).as_deref(),
        Some("==> publish")
    );
    assert_eq!(
        render_event(&BackupEvent::Warning("submodule 'x' skipped".into())).as_deref(),
        Some("warning: submodule 'x' skipped")
    );
}

#[test]
fn test_resolve_key_prefers_flag() {
    let mut config = Config::default();
    config.auth.key_path = Some(PathBuf::from("/config/key"));

    let args = CheckSshArgs {
        key: Some(PathBuf::from("/flag/key")),
        host: None,
    };
    assert_eq!(resolve_key(&args, &config).unwrap(), PathBuf::from("/flag/key"));
    assert_eq!(
        resolve_key(&CheckSshArgs::default(), &config).unwrap(),
        PathBuf::from("/config/key")
    );
}
