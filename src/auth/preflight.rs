// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! SSH key pre-flight check.
//!
//! ```text
//! key file --(russh-keys)--> KeyPair
//!                              |
//!      russh::client::connect(host:22) --> authenticate_publickey("git")
//!                              |
//!                      accepted / rejected / timeout
//! ```
//!
//! The handshake only proves that the server accepts the key. Host keys are
//! not verified here; the real transport is the user's ssh.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AuthError, BackupResult};

/// Well-known hosting endpoint used when none is configured.
pub const DEFAULT_HOST: &str = "github.com";

/// Port of the ssh service.
pub const SSH_PORT: u16 = 22;

/// User every git hosting service expects.
const SSH_USER: &str = "git";

/// Give up on the handshake after this long.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct PreflightClient;

#[async_trait::async_trait]
impl russh::client::Handler for PreflightClient {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Rejects public-key files by extension.
///
/// # Errors
///
/// Returns `AuthError::PublicKeyFile` if `key_path` ends in `.pub`.
pub fn ensure_private_key(key_path: &Path) -> BackupResult<()> {
    if key_path.extension().is_some_and(|ext| ext == "pub") {
        return Err(AuthError::PublicKeyFile {
            path: key_path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Authenticate to `host` as `git` with the private key at `key_path`.
///
/// # Errors
///
/// Returns an `AuthError` if the file is a public key, cannot be decoded,
/// the connection fails or times out, or the server rejects the key.
pub async fn check_ssh_key(key_path: &Path, host: &str) -> BackupResult<()> {
    ensure_private_key(key_path)?;

    let key = russh_keys::load_secret_key(key_path, None).map_err(|e| AuthError::KeyLoad {
        path: key_path.display().to_string(),
        message: e.to_string(),
    })?;
    debug!(key = %key_path.display(), host, "starting ssh handshake");

    let handshake = async {
        let config = Arc::new(russh::client::Config::default());
        let mut session = russh::client::connect(config, (host, SSH_PORT), PreflightClient)
            .await
            .map_err(|e| connect_error(host, &e))?;
        let accepted = session
            .authenticate_publickey(SSH_USER, Arc::new(key))
            .await
            .map_err(|e| connect_error(host, &e))?;
        // Disconnect errors do not change the verdict.
        let _ = session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await;
        Ok::<bool, AuthError>(accepted)
    };

    let accepted = tokio::time::timeout(CONNECT_TIMEOUT, handshake)
        .await
        .map_err(|_| AuthError::Timeout {
            host: host.to_string(),
            timeout_secs: CONNECT_TIMEOUT.as_secs(),
        })??;

    if !accepted {
        return Err(AuthError::Rejected {
            host: host.to_string(),
            path: key_path.display().to_string(),
        }
        .into());
    }
    info!(key = %key_path.display(), host, "ssh key accepted");
    Ok(())
}

fn connect_error(host: &str, err: &russh::Error) -> AuthError {
    AuthError::Connect {
        host: host.to_string(),
        message: err.to_string(),
    }
}
