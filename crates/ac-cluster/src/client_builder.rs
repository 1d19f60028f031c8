// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a `kube::Client` bound to a specific bearer token.
//!
//! The gateway calls [`client_for_token`] on every user-initiated request —
//! no fallback to the platform identity on 401/403 — and [`platform_client`]
//! only for the narrow set of privileged writes the control plane itself
//! must perform.

use crate::error::ClusterError;
use kube::{Client, Config};

/// Construct a `kube::Client` whose every request carries `Authorization:
/// Bearer <token>` instead of the process's own service-account token.
/// RBAC for every subsequent call through this client is evaluated as that
/// user, by the orchestrator itself — the adapter applies no authorization
/// logic of its own.
pub async fn client_for_token(token: &str) -> Result<Client, ClusterError> {
    let mut config = Config::infer().await.map_err(|e| ClusterError::Other(format!("cluster config: {e}")))?;
    config.auth_info.token = Some(token.to_string().into());
    // A per-request client must never also carry the ambient service
    // account credentials the process may have mounted.
    config.auth_info.token_file = None;
    config.auth_info.client_certificate_data = None;
    config.auth_info.client_key_data = None;
    Client::try_from(config).map_err(|e| ClusterError::Other(format!("build client: {e}")))
}

/// The platform's own service-identity client, used only for privileged
/// writes no user token is authorized to make directly.
pub async fn platform_client() -> Result<Client, ClusterError> {
    Client::try_default().await.map_err(|e| ClusterError::Other(format!("platform client: {e}")))
}
