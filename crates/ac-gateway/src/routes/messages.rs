// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /agentic-sessions/:name/messages` — appends a user message to the
//! session inbox via the content adapter, authored with the caller's own
//! token. Idempotent by `key`: a retried request with the same key lands
//! on the same inbox file instead of duplicating it.

use crate::auth::{extract_bearer_token, require_access};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub body: serde_json::Value,
    /// Client-supplied idempotency key. Re-submitting the same key writes
    /// the same inbox file exactly once, so the caller can safely retry a
    /// dropped response.
    pub key: String,
}

pub async fn post(
    State(state): State<AppState>,
    Path((project, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.key.trim().is_empty() {
        return Err(ApiError::InvalidInput("key must not be empty".to_string()));
    }

    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "update", "agenticsessions", &project).await?;

    let session = cluster.get_session(&project, &name).await?;
    let state_dir = session.status.as_ref().and_then(|s| s.state_dir.clone()).ok_or_else(|| ApiError::InvalidInput("session has no stateDir yet".to_string()))?;
    let bytes = serde_json::to_vec(&req.body).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let path =
        ac_channel::write_inbox_message(state.content.as_ref(), &token, &project, &state_dir, &session.spec.paths.inbox, &req.key, bytes).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "path": path }))))
}
