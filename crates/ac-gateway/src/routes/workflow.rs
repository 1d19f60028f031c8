// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /agentic-sessions/:name/workflow` — writes `activeWorkflow`, the
//! only spec field mutable after creation; the reconciler observes it and
//! drives the workflow-swap transition.

use crate::auth::{extract_bearer_token, require_access};
use crate::error::ApiError;
use crate::state::AppState;
use ac_core::ActiveWorkflow;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

pub async fn post(
    State(state): State<AppState>,
    Path((project, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(workflow): Json<ActiveWorkflow>,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "update", "agenticsessions", &project).await?;
    let patch = serde_json::json!({ "spec": { "activeWorkflow": workflow } });
    let session = cluster.patch_session(&project, &name, patch).await?;
    Ok(Json(session))
}
