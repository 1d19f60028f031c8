// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/projects/:project/agentic-sessions`.

use crate::auth::{extract_bearer_token, require_access};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{validate_session_name, validate_session_spec};
use ac_core::{AgenticSession, AgenticSessionSpec, UserContext, STOP_REQUESTED_AT_ANNOTATION};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http::StatusCode};
use kube::core::ObjectMeta;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(flatten)]
    pub spec: AgenticSessionSpec,
}

pub async fn create(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    validate_session_name(&req.name)?;
    validate_session_spec(&req.spec)?;
    require_access(state.user_clients.for_token(&token).await?.as_ref(), &state.access_cache, &token, "create", "agenticsessions", &project).await?;

    let user = crate::auth::resolve_user(state.user_clients.for_token(&token).await?.as_ref()).await?;

    let mut spec = req.spec;
    spec.project = project.clone();
    spec.user_context = UserContext { user_id: user.user_id, display_name: None, groups: user.groups };

    let session = AgenticSession { metadata: ObjectMeta { name: Some(req.name), ..Default::default() }, spec, status: None };
    // Persisted with the platform identity after validation: the user may
    // lack `create jobs`/status-subresource rights the reconciler needs
    // later, but their own access review has already run.
    let created = state.platform.create_session(&project, &session).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>, Path(project): Path<String>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "list", "agenticsessions", &project).await?;
    let sessions = cluster.list_sessions(&project).await?;
    Ok(Json(sessions))
}

pub async fn get(State(state): State<AppState>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "get", "agenticsessions", &project).await?;
    let session = cluster.get_session(&project, &name).await?;
    Ok(Json(session))
}

pub async fn delete(State(state): State<AppState>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "delete", "agenticsessions", &project).await?;
    cluster.delete_session(&project, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop(State(state): State<AppState>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "update", "agenticsessions", &project).await?;
    let now = chrono::Utc::now().to_rfc3339();
    let patch = serde_json::json!({ "metadata": { "annotations": { STOP_REQUESTED_AT_ANNOTATION: now } } });
    let session = cluster.patch_session(&project, &name, patch).await?;
    Ok(Json(session))
}

pub async fn resume(State(state): State<AppState>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "update", "agenticsessions", &project).await?;

    let existing = cluster.get_session(&project, &name).await?;
    let phase = existing.status.as_ref().and_then(|s| s.phase);
    if phase != Some(ac_core::Phase::Stopped) {
        return Err(ApiError::InvalidInput("resume is only valid from the Stopped phase".to_string()));
    }
    let patch = serde_json::json!({ "metadata": { "annotations": { STOP_REQUESTED_AT_ANNOTATION: serde_json::Value::Null } } });
    let session = cluster.patch_session(&project, &name, patch).await?;
    Ok(Json(session))
}
