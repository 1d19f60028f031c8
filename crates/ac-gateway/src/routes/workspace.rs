// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET/POST /agentic-sessions/:name/workspace/*path` — proxies to the
//! content adapter using the caller's own token.

use crate::auth::{extract_bearer_token, require_access};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

fn session_relative_path(state_dir: &str, sub_path: &str) -> String {
    format!("{}/{}", state_dir.trim_end_matches('/'), sub_path.trim_start_matches('/'))
}

async fn resolve_state_dir(state: &AppState, token: &str, project: &str, name: &str) -> Result<String, ApiError> {
    let cluster = state.user_clients.for_token(token).await?;
    require_access(cluster.as_ref(), &state.access_cache, token, "get", "agenticsessions", project).await?;
    let session = cluster.get_session(project, name).await?;
    session.status.and_then(|s| s.state_dir).ok_or_else(|| ApiError::NotFound)
}

pub async fn get(
    State(state): State<AppState>,
    Path((project, name, sub_path)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let state_dir = resolve_state_dir(&state, &token, &project, &name).await?;
    let path = session_relative_path(&state_dir, &sub_path);

    if sub_path.ends_with('/') || sub_path.is_empty() {
        let entries = state.content.list(&token, &project, &path).await?;
        Ok(Json(serde_json::to_value(entries).unwrap_or_default()))
    } else {
        let bytes = state.content.read(&token, &project, &path).await?;
        Ok(Json(serde_json::Value::String(String::from_utf8_lossy(&bytes).to_string())))
    }
}

pub async fn post(
    State(state): State<AppState>,
    Path((project, name, sub_path)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let state_dir = resolve_state_dir(&state, &token, &project, &name).await?;
    let path = session_relative_path(&state_dir, &sub_path);
    state.content.write(&token, &project, &path, body.to_vec()).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_state_dir_and_sub_path() {
        assert_eq!(session_relative_path("/state/s1", "workspace/a.txt"), "/state/s1/workspace/a.txt");
        assert_eq!(session_relative_path("/state/s1/", "/workspace/a.txt"), "/state/s1/workspace/a.txt");
    }
}
