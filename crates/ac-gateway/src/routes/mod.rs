// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table, mounted under `/api/projects/:project`.

pub mod messages;
pub mod sessions;
pub mod stream;
pub mod workflow;
pub mod workspace;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Routes are relative to `/api/projects/:project`; the caller nests this
/// under that prefix so `:project` reaches every handler's `Path` extractor.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/agentic-sessions", get(sessions::list).post(sessions::create))
        .route("/agentic-sessions/:name", get(sessions::get).delete(sessions::delete))
        .route("/agentic-sessions/:name/stop", post(sessions::stop))
        .route("/agentic-sessions/:name/resume", post(sessions::resume))
        .route("/agentic-sessions/:name/workflow", post(workflow::post))
        .route("/agentic-sessions/:name/messages", post(messages::post))
        .route("/agentic-sessions/:name/stream", get(stream::upgrade))
        .route("/agentic-sessions/:name/workspace/*path", get(workspace::get).post(workspace::post))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
