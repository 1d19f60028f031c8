// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WS /agentic-sessions/:name/stream?fromOffset=<n>` — opens the Live
//! Channel. Replays stored envelopes from `fromOffset` via a single content
//! read, then switches to live delivery from the hub.

use crate::auth::{extract_bearer_token, require_access};
use crate::error::ApiError;
use crate::state::AppState;
use ac_channel::SubscriberMessage;
use ac_core::Envelope;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

const CLOSE_POLICY_VIOLATION: u16 = 1008;

#[derive(Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "fromOffset")]
    pub from_offset: Option<u64>,
}

pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((project, name)): Path<(String, String)>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let cluster = state.user_clients.for_token(&token).await?;
    require_access(cluster.as_ref(), &state.access_cache, &token, "get", "agenticsessions", &project).await?;
    let session = cluster.get_session(&project, &name).await?;
    let state_dir = session.status.as_ref().and_then(|s| s.state_dir.clone()).ok_or(ApiError::NotFound)?;
    let messages_path = format!("{}/{}", state_dir.trim_end_matches('/'), session.spec.paths.messages);

    let bytes = match state.content.read(&token, &project, &messages_path).await {
        Ok(b) => b,
        Err(e) if e.kind() == ac_core::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let tail_start = bytes.len() as u64;
    let replay = match query.from_offset {
        Some(from_offset) => replay_from(&bytes, from_offset),
        None => Vec::new(),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, project, name, token, messages_path, tail_start, replay)))
}

/// Parses already-fetched bytes into the envelopes at or past `from_offset`.
/// Pure and IO-free so the same read backing the live tailer's start point
/// also serves this connection's replay, with no risk of the two diverging.
fn replay_from(bytes: &[u8], from_offset: u64) -> Vec<Envelope> {
    let text = String::from_utf8_lossy(bytes);
    let mut offset = 0u64;
    let mut envelopes = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() {
            continue;
        }
        let line_len = line.as_bytes().len() as u64 + 1;
        let end_offset = offset + line_len;
        if offset >= from_offset {
            if let Ok(mut envelope) = serde_json::from_str::<Envelope>(line) {
                envelope.seq = end_offset;
                envelopes.push(envelope);
            }
        }
        offset = end_offset;
    }
    envelopes
}

#[allow(clippy::too_many_arguments)]
async fn handle_socket(
    mut socket: WebSocket,
    state: AppState,
    project: String,
    name: String,
    token: String,
    messages_path: String,
    tail_start: u64,
    replay: Vec<Envelope>,
) {
    for envelope in replay {
        if let Ok(json) = serde_json::to_string(&envelope) {
            if socket.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
    }

    let hub_for_tailer = state.channels.clone();
    let content = state.content.clone();
    let grace = state.config.tailer_grace;
    let (tailer_namespace, tailer_name, tailer_path) = (project.clone(), name.clone(), messages_path.clone());
    let channel = state.channels.get_or_start(&project, &name, move || {
        tokio::spawn(ac_channel::run_tailer(hub_for_tailer, content, token, tailer_namespace, tailer_name, tailer_path, tail_start, || false, grace))
    });
    let mut rx = ac_channel::spawn_subscriber(channel, state.config.subscriber_queue_depth);

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Some(SubscriberMessage::Envelope(envelope)) => {
                        let Ok(json) = serde_json::to_string(&envelope) else { continue };
                        if socket.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(SubscriberMessage::Overflowed) => {
                        let _ = socket.send(Message::Close(Some(CloseFrame {
                            code: CLOSE_POLICY_VIOLATION,
                            reason: "subscriber overflowed its queue".into(),
                        }))).await;
                        break;
                    }
                    None => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Inbound WS frames are written through the same
                        // inbox path as POST /messages; handled by the
                        // caller that owns state_dir resolution, not here,
                        // since the socket carries no state_dir of its own.
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }
}
