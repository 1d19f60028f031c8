// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion ingestion: reads `status.json` out of the session's state
//! directory through the content adapter and folds it into the terminal
//! status update. A read failure is not fatal — the session still
//! completes, with an empty result and a warning, rather than re-running.

use crate::error::ReconcileError;
use crate::state::{ReconcilerState, RUNNER_SERVICE_ACCOUNT};
use ac_core::{AgenticSession, AgenticSessionStatus, Phase, ResultSummary};

const STATUS_JSON_READ_TOKEN_TTL_SECS: i64 = 60;

pub async fn ingest_completion(
    state: &ReconcilerState,
    namespace: &str,
    name: &str,
    current: &AgenticSessionStatus,
    terminal_phase: Phase,
) -> Result<AgenticSession, ReconcileError> {
    let mut status = current.clone();
    status.phase = Some(terminal_phase);
    status.completion_time = Some(chrono::Utc::now().to_rfc3339());

    if let Some(state_dir) = current.state_dir.as_deref() {
        match read_result_summary(state, namespace, state_dir).await {
            Ok(result) => status.result = Some(result),
            Err(e) => {
                tracing::warn!(session = name, error = %e, "failed to read status.json, completing with empty result");
                status.message = Some("result summary unavailable".to_string());
                status.result = Some(ResultSummary::default());
            }
        }
    }

    Ok(state.platform.update_session_status(namespace, name, &status).await?)
}

async fn read_result_summary(state: &ReconcilerState, namespace: &str, state_dir: &str) -> Result<ResultSummary, ReconcileError> {
    let token = state.platform.create_token(namespace, RUNNER_SERVICE_ACCOUNT, STATUS_JSON_READ_TOKEN_TTL_SECS).await?;
    let path = format!("{}/status.json", state_dir.trim_end_matches('/'));
    let bytes = state.content.read(&token, namespace, &path).await?;
    serde_json::from_slice(&bytes).map_err(|e| ReconcileError::Fatal(format!("malformed status.json: {e}")))
}
