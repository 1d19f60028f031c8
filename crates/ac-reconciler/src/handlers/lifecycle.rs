// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop requests and session-level timeout enforcement. Both delete the
//! owned Job and leave state behind; only the terminal phase and message
//! differ.

use crate::error::ReconcileError;
use crate::state::ReconcilerState;
use ac_core::{AgenticSession, Phase, STOP_REQUESTED_AT_ANNOTATION};

pub fn stop_requested(session: &AgenticSession) -> bool {
    session.metadata.annotations.as_ref().and_then(|a| a.get(STOP_REQUESTED_AT_ANNOTATION)).is_some()
}

pub async fn stop(state: &ReconcilerState, namespace: &str, session: &AgenticSession) -> Result<AgenticSession, ReconcileError> {
    let name = session.metadata.name.clone().unwrap_or_default();
    if let Some(job_name) = session.status.as_ref().and_then(|s| s.job_name.as_deref()) {
        state.platform.delete_job(namespace, job_name).await?;
    }
    let mut status = session.status.clone().unwrap_or_default();
    status.phase = Some(Phase::Stopped);
    status.completion_time = Some(chrono::Utc::now().to_rfc3339());
    Ok(state.platform.update_session_status(namespace, &name, &status).await?)
}

/// `true` once `now - startTime > spec.timeout` for a `Running` session.
fn timed_out(session: &AgenticSession) -> bool {
    let Some(status) = session.status.as_ref() else { return false };
    if status.phase != Some(Phase::Running) {
        return false;
    }
    let Some(start) = status.start_time.as_deref().and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok()) else {
        return false;
    };
    let elapsed = chrono::Utc::now().signed_duration_since(start).num_seconds();
    elapsed > session.spec.timeout
}

pub async fn enforce_timeout(state: &ReconcilerState, namespace: &str, session: &AgenticSession) -> Result<Option<AgenticSession>, ReconcileError> {
    if !timed_out(session) {
        return Ok(None);
    }
    let name = session.metadata.name.clone().unwrap_or_default();
    if let Some(job_name) = session.status.as_ref().and_then(|s| s.job_name.as_deref()) {
        state.platform.delete_job(namespace, job_name).await?;
    }
    let mut status = session.status.clone().unwrap_or_default();
    status.phase = Some(Phase::Failed);
    status.completion_time = Some(chrono::Utc::now().to_rfc3339());
    status.message = Some("timeout".to_string());
    Ok(Some(state.platform.update_session_status(namespace, &name, &status).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ObjectMeta;
    use std::collections::BTreeMap;

    fn session() -> AgenticSession {
        let spec = ac_core::AgenticSessionSpec {
            prompt: "x".into(),
            interactive: false,
            display_name: None,
            timeout: 1800,
            project: "demo".into(),
            llm_settings: None,
            repos: vec![],
            main_repo_index: 0,
            user_context: ac_core::UserContext::default(),
            bot_account: None,
            resource_overrides: ac_core::ResourceOverrides::default(),
            environment_variables: BTreeMap::new(),
            paths: ac_core::PathsConfig::default(),
            active_workflow: None,
        };
        AgenticSession { metadata: ObjectMeta { name: Some("s1".to_string()), ..Default::default() }, spec, status: None }
    }

    #[test]
    fn stop_requested_reads_the_annotation() {
        let mut session = session();
        assert!(!stop_requested(&session));
        let mut annotations = BTreeMap::new();
        annotations.insert(STOP_REQUESTED_AT_ANNOTATION.to_string(), "2026-01-01T00:00:00Z".to_string());
        session.metadata.annotations = Some(annotations);
        assert!(stop_requested(&session));
    }
}
