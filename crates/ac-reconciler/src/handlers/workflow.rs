// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow-swap: the reconciler's reaction to `spec.activeWorkflow`
//! changing while a session is `Running`. No Job restart — the runner
//! watches its own inbox and clones the new workflow in place. This
//! handler only decides *whether* to write, using [`WorkflowTracker`] to
//! do it once per fingerprint.

use crate::error::ReconcileError;
use crate::key::SessionKey;
use crate::state::ReconcilerState;
use ac_core::{AgenticSession, Phase};

const INBOX_WORKFLOW_SWAP_TOKEN_TTL_SECS: i64 = 60;

/// Writes an inbox record for the session's current `activeWorkflow` if it
/// hasn't already been acted on. No-op outside `Running` and when
/// `activeWorkflow` is unset.
pub async fn sync_workflow(state: &ReconcilerState, namespace: &str, session: &AgenticSession) -> Result<(), ReconcileError> {
    let Some(status) = session.status.as_ref() else { return Ok(()) };
    if status.phase != Some(Phase::Running) {
        return Ok(());
    }
    let Some(workflow) = session.spec.active_workflow.as_ref() else { return Ok(()) };
    let Some(state_dir) = status.state_dir.as_deref() else { return Ok(()) };

    let name = session.metadata.name.clone().unwrap_or_default();
    let key = SessionKey::new(namespace, &name);
    if !state.workflows.observe(&key, workflow) {
        return Ok(());
    }

    let token = state
        .platform
        .create_token(namespace, crate::state::RUNNER_SERVICE_ACCOUNT, INBOX_WORKFLOW_SWAP_TOKEN_TTL_SECS)
        .await?;
    let body = serde_json::to_vec(&serde_json::json!({ "type": "workflow.swap", "workflow": workflow }))
        .map_err(|e| ReconcileError::Fatal(format!("failed to encode workflow swap: {e}")))?;
    // Derived from the workflow itself, not minted per call, so a reconcile
    // retry after a crash lands on the same inbox entry instead of a new one.
    let inbox_key = format!("workflow-swap-{}-{}", workflow.branch, workflow.path);
    ac_channel::write_inbox_message(state.content.as_ref(), &token, namespace, state_dir, &session.spec.paths.inbox, &inbox_key, body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_cluster::FakeClusterAdapter;
    use ac_content::FakeContentAdapter;
    use ac_core::{ActiveWorkflow, AgenticSessionStatus};
    use kube::core::ObjectMeta;
    use std::sync::Arc;

    fn session_with(phase: Option<Phase>, workflow: Option<ActiveWorkflow>) -> AgenticSession {
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
            environment_variables: Default::default(),
            paths: ac_core::PathsConfig::default(),
            active_workflow: workflow,
        };
        let status = AgenticSessionStatus { phase, state_dir: Some("/state/s1".to_string()), ..Default::default() };
        AgenticSession { metadata: ObjectMeta { name: Some("s1".to_string()), ..Default::default() }, spec, status: Some(status) }
    }

    fn state() -> ReconcilerState {
        ReconcilerState::new(
            Arc::new(FakeClusterAdapter::new()),
            Arc::new(FakeContentAdapter::new()),
            crate::state::ReconcilerConfig {
                runner_image: "runner:latest".into(),
                state_base_dir: "/state".into(),
                content_service_base: "http://content".into(),
                runner_token_ttl_secs: 300,
                backoff_failure_window: std::time::Duration::from_secs(300),
                workers: 1,
            },
        )
    }

    #[tokio::test]
    async fn ignores_non_running_sessions() {
        let state = state();
        let workflow = ActiveWorkflow { git_url: "https://example.com/wf.git".into(), branch: "main".into(), path: "a".into() };
        let session = session_with(Some(Phase::Creating), Some(workflow));
        sync_workflow(&state, "demo", &session).await.unwrap();
    }

    #[tokio::test]
    async fn writes_once_per_fingerprint() {
        let state = state();
        let workflow = ActiveWorkflow { git_url: "https://example.com/wf.git".into(), branch: "main".into(), path: "a".into() };
        let session = session_with(Some(Phase::Running), Some(workflow.clone()));

        sync_workflow(&state, "demo", &session).await.unwrap();
        sync_workflow(&state, "demo", &session).await.unwrap();

        let key = SessionKey::new("demo", "s1");
        assert!(!state.workflows.observe(&key, &workflow));
    }
}
