// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reconcile_once`: the single entry point a worker calls for one popped
//! [`SessionKey`]. Re-reads the whole object, then dispatches on its
//! current phase — no handler here trusts anything it saw on a previous
//! pass.

use crate::error::ReconcileError;
use crate::handlers::{lifecycle, monitor, provision, workflow};
use crate::key::SessionKey;
use crate::state::ReconcilerState;
use ac_core::Phase;

pub async fn reconcile_once(state: &ReconcilerState, key: &SessionKey) -> Result<(), ReconcileError> {
    let session = match state.platform.get_session(&key.namespace, &key.name).await {
        Ok(session) => session,
        Err(ac_cluster::ClusterError::NotFound(_)) => {
            state.workflows.forget(key);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let phase = session.status.as_ref().and_then(|s| s.phase);
    if phase.map(Phase::is_terminal).unwrap_or(false) {
        state.workflows.forget(key);
        return Ok(());
    }

    if lifecycle::stop_requested(&session) && phase != Some(Phase::Stopped) {
        lifecycle::stop(state, &key.namespace, &session).await?;
        return Ok(());
    }

    match phase {
        None | Some(Phase::Pending) => {
            provision::provision(state, &key.namespace, &session).await?;
        }
        Some(Phase::Stopped) => {
            if !lifecycle::stop_requested(&session) {
                provision::provision(state, &key.namespace, &session).await?;
            }
        }
        Some(Phase::Creating) => {
            monitor::monitor(state, &key.namespace, &session).await?;
        }
        Some(Phase::Running) => {
            if lifecycle::enforce_timeout(state, &key.namespace, &session).await?.is_some() {
                return Ok(());
            }
            if let Err(e) = workflow::sync_workflow(state, &key.namespace, &session).await {
                tracing::warn!(session = %key, error = %e, "workflow swap inbox write failed, will retry next pass");
            }
            monitor::monitor(state, &key.namespace, &session).await?;
        }
        Some(Phase::Completed) | Some(Phase::Failed) | Some(Phase::Error) => {
            // Caught by the is_terminal() check above; unreachable.
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_cluster::{ClusterAdapter, FakeClusterAdapter};
    use ac_content::FakeContentAdapter;
    use ac_core::{AgenticSession, AgenticSessionSpec, AgenticSessionStatus, PathsConfig, ProjectSettingsSpec, ResourceOverrides, UserContext};
    use kube::core::ObjectMeta;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn spec() -> AgenticSessionSpec {
        AgenticSessionSpec {
            prompt: "hi".into(),
            interactive: false,
            display_name: None,
            timeout: 1800,
            project: "demo".into(),
            llm_settings: None,
            repos: vec![],
            main_repo_index: 0,
            user_context: UserContext::default(),
            bot_account: None,
            resource_overrides: ResourceOverrides::default(),
            environment_variables: BTreeMap::new(),
            paths: PathsConfig::default(),
            active_workflow: None,
        }
    }

    fn state_with(fake: FakeClusterAdapter) -> ReconcilerState {
        ReconcilerState::new(
            Arc::new(fake),
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
    async fn missing_session_is_treated_as_deleted() {
        let state = state_with(FakeClusterAdapter::new());
        let key = SessionKey::new("demo", "gone");
        reconcile_once(&state, &key).await.unwrap();
    }

    #[tokio::test]
    async fn pending_session_provisions() {
        let fake = FakeClusterAdapter::new();
        fake.seed_project_settings(
            "demo",
            ProjectSettingsSpec { group_access: vec![], runner_secrets_name: "runner-secrets".to_string(), default_resource_profile: Default::default() },
        );
        fake.seed_secret("demo", "runner-secrets", k8s_openapi::api::core::v1::Secret::default());
        let session = AgenticSession { metadata: ObjectMeta { name: Some("s1".to_string()), ..Default::default() }, spec: spec(), status: None };
        fake.create_session("demo", &session).await.unwrap();
        let key = SessionKey::new("demo", "s1");

        let state = state_with(fake.clone());
        reconcile_once(&state, &key).await.unwrap();

        let updated = fake.get_session("demo", "s1").await.unwrap();
        assert_eq!(updated.status.unwrap().phase, Some(Phase::Creating));
    }

    #[tokio::test]
    async fn terminal_session_is_left_alone() {
        let fake = FakeClusterAdapter::new();
        let status = AgenticSessionStatus { phase: Some(Phase::Completed), ..Default::default() };
        let session = AgenticSession { metadata: ObjectMeta { name: Some("s1".to_string()), ..Default::default() }, spec: spec(), status: Some(status) };
        fake.create_session("demo", &session).await.unwrap();
        let key = SessionKey::new("demo", "s1");

        let state = state_with(fake.clone());
        reconcile_once(&state, &key).await.unwrap();

        let updated = fake.get_session("demo", "s1").await.unwrap();
        assert_eq!(updated.status.unwrap().phase, Some(Phase::Completed));
    }

    #[tokio::test]
    async fn stop_requested_wins_over_running_monitor() {
        let fake = FakeClusterAdapter::new();
        let status = AgenticSessionStatus { phase: Some(Phase::Running), job_name: Some("job-s1".to_string()), ..Default::default() };
        let mut annotations = BTreeMap::new();
        annotations.insert(ac_core::STOP_REQUESTED_AT_ANNOTATION.to_string(), "2026-01-01T00:00:00Z".to_string());
        let session = AgenticSession {
            metadata: ObjectMeta { name: Some("s1".to_string()), annotations: Some(annotations), ..Default::default() },
            spec: spec(),
            status: Some(status),
        };
        fake.create_session("demo", &session).await.unwrap();
        let key = SessionKey::new("demo", "s1");

        let state = state_with(fake.clone());
        reconcile_once(&state, &key).await.unwrap();

        let updated = fake.get_session("demo", "s1").await.unwrap();
        assert_eq!(updated.status.unwrap().phase, Some(Phase::Stopped));
    }
}
