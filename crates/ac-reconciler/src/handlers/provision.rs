// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! *Pending → Creating* and *Stopped → Creating* (resume): both provision a
//! fresh Job for the session, so they share this one code path — validate
//! inputs, mint what the job needs, build it, create it, record the outcome
//! on the owning object.

use crate::error::ReconcileError;
use crate::state::{ReconcilerState, RUNNER_SERVICE_ACCOUNT};
use ac_core::{AgenticSession, AgenticSessionStatus, Phase};
use ac_jobfactory::{build_session_resources, JobFactoryParams, JobOwner, RunnerSecrets};
use kube::ResourceExt;

const SESSION_API_VERSION: &str = "vteam.ambient-code/v1alpha1";
const SESSION_KIND: &str = "AgenticSession";

/// Runs provisioning and writes the resulting status in one pass. Returns
/// the updated session on success; on a missing-secret or fatal failure,
/// writes `phase=Error` itself and returns `Ok` (the caller does not need
/// to write status again) so non-recoverable failures never requeue.
pub async fn provision(state: &ReconcilerState, namespace: &str, session: &AgenticSession) -> Result<AgenticSession, ReconcileError> {
    let name = session.name_any();
    let uid = session.uid().unwrap_or_default();

    let settings = state.platform.get_project_settings(namespace).await?;
    if state.platform.get_secret(namespace, &settings.runner_secrets_name).await.is_err() {
        return Ok(mark_error(state, namespace, &name, format!("required secret {} not found", settings.runner_secrets_name)).await?);
    }

    let storage_class = session.spec.resource_overrides.storage_class.as_deref();
    state.platform.ensure_workspace_pvc(namespace, ac_cluster::WORKSPACE_PVC_NAME, storage_class).await?;

    let runner_token = state.platform.create_token(namespace, RUNNER_SERVICE_ACCOUNT, state.config.runner_token_ttl_secs).await?;
    let session_secret_name = ac_jobfactory::secret_name(&name);

    let owner = JobOwner { api_version: SESSION_API_VERSION, kind: SESSION_KIND, name: &name, uid: &uid };
    let params = JobFactoryParams {
        session_name: &name,
        namespace,
        spec: &session.spec,
        runner_image: &state.config.runner_image,
        state_base_dir: &state.config.state_base_dir,
        content_service_base: &state.config.content_service_base,
        runner_token: &runner_token,
        secrets: RunnerSecrets { session_secret_name, project_secret_name: settings.runner_secrets_name.clone() },
        owner,
        default_resource_profile: &settings.default_resource_profile,
    };
    let resources = build_session_resources(&params);

    match state.platform.create_config_map(namespace, &resources.config_map).await {
        Ok(()) | Err(ac_cluster::ClusterError::Conflict(_)) => {}
        Err(e) => return Err(e.into()),
    }
    match state.platform.create_secret(namespace, &resources.secret).await {
        Ok(()) | Err(ac_cluster::ClusterError::Conflict(_)) => {}
        Err(e) => return Err(e.into()),
    }
    let created_job = state.platform.create_job(namespace, &resources.job).await?;

    if let Some(existing_owner) = created_job.metadata.owner_references.as_ref().and_then(|refs| refs.first()) {
        if existing_owner.uid != uid {
            return Ok(mark_error(state, namespace, &name, "job already exists with a different owner".to_string()).await?);
        }
    }

    let state_dir = format!("{}/{}", state.config.state_base_dir, name);
    let was_stopped = session.status.as_ref().and_then(|s| s.phase) == Some(Phase::Stopped);
    let previous_resume_count = session.status.as_ref().map(|s| s.resume_count).unwrap_or_default();
    let status = AgenticSessionStatus {
        phase: Some(Phase::Creating),
        message: None,
        start_time: Some(chrono::Utc::now().to_rfc3339()),
        completion_time: None,
        job_name: created_job.metadata.name.clone(),
        state_dir: Some(state_dir),
        repo_statuses: Vec::new(),
        result: None,
        resume_count: if was_stopped { previous_resume_count + 1 } else { previous_resume_count },
    };
    Ok(state.platform.update_session_status(namespace, &name, &status).await?)
}

async fn mark_error(state: &ReconcilerState, namespace: &str, name: &str, message: String) -> Result<AgenticSession, ReconcileError> {
    let mut status = state.platform.get_session(namespace, name).await?.status.unwrap_or_default();
    status.phase = Some(Phase::Error);
    status.message = Some(message);
    Ok(state.platform.update_session_status(namespace, name, &status).await?)
}
