// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! *Creating* and *Running* monitoring: translates the owned Job's status
//! into phase transitions. No per-session Pod watcher is held open here —
//! each reconcile pass re-reads the Job's current status rather than
//! trusting anything cached from a previous pass.

use crate::error::ReconcileError;
use crate::handlers::completion::ingest_completion;
use crate::state::ReconcilerState;
use ac_core::{AgenticSession, Phase};
use k8s_openapi::api::batch::v1::JobStatus;
use std::time::Duration;

fn job_is_stuck(status: &JobStatus, threshold: Duration) -> bool {
    let Some(start_time) = status.start_time.as_ref() else { return false };
    let active = status.active.unwrap_or(0);
    let failed = status.failed.unwrap_or(0);
    if active > 0 || failed > 0 {
        return false;
    }
    let elapsed = chrono::Utc::now().signed_duration_since(start_time.0).to_std().unwrap_or_default();
    elapsed > threshold
}

pub async fn monitor(state: &ReconcilerState, namespace: &str, session: &AgenticSession) -> Result<Option<AgenticSession>, ReconcileError> {
    let name = session.metadata.name.clone().unwrap_or_default();
    let current_status = session.status.clone().unwrap_or_default();
    let Some(phase) = current_status.phase else { return Ok(None) };

    let Some(job_name) = current_status.job_name.as_deref() else { return Ok(None) };
    let Some(job) = state.platform.get_job(namespace, job_name).await? else {
        return Ok(Some(mark_error(state, namespace, &name, "owned job disappeared".to_string()).await?));
    };
    let Some(job_status) = job.status else { return Ok(None) };

    match phase {
        Phase::Creating => {
            if job_status.succeeded.unwrap_or(0) > 0 || job_status.active.unwrap_or(0) > 0 {
                let mut status = current_status;
                status.phase = Some(Phase::Running);
                return Ok(Some(state.platform.update_session_status(namespace, &name, &status).await?));
            }
            if job_status.failed.unwrap_or(0) > 0 {
                let mut status = current_status;
                status.phase = Some(Phase::Failed);
                status.completion_time = Some(chrono::Utc::now().to_rfc3339());
                status.message = Some("job backoff limit exceeded before the runner reported running".to_string());
                return Ok(Some(state.platform.update_session_status(namespace, &name, &status).await?));
            }
            if job_is_stuck(&job_status, state.config.backoff_failure_window) {
                let mut status = current_status;
                status.phase = Some(Phase::Failed);
                status.completion_time = Some(chrono::Utc::now().to_rfc3339());
                status.message = Some("stuck provisioning (ImagePullBackOff/CrashLoopBackOff threshold exceeded)".to_string());
                return Ok(Some(state.platform.update_session_status(namespace, &name, &status).await?));
            }
            Ok(None)
        }
        Phase::Running => {
            if job_status.succeeded.unwrap_or(0) > 0 {
                return Ok(Some(ingest_completion(state, namespace, &name, &current_status, Phase::Completed).await?));
            }
            if job_status.failed.unwrap_or(0) > 0 {
                return Ok(Some(ingest_completion(state, namespace, &name, &current_status, Phase::Failed).await?));
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

async fn mark_error(state: &ReconcilerState, namespace: &str, name: &str, message: String) -> Result<AgenticSession, ReconcileError> {
    let mut status = state.platform.get_session(namespace, name).await?.status.unwrap_or_default();
    status.phase = Some(Phase::Error);
    status.message = Some(message);
    Ok(state.platform.update_session_status(namespace, name, &status).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with(active: i32, succeeded: i32, failed: i32, start_time: Option<k8s_openapi::apimachinery::pkg::apis::meta::v1::Time>) -> JobStatus {
        JobStatus { active: Some(active), succeeded: Some(succeeded), failed: Some(failed), start_time, ..Default::default() }
    }

    #[test]
    fn not_stuck_while_active() {
        let status = status_with(1, 0, 0, Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(chrono::Utc::now())));
        assert!(!job_is_stuck(&status, Duration::from_secs(300)));
    }

    #[test]
    fn stuck_when_idle_past_threshold() {
        let old = chrono::Utc::now() - chrono::Duration::seconds(600);
        let status = status_with(0, 0, 0, Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(old)));
        assert!(job_is_stuck(&status, Duration::from_secs(300)));
    }

    #[test]
    fn not_stuck_before_threshold() {
        let recent = chrono::Utc::now() - chrono::Duration::seconds(10);
        let status = status_with(0, 0, 0, Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(recent)));
        assert!(!job_is_stuck(&status, Duration::from_secs(300)));
    }
}
