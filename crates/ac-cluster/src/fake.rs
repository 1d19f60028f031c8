// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `ClusterAdapter` fake, gated behind `feature = "test-support"`.
//! Lets the reconciler and gateway be unit-tested without a live cluster.

use crate::adapter::{AccessCheck, ClusterAdapter, UserInfo};
use crate::error::ClusterError;
use ac_core::{AgenticSession, AgenticSessionStatus, ProjectSettingsSpec};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::runtime::watcher::Event as WatchEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    sessions: HashMap<(String, String), AgenticSession>,
    project_settings: HashMap<String, ProjectSettingsSpec>,
    secrets: HashMap<(String, String), Secret>,
    config_maps: HashMap<(String, String), ConfigMap>,
    pvcs: HashMap<String, ()>,
    jobs: HashMap<(String, String), Job>,
    /// Fixed answer for every access review, default `true`.
    access_allowed: bool,
}

/// An in-memory `ClusterAdapter`. Watch streams are empty (tests drive the
/// reconciler directly rather than through a live watch); every other
/// operation is backed by a guarded `HashMap`.
#[derive(Clone)]
pub struct FakeClusterAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeClusterAdapter {
    fn default() -> Self {
        Self { state: Arc::new(Mutex::new(FakeState { access_allowed: true, ..Default::default() })) }
    }
}

impl FakeClusterAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_session(&self, namespace: &str, session: AgenticSession) {
        let name = session.metadata.name.clone().unwrap_or_default();
        self.state.lock().sessions.insert((namespace.to_string(), name), session);
    }

    pub fn seed_project_settings(&self, namespace: &str, settings: ProjectSettingsSpec) {
        self.state.lock().project_settings.insert(namespace.to_string(), settings);
    }

    pub fn seed_secret(&self, namespace: &str, name: &str, secret: Secret) {
        self.state.lock().secrets.insert((namespace.to_string(), name.to_string()), secret);
    }

    pub fn set_access_allowed(&self, allowed: bool) {
        self.state.lock().access_allowed = allowed;
    }

    pub fn job_count(&self, namespace: &str) -> usize {
        self.state.lock().jobs.keys().filter(|(ns, _)| ns == namespace).count()
    }

    /// Overwrites the status subresource of an already-created Job, so
    /// reconciler tests can drive Creating/Running/Completed/Failed
    /// transitions without a live Job controller.
    pub fn set_job_status(&self, namespace: &str, name: &str, status: k8s_openapi::api::batch::v1::JobStatus) {
        if let Some(job) = self.state.lock().jobs.get_mut(&(namespace.to_string(), name.to_string())) {
            job.status = Some(status);
        }
    }
}

#[async_trait]
impl ClusterAdapter for FakeClusterAdapter {
    async fn get_session(&self, namespace: &str, name: &str) -> Result<AgenticSession, ClusterError> {
        self.state
            .lock()
            .sessions
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(name.to_string()))
    }

    async fn list_sessions(&self, namespace: &str) -> Result<Vec<AgenticSession>, ClusterError> {
        Ok(self
            .state
            .lock()
            .sessions
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn create_session(&self, namespace: &str, session: &AgenticSession) -> Result<AgenticSession, ClusterError> {
        let name = session.metadata.name.clone().unwrap_or_default();
        let key = (namespace.to_string(), name);
        let mut state = self.state.lock();
        if state.sessions.contains_key(&key) {
            return Err(ClusterError::Conflict("session already exists".to_string()));
        }
        state.sessions.insert(key, session.clone());
        Ok(session.clone())
    }

    async fn delete_session(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.state.lock().sessions.remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn update_session_status(
        &self,
        namespace: &str,
        name: &str,
        status: &AgenticSessionStatus,
    ) -> Result<AgenticSession, ClusterError> {
        let mut state = self.state.lock();
        let key = (namespace.to_string(), name.to_string());
        let session = state.sessions.get_mut(&key).ok_or_else(|| ClusterError::NotFound(name.to_string()))?;
        session.status = Some(status.clone());
        Ok(session.clone())
    }

    async fn patch_session(&self, namespace: &str, name: &str, merge_patch: serde_json::Value) -> Result<AgenticSession, ClusterError> {
        let mut state = self.state.lock();
        let key = (namespace.to_string(), name.to_string());
        let session = state.sessions.get_mut(&key).ok_or_else(|| ClusterError::NotFound(name.to_string()))?;
        if let Some(workflow) = merge_patch.get("spec").and_then(|s| s.get("activeWorkflow")) {
            session.spec.active_workflow = serde_json::from_value(workflow.clone()).ok();
        }
        if let Some(annotations) = merge_patch.get("metadata").and_then(|m| m.get("annotations")) {
            if let Some(map) = annotations.as_object() {
                let entry = session.metadata.annotations.get_or_insert_with(Default::default);
                for (k, v) in map {
                    match v {
                        serde_json::Value::Null => {
                            entry.remove(k);
                        }
                        serde_json::Value::String(s) => {
                            entry.insert(k.clone(), s.clone());
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(session.clone())
    }

    fn watch_sessions(&self, _namespace: &str) -> BoxStream<'static, Result<WatchEvent<AgenticSession>, ClusterError>> {
        stream::empty().boxed()
    }

    async fn get_project_settings(&self, namespace: &str) -> Result<ProjectSettingsSpec, ClusterError> {
        self.state
            .lock()
            .project_settings
            .get(namespace)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound("projectsettings".to_string()))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        self.state
            .lock()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(name.to_string()))
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        self.state.lock().secrets.insert((namespace.to_string(), name), secret.clone());
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.state.lock().secrets.remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<(), ClusterError> {
        let name = config_map.metadata.name.clone().unwrap_or_default();
        self.state.lock().config_maps.insert((namespace.to_string(), name), config_map.clone());
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.state.lock().config_maps.remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn ensure_workspace_pvc(&self, namespace: &str, _name: &str, _storage_class: Option<&str>) -> Result<(), ClusterError> {
        self.state.lock().pvcs.insert(namespace.to_string(), ());
        Ok(())
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<Job>, ClusterError> {
        Ok(self.state.lock().jobs.get(&(namespace.to_string(), name.to_string())).cloned())
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError> {
        let name = job.metadata.name.clone().unwrap_or_default();
        let mut state = self.state.lock();
        let key = (namespace.to_string(), name);
        if let Some(existing) = state.jobs.get(&key) {
            return Ok(existing.clone());
        }
        state.jobs.insert(key, job.clone());
        Ok(job.clone())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.state.lock().jobs.remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    fn watch_pods_for_job(&self, _namespace: &str, _job_name: &str) -> BoxStream<'static, Result<WatchEvent<Pod>, ClusterError>> {
        stream::empty().boxed()
    }

    async fn create_token(&self, _namespace: &str, service_account: &str, _ttl_secs: i64) -> Result<String, ClusterError> {
        Ok(format!("fake-token-for-{service_account}"))
    }

    async fn self_subject_access_review(&self, _check: AccessCheck<'_>) -> Result<bool, ClusterError> {
        Ok(self.state.lock().access_allowed)
    }

    async fn user_info(&self) -> Result<UserInfo, ClusterError> {
        Ok(UserInfo { user_id: "fake-user".to_string(), groups: vec!["fake-group".to_string()] })
    }
}
