// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `KubeClusterAdapter` — the real `ClusterAdapter`, backed by `kube::Client`.
//!
//! Grounded on `daemon/src/adapters/agent/k8s/mod.rs::KubernetesAdapter`:
//! same `Api::namespaced` access pattern, same "classify kube::Error into
//! our own enum" posture, generalized from pod-only access to the full set
//! of resources the reconciler and gateway touch.

use crate::adapter::{AccessCheck, ClusterAdapter, UserInfo};
use crate::error::ClusterError;
use ac_core::{AgenticSession, AgenticSessionStatus, ProjectSettings, ProjectSettingsSpec, PROJECT_SETTINGS_NAME};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::authentication::v1::{TokenRequest, TokenRequestSpec};
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::runtime::{watcher, WatchStreamExt};
use kube::Client;

/// A `ClusterAdapter` bound to exactly one `kube::Client` — which may be
/// configured with the platform's service-account token or with a
/// per-request user bearer token. Construction decides the identity;
/// this type is identity-agnostic.
#[derive(Clone)]
pub struct KubeClusterAdapter {
    client: Client,
}

impl KubeClusterAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn sessions(&self, namespace: &str) -> Api<AgenticSession> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn project_settings(&self, namespace: &str) -> Api<ProjectSettings> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pvcs(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterAdapter for KubeClusterAdapter {
    async fn get_session(&self, namespace: &str, name: &str) -> Result<AgenticSession, ClusterError> {
        Ok(self.sessions(namespace).get(name).await?)
    }

    async fn list_sessions(&self, namespace: &str) -> Result<Vec<AgenticSession>, ClusterError> {
        let list = self.sessions(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn create_session(&self, namespace: &str, session: &AgenticSession) -> Result<AgenticSession, ClusterError> {
        Ok(self.sessions(namespace).create(&PostParams::default(), session).await?)
    }

    async fn delete_session(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        match self.sessions(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_session_status(
        &self,
        namespace: &str,
        name: &str,
        status: &AgenticSessionStatus,
    ) -> Result<AgenticSession, ClusterError> {
        let patch = serde_json::json!({ "status": status });
        Ok(self
            .sessions(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?)
    }

    async fn patch_session(&self, namespace: &str, name: &str, merge_patch: serde_json::Value) -> Result<AgenticSession, ClusterError> {
        Ok(self
            .sessions(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&merge_patch))
            .await?)
    }

    fn watch_sessions(&self, namespace: &str) -> BoxStream<'static, Result<watcher::Event<AgenticSession>, ClusterError>> {
        let api = self.sessions(namespace);
        watcher(api, watcher::Config::default())
            .default_backoff()
            .map(|res| res.map_err(ClusterError::from))
            .boxed()
    }

    async fn get_project_settings(&self, namespace: &str) -> Result<ProjectSettingsSpec, ClusterError> {
        let obj = self.project_settings(namespace).get(PROJECT_SETTINGS_NAME).await?;
        Ok(obj.spec)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        Ok(self.secrets(namespace).get(name).await?)
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError> {
        self.secrets(namespace).create(&PostParams::default(), secret).await?;
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        match self.secrets(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<(), ClusterError> {
        self.config_maps(namespace).create(&PostParams::default(), config_map).await?;
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        match self.config_maps(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_workspace_pvc(&self, namespace: &str, name: &str, storage_class: Option<&str>) -> Result<(), ClusterError> {
        let api = self.pvcs(namespace);
        match api.get(name).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                let pvc = crate::pvc::build_ambient_workspace_pvc(name, storage_class);
                match api.create(&PostParams::default(), &pvc).await {
                    Ok(_) => Ok(()),
                    // Another reconciler worker (or a racing session create)
                    // won the create; treat as success, matching the
                    // "lazily, once per namespace" contract.
                    Err(kube::Error::Api(e)) if e.code == 409 => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<Job>, ClusterError> {
        match self.jobs(namespace).get(name).await {
            Ok(job) => Ok(Some(job)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError> {
        match self.jobs(namespace).create(&PostParams::default(), job).await {
            Ok(created) => Ok(created),
            Err(kube::Error::Api(e)) if e.code == 409 => {
                // Already exists; caller decides whether to adopt based on
                // owner references.
                let name = job.metadata.name.as_deref().unwrap_or_default();
                self.jobs(namespace).get(name).await.map_err(ClusterError::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        let dp = DeleteParams::background();
        match self.jobs(namespace).delete(name, &dp).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn watch_pods_for_job(&self, namespace: &str, job_name: &str) -> BoxStream<'static, Result<watcher::Event<Pod>, ClusterError>> {
        let api = self.pods(namespace);
        let config = watcher::Config::default().labels(&format!("job-name={job_name}"));
        watcher(api, config).default_backoff().map(|res| res.map_err(ClusterError::from)).boxed()
    }

    async fn create_token(&self, namespace: &str, service_account: &str, ttl_secs: i64) -> Result<String, ClusterError> {
        let tr = TokenRequest {
            spec: TokenRequestSpec { expiration_seconds: Some(ttl_secs), ..Default::default() },
            ..Default::default()
        };
        let sa_api: Api<k8s_openapi::api::core::v1::ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let result: TokenRequest = sa_api
            .create_subresource("token", service_account, &PostParams::default(), serde_json::to_vec(&tr).map_err(|e| ClusterError::Other(e.to_string()))?)
            .await?;
        result
            .status
            .map(|s| s.token)
            .ok_or_else(|| ClusterError::Other("TokenRequest returned no status.token".to_string()))
    }

    async fn self_subject_access_review(&self, check: AccessCheck<'_>) -> Result<bool, ClusterError> {
        let ssar = SelfSubjectAccessReview {
            spec: SelfSubjectAccessReviewSpec {
                resource_attributes: Some(ResourceAttributes {
                    verb: Some(check.verb.to_string()),
                    resource: Some(check.resource.to_string()),
                    namespace: check.namespace.map(str::to_string),
                    name: check.name.map(str::to_string),
                    group: Some("vteam.ambient-code".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let api: Api<SelfSubjectAccessReview> = Api::all(self.client.clone());
        let result = api.create(&PostParams::default(), &ssar).await?;
        Ok(result.status.map(|s| s.allowed).unwrap_or(false))
    }

    async fn user_info(&self) -> Result<UserInfo, ClusterError> {
        // The orchestrator's identity provider exposes a userinfo-style
        // endpoint outside the typed kube API surface; callers that need
        // group membership construct it from the `TokenReview` the
        // gateway already performed during bearer-token validation.
        // Placeholder until wired to a concrete identity provider client.
        Ok(UserInfo::default())
    }
}
