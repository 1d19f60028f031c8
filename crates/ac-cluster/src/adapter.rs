// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ClusterAdapter` trait: typed and dynamic access to every orchestrator
//! resource the control plane touches.
//!
//! A `ClusterAdapter` is always bound to one caller identity — either a
//! user's bearer token (constructed per-request by the gateway, never
//! falling back to the platform identity on 401/403) or the platform
//! service identity (used only for a narrowly-scoped set of privileged
//! writes). The trait itself does not know which; that distinction lives
//! entirely in how the `ClusterAdapter` was constructed.

use crate::error::ClusterError;
use ac_core::{AgenticSession, AgenticSessionStatus, ProjectSettingsSpec};
use async_trait::async_trait;
use futures::stream::BoxStream;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::runtime::watcher::Event as WatchEvent;

/// The authenticated caller's group memberships, resolved via the
/// orchestrator's identity provider userinfo endpoint.
#[derive(Debug, Clone, Default)]
pub struct UserInfo {
    pub user_id: String,
    pub groups: Vec<String>,
}

/// A resource+verb pair for a `SelfSubjectAccessReview`.
#[derive(Debug, Clone)]
pub struct AccessCheck<'a> {
    pub verb: &'a str,
    pub resource: &'a str,
    pub namespace: Option<&'a str>,
    pub name: Option<&'a str>,
}

#[async_trait]
pub trait ClusterAdapter: Send + Sync {
    // --- AgenticSession ---
    async fn get_session(&self, namespace: &str, name: &str) -> Result<AgenticSession, ClusterError>;
    async fn list_sessions(&self, namespace: &str) -> Result<Vec<AgenticSession>, ClusterError>;
    async fn create_session(&self, namespace: &str, session: &AgenticSession) -> Result<AgenticSession, ClusterError>;
    async fn delete_session(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;
    /// Status-subresource-only write. Spec writes never touch status,
    /// status writes never touch spec — there is deliberately no
    /// `update_session_spec` method; `activeWorkflow` and annotations go
    /// through [`Self::patch_session`] instead.
    async fn update_session_status(
        &self,
        namespace: &str,
        name: &str,
        status: &AgenticSessionStatus,
    ) -> Result<AgenticSession, ClusterError>;
    /// JSON merge-patch against the spec/metadata (never status) — used for
    /// `activeWorkflow` writes and stop/resume annotations.
    async fn patch_session(&self, namespace: &str, name: &str, merge_patch: serde_json::Value) -> Result<AgenticSession, ClusterError>;
    fn watch_sessions(&self, namespace: &str) -> BoxStream<'static, Result<WatchEvent<AgenticSession>, ClusterError>>;

    // --- ProjectSettings ---
    async fn get_project_settings(&self, namespace: &str) -> Result<ProjectSettingsSpec, ClusterError>;

    // --- Secrets / ConfigMaps / PVC ---
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError>;
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError>;
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;
    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<(), ClusterError>;
    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;
    /// Idempotent: creates the per-project ambient workspace PVC if absent,
    /// no-ops if it already exists — one per namespace, not per session.
    async fn ensure_workspace_pvc(&self, namespace: &str, name: &str, storage_class: Option<&str>) -> Result<(), ClusterError>;

    // --- Job / Pod ---
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<Job>, ClusterError>;
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError>;
    /// Not-found is swallowed by implementations and treated as success —
    /// deletion races with orchestrator GC are expected.
    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;
    fn watch_pods_for_job(&self, namespace: &str, job_name: &str) -> BoxStream<'static, Result<WatchEvent<k8s_openapi::api::core::v1::Pod>, ClusterError>>;

    // --- Identity ---
    /// Mints a short-lived token for `service_account` via `TokenRequest`.
    /// Only ever called with the platform identity — the trait does not
    /// enforce that; callers must.
    async fn create_token(&self, namespace: &str, service_account: &str, ttl_secs: i64) -> Result<String, ClusterError>;
    async fn self_subject_access_review(&self, check: AccessCheck<'_>) -> Result<bool, ClusterError>;
    async fn user_info(&self) -> Result<UserInfo, ClusterError>;
}
