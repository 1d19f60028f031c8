// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the per-session Job and its owner references. The Job owns its
//! Pod template (`pod::build_pod_template`); the AgenticSession owns the
//! Job, its ConfigMap, and its Secret, so deleting the CR cascades through
//! the orchestrator's garbage collector without this crate or the
//! reconciler issuing an explicit child delete.

use crate::configmap::build_config_map;
use crate::params::JobFactoryParams;
use crate::pod::build_pod_template;
use crate::secret::build_runner_secret;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;

pub fn job_name(session_name: &str) -> String {
    format!("{session_name}-job")
}

pub(crate) fn session_labels(session_name: &str) -> BTreeMap<String, String> {
    [("app".to_string(), "ambient-code-runner".to_string()), ("vteam.ambient-code/session".to_string(), session_name.to_string())]
        .into_iter()
        .collect()
}

fn owner_reference(params: &JobFactoryParams<'_>) -> OwnerReference {
    OwnerReference {
        api_version: params.owner.api_version.to_string(),
        kind: params.owner.kind.to_string(),
        name: params.owner.name.to_string(),
        uid: params.owner.uid.to_string(),
        controller: Some(true),
        block_owner_deletion: Some(true),
        ..Default::default()
    }
}

/// The three child objects needed to launch a session. Created together by
/// the cluster adapter; the Job is created last so the ConfigMap and
/// Secret it references already exist.
pub struct SessionResources {
    pub config_map: ConfigMap,
    pub secret: Secret,
    pub job: Job,
}

pub fn build_session_resources(params: &JobFactoryParams<'_>) -> SessionResources {
    let owner_ref = owner_reference(params);
    let config_map = build_config_map(params, owner_ref.clone());
    let secret = build_runner_secret(params, owner_ref.clone());
    let pod_template = build_pod_template(params);

    let job = Job {
        metadata: ObjectMeta {
            name: Some(job_name(params.session_name)),
            namespace: Some(params.namespace.to_string()),
            owner_references: Some(vec![owner_ref]),
            labels: Some(session_labels(params.session_name)),
            ..Default::default()
        },
        spec: Some(JobSpec {
            template: pod_template,
            backoff_limit: Some(0),
            ttl_seconds_after_finished: None,
            ..Default::default()
        }),
        status: None,
    };

    SessionResources { config_map, secret, job }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{JobOwner, RunnerSecrets};
    use ac_core::{AgenticSessionSpec, DefaultResourceProfile, PathsConfig, ResourceOverrides, UserContext};
    use std::collections::BTreeMap as Map;

    fn spec() -> AgenticSessionSpec {
        AgenticSessionSpec {
            prompt: "do it".into(),
            interactive: true,
            display_name: None,
            timeout: 1800,
            project: "demo".into(),
            llm_settings: None,
            repos: vec![],
            main_repo_index: 0,
            user_context: UserContext::default(),
            bot_account: None,
            resource_overrides: ResourceOverrides::default(),
            environment_variables: Map::new(),
            paths: PathsConfig::default(),
            active_workflow: None,
        }
    }

    #[test]
    fn job_carries_controller_owner_reference_to_the_session() {
        let s = spec();
        let profile = DefaultResourceProfile::default();
        let params = JobFactoryParams {
            session_name: "s1",
            namespace: "demo",
            spec: &s,
            runner_image: "runner:latest",
            state_base_dir: "/state",
            content_service_base: "http://ambient-content.demo.svc:8080",
            runner_token: "tok",
            secrets: RunnerSecrets { session_secret_name: "s1-runner".into(), project_secret_name: "proj-secrets".into() },
            owner: JobOwner { api_version: "vteam.ambient-code/v1alpha1", kind: "AgenticSession", name: "s1", uid: "uid-1" },
            default_resource_profile: &profile,
        };
        let resources = build_session_resources(&params);
        assert_eq!(resources.job.metadata.name.as_deref(), Some("s1-job"));
        let owner = &resources.job.metadata.owner_references.as_ref().unwrap()[0];
        assert_eq!(owner.uid, "uid-1");
        assert_eq!(owner.controller, Some(true));
        assert_eq!(resources.config_map.metadata.owner_references.as_ref().unwrap()[0].uid, "uid-1");
        assert_eq!(resources.secret.metadata.owner_references.as_ref().unwrap()[0].uid, "uid-1");
    }

    #[test]
    fn job_has_no_retry_backoff_since_the_reconciler_owns_restart_semantics() {
        let s = spec();
        let profile = DefaultResourceProfile::default();
        let params = JobFactoryParams {
            session_name: "s1",
            namespace: "demo",
            spec: &s,
            runner_image: "runner:latest",
            state_base_dir: "/state",
            content_service_base: "http://ambient-content.demo.svc:8080",
            runner_token: "tok",
            secrets: RunnerSecrets { session_secret_name: "s1-runner".into(), project_secret_name: "proj-secrets".into() },
            owner: JobOwner { api_version: "vteam.ambient-code/v1alpha1", kind: "AgenticSession", name: "s1", uid: "uid-1" },
            default_resource_profile: &profile,
        };
        let resources = build_session_resources(&params);
        assert_eq!(resources.job.spec.unwrap().backoff_limit, Some(0));
    }
}
