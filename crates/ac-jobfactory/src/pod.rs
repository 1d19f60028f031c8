// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod template for the session runner: workspace PVC mount, git-clone
//! init containers, env-driven runner contract, and the startup/liveness
//! probe pair.

use crate::configmap::config_map_name;
use crate::params::{effective_cpu, effective_memory, JobFactoryParams};
use crate::secret::secret_name;
use k8s_openapi::api::core::v1::{
    Capabilities, Container, EnvFromSource, EnvVar, EnvVarSource, ExecAction, PersistentVolumeClaimVolumeSource,
    Probe, ResourceRequirements, SecretEnvSource, SecretKeySelector, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

const WORKSPACE_VOLUME: &str = "workspace";

/// Builds the init container that clones `repo` into its subdirectory
/// under `/workspace`.
fn clone_init_container(image: &str, index: usize, url: &str, branch: &str) -> Container {
    let dest = format!("/workspace/repo-{index}");
    let cmd = vec![
        "git".to_string(),
        "clone".to_string(),
        "--branch".to_string(),
        branch.to_string(),
        "--single-branch".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        url.to_string(),
        dest,
    ];
    Container {
        name: format!("clone-repo-{index}"),
        image: Some(image.to_string()),
        command: Some(cmd),
        volume_mounts: Some(vec![VolumeMount { name: WORKSPACE_VOLUME.to_string(), mount_path: "/workspace".to_string(), ..Default::default() }]),
        ..Default::default()
    }
}

fn runner_security_context() -> SecurityContext {
    SecurityContext {
        allow_privilege_escalation: Some(false),
        run_as_non_root: Some(true),
        capabilities: Some(Capabilities { drop: Some(vec!["ALL".to_string()]), add: None }),
        ..Default::default()
    }
}

fn resource_requirements(params: &JobFactoryParams<'_>) -> Option<ResourceRequirements> {
    let cpu = effective_cpu(&params.spec.resource_overrides, params.default_resource_profile);
    let memory = effective_memory(&params.spec.resource_overrides, params.default_resource_profile);
    if cpu.is_none() && memory.is_none() {
        return None;
    }
    let mut map = BTreeMap::new();
    if let Some(cpu) = cpu {
        map.insert("cpu".to_string(), Quantity(cpu));
    }
    if let Some(memory) = memory {
        map.insert("memory".to_string(), Quantity(memory));
    }
    Some(ResourceRequirements { requests: Some(map.clone()), limits: Some(map), claims: None })
}

/// Builds the runner Pod template (used as `Job.spec.template`, never
/// created directly — see `job::build_job`).
pub(crate) fn build_pod_template(params: &JobFactoryParams<'_>) -> k8s_openapi::api::core::v1::PodTemplateSpec {
    let init_containers: Vec<Container> = params
        .spec
        .repos
        .iter()
        .enumerate()
        .map(|(i, repo)| clone_init_container(params.runner_image, i, &repo.input.url, &repo.input.branch))
        .collect();

    let mut env = vec![
        EnvVar { name: "RUNNER_TOKEN".to_string(), value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector { name: secret_name(params.session_name), key: "runner-token".to_string(), optional: Some(false) }),
            ..Default::default()
        }), ..Default::default() },
        EnvVar { name: "SESSION_NAME".to_string(), value: Some(params.session_name.to_string()), ..Default::default() },
        EnvVar { name: "SESSION_NAMESPACE".to_string(), value: Some(params.namespace.to_string()), ..Default::default() },
        EnvVar { name: "PROMPT".to_string(), value: Some(params.spec.prompt.clone()), ..Default::default() },
    ];
    if let Some(workflow) = &params.spec.active_workflow {
        env.push(EnvVar { name: "ACTIVE_WORKFLOW_GIT_URL".to_string(), value: Some(workflow.git_url.clone()), ..Default::default() });
        env.push(EnvVar { name: "ACTIVE_WORKFLOW_BRANCH".to_string(), value: Some(workflow.branch.clone()), ..Default::default() });
        env.push(EnvVar { name: "ACTIVE_WORKFLOW_PATH".to_string(), value: Some(workflow.path.clone()), ..Default::default() });
    }
    for (k, v) in &params.spec.environment_variables {
        env.push(EnvVar { name: k.clone(), value: Some(v.clone()), ..Default::default() });
    }

    let main_container = Container {
        name: "runner".to_string(),
        image: Some(params.runner_image.to_string()),
        working_dir: Some(format!("/workspace/repo-{}", params.spec.main_repo_index)),
        env: Some(env),
        env_from: Some(vec![
            EnvFromSource { config_map_ref: Some(k8s_openapi::api::core::v1::ConfigMapEnvSource { name: config_map_name(params.session_name), optional: Some(false) }), ..Default::default() },
            EnvFromSource { secret_ref: Some(SecretEnvSource { name: params.secrets.project_secret_name.clone(), optional: Some(true) }), ..Default::default() },
        ]),
        volume_mounts: Some(vec![VolumeMount {
            name: WORKSPACE_VOLUME.to_string(),
            mount_path: "/workspace".to_string(),
            sub_path: Some(params.session_name.to_string()),
            ..Default::default()
        }]),
        security_context: Some(runner_security_context()),
        resources: resource_requirements(params),
        startup_probe: Some(Probe {
            exec: Some(ExecAction { command: Some(vec!["test".to_string(), "-f".to_string(), "/workspace/.runner-ready".to_string()]) }),
            failure_threshold: Some(30),
            period_seconds: Some(10),
            ..Default::default()
        }),
        liveness_probe: Some(Probe {
            exec: Some(ExecAction { command: Some(vec!["test".to_string(), "-f".to_string(), "/workspace/.runner-alive".to_string()]) }),
            period_seconds: Some(30),
            ..Default::default()
        }),
        ..Default::default()
    };

    k8s_openapi::api::core::v1::PodTemplateSpec {
        metadata: Some(ObjectMeta { labels: Some(crate::job::session_labels(params.session_name)), ..Default::default() }),
        spec: Some(k8s_openapi::api::core::v1::PodSpec {
            init_containers: if init_containers.is_empty() { None } else { Some(init_containers) },
            containers: vec![main_container],
            volumes: Some(vec![Volume {
                name: WORKSPACE_VOLUME.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: format!("{}-workspace", params.namespace),
                    read_only: Some(false),
                }),
                ..Default::default()
            }]),
            restart_policy: Some("Never".to_string()),
            priority_class_name: params.spec.resource_overrides.priority_class.clone(),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{JobFactoryParams, JobOwner, RunnerSecrets};
    use ac_core::{AgenticSessionSpec, DefaultResourceProfile, PathsConfig, ResourceOverrides, UserContext};
    use std::collections::BTreeMap as Map;

    fn spec() -> AgenticSessionSpec {
        AgenticSessionSpec {
            prompt: "do it".into(),
            interactive: false,
            display_name: None,
            timeout: 1800,
            project: "demo".into(),
            llm_settings: None,
            repos: vec![ac_core::RepoDescriptor { input: ac_core::RepoInput { url: "https://example/repo".into(), branch: "main".into() }, output: None }],
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
    fn pod_template_mounts_workspace_at_session_subpath() {
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
        let tmpl = build_pod_template(&params);
        let pod_spec = tmpl.spec.unwrap();
        let container = &pod_spec.containers[0];
        let mount = &container.volume_mounts.as_ref().unwrap()[0];
        assert_eq!(mount.sub_path.as_deref(), Some("s1"));
        assert_eq!(container.security_context.as_ref().unwrap().allow_privilege_escalation, Some(false));
        assert_eq!(pod_spec.init_containers.as_ref().unwrap().len(), 1);
    }
}
