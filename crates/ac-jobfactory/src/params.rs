// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inputs the factory needs to build a session's child resources, gathered
//! by the reconciler before calling into this crate — this crate itself
//! never talks to the cluster.

use ac_core::{AgenticSessionSpec, DefaultResourceProfile, ResourceOverrides};

/// A resolved secret reference the reconciler has already looked up or
/// minted; the factory only needs the name and the set of keys it exposes.
#[derive(Debug, Clone)]
pub struct RunnerSecrets {
    /// Name of the session-scoped Secret carrying the runner identity token
    /// and per-repo credentials (built by this crate, created by the
    /// cluster adapter).
    pub session_secret_name: String,
    /// Name of the project's own credential Secret (`runnerSecretsName`
    /// from ProjectSettings), mounted read-only alongside it.
    pub project_secret_name: String,
}

/// Everything `build_job` needs for one session.
pub struct JobFactoryParams<'a> {
    pub session_name: &'a str,
    pub namespace: &'a str,
    pub spec: &'a AgenticSessionSpec,
    pub runner_image: &'a str,
    pub state_base_dir: &'a str,
    pub content_service_base: &'a str,
    pub runner_token: &'a str,
    pub secrets: RunnerSecrets,
    pub owner: JobOwner<'a>,
    pub default_resource_profile: &'a DefaultResourceProfile,
}

/// Owner-reference fields the factory stamps onto every child object so
/// the orchestrator's garbage collector cascades deletion from the CR.
pub struct JobOwner<'a> {
    pub api_version: &'a str,
    pub kind: &'a str,
    pub name: &'a str,
    pub uid: &'a str,
}

pub(crate) fn effective_cpu(overrides: &ResourceOverrides, profile: &DefaultResourceProfile) -> Option<String> {
    overrides.cpu.clone().or_else(|| profile.cpu.clone())
}

pub(crate) fn effective_memory(overrides: &ResourceOverrides, profile: &DefaultResourceProfile) -> Option<String> {
    overrides.memory.clone().or_else(|| profile.memory.clone())
}
