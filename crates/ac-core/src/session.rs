// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgenticSession` custom resource: spec and status types. Fields are
//! immutable after creation except where noted (`activeWorkflow`, and the
//! annotations the API writes for stop/resume).

use crate::phase::Phase;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `repos[].output.type` — where the runner pushes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RepoOutputType {
    Fork,
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoInput {
    pub url: String,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoOutput {
    #[serde(rename = "type")]
    pub output_type: RepoOutputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    #[serde(default)]
    pub create_pull_request: bool,
}

/// One entry of `spec.repos`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoDescriptor {
    pub input: RepoInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<RepoOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// The authenticated caller's identity, denormalized onto the spec by the
/// API at creation time (never set by the user directly).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
    #[serde(default = "default_workspace_path")]
    pub workspace: String,
    #[serde(default = "default_messages_path")]
    pub messages: String,
    #[serde(default = "default_inbox_path")]
    pub inbox: String,
}

fn default_workspace_path() -> String {
    "workspace".to_string()
}
fn default_messages_path() -> String {
    "messages.jsonl".to_string()
}
fn default_inbox_path() -> String {
    "inbox/".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace_path(),
            messages: default_messages_path(),
            inbox: default_inbox_path(),
        }
    }
}

/// Mutable pointer to a workflow definition to clone into the workspace.
/// The only spec field the API may mutate on a *Running* session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkflow {
    pub git_url: String,
    pub branch: String,
    pub path: String,
}

fn default_timeout_secs() -> i64 {
    1800
}

fn default_main_repo_index() -> u32 {
    0
}

/// Per-repo push/PR outcome, surfaced in `status.repoStatuses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RepoPushStatus {
    Pushed,
    Abandoned,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatusEntry {
    pub repo_url: String,
    pub status: RepoPushStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Populated only once the session reaches a terminal phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// `AgenticSession.status`. Written exclusively via the status subresource
/// by the reconciler (see ac-cluster's `ClusterAdapter::update_status`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgenticSessionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<String>,
    #[serde(default)]
    pub repo_statuses: Vec<RepoStatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultSummary>,
    /// Bumped by the reconciler each time it re-provisions a `Stopped`
    /// session; lets it tell "still the same Creating attempt" apart from
    /// "a fresh resume" after a restart.
    #[serde(default)]
    pub resume_count: u32,
}

impl AgenticSessionStatus {
    /// Invariant: only a terminal phase may carry a non-empty result summary.
    pub fn result_is_consistent(&self) -> bool {
        match &self.phase {
            Some(p) if p.is_terminal() => true,
            _ => self.result.is_none(),
        }
    }

    /// Invariant: `completionTime >= startTime` when both are present.
    /// Both are RFC3339 strings; lexicographic order matches temporal order.
    pub fn completion_after_start(&self) -> bool {
        match (&self.start_time, &self.completion_time) {
            (Some(start), Some(end)) => end.as_str() >= start.as_str(),
            _ => true,
        }
    }
}

/// `AgenticSession` custom resource: group `vteam.ambient-code`,
/// version `v1alpha1`, namespaced, status subresource enabled.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vteam.ambient-code",
    version = "v1alpha1",
    kind = "AgenticSession",
    namespaced,
    status = "AgenticSessionStatus",
    shortname = "asession"
)]
#[serde(rename_all = "camelCase")]
pub struct AgenticSessionSpec {
    pub prompt: String,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout: i64,
    pub project: String,
    #[serde(default)]
    pub llm_settings: Option<LlmSettings>,
    pub repos: Vec<RepoDescriptor>,
    #[serde(default = "default_main_repo_index")]
    pub main_repo_index: u32,
    #[serde(default)]
    pub user_context: UserContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_account: Option<String>,
    #[serde(default)]
    pub resource_overrides: ResourceOverrides,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workflow: Option<ActiveWorkflow>,
}

impl AgenticSessionSpec {
    /// Invariant: `mainRepoIndex` in `[0, len(repos))`.
    pub fn main_repo_index_valid(&self) -> bool {
        (self.main_repo_index as usize) < self.repos.len()
    }

    pub fn main_repo(&self) -> Option<&RepoDescriptor> {
        self.repos.get(self.main_repo_index as usize)
    }
}

/// Annotation key the API sets on `POST /stop`; the reconciler observes it
/// and cleared by the API on `POST /resume`.
pub const STOP_REQUESTED_AT_ANNOTATION: &str = "vteam.ambient-code/stop-requested-at";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec(main_repo_index: u32, repo_count: usize) -> AgenticSessionSpec {
        AgenticSessionSpec {
            prompt: "do the thing".into(),
            interactive: false,
            display_name: None,
            timeout: 1800,
            project: "demo".into(),
            llm_settings: None,
            repos: (0..repo_count)
                .map(|i| RepoDescriptor {
                    input: RepoInput { url: format!("https://example/{i}"), branch: "main".into() },
                    output: None,
                })
                .collect(),
            main_repo_index,
            user_context: UserContext::default(),
            bot_account: None,
            resource_overrides: ResourceOverrides::default(),
            environment_variables: BTreeMap::new(),
            paths: PathsConfig::default(),
            active_workflow: None,
        }
    }

    #[test]
    fn main_repo_index_in_bounds_is_valid() {
        let spec = sample_spec(0, 2);
        assert!(spec.main_repo_index_valid());
        assert!(spec.main_repo().is_some());
    }

    #[test]
    fn main_repo_index_equal_to_len_is_invalid() {
        // mainRepoIndex == len(repos) is out of bounds, not a valid index.
        let spec = sample_spec(2, 2);
        assert!(!spec.main_repo_index_valid());
    }

    #[test]
    fn result_summary_requires_terminal_phase() {
        let mut status = AgenticSessionStatus::default();
        status.result = Some(ResultSummary::default());
        status.phase = Some(Phase::Running);
        assert!(!status.result_is_consistent());
        status.phase = Some(Phase::Completed);
        assert!(status.result_is_consistent());
    }

    #[test]
    fn completion_time_before_start_time_is_flagged() {
        let mut status = AgenticSessionStatus::default();
        status.start_time = Some("2026-07-28T12:00:00Z".into());
        status.completion_time = Some("2026-07-28T11:00:00Z".into());
        assert!(!status.completion_after_start());
    }
}
