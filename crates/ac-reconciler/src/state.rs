// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared reconciler context and the small amount of process-wide memory
//! the state machine needs beyond the CR itself: the workflow fingerprint
//! a session last acted on (so a `Running` session's inbox write happens
//! once per `activeWorkflow` change, not once per reconcile pass).

use ac_core::ActiveWorkflow;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::key::SessionKey;

pub const RUNNER_SERVICE_ACCOUNT: &str = "ambient-code-runner";

pub struct ReconcilerConfig {
    pub runner_image: String,
    pub state_base_dir: String,
    pub content_service_base: String,
    pub runner_token_ttl_secs: i64,
    pub backoff_failure_window: Duration,
    pub workers: usize,
}

fn workflow_fingerprint(workflow: &ActiveWorkflow) -> String {
    format!("{}@{}/{}", workflow.git_url, workflow.branch, workflow.path)
}

/// Tracks the last `activeWorkflow` fingerprint this process acted on,
/// per session. Lost on restart — a missed workflow swap is simply
/// retried, since the inbox write is idempotent from the runner's point
/// of view (it always clones whatever `activeWorkflow` currently names).
#[derive(Default)]
pub struct WorkflowTracker {
    seen: Mutex<HashMap<SessionKey, String>>,
}

impl WorkflowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a given workflow is observed for a
    /// session, recording it so later calls with the same workflow return
    /// `false`.
    pub fn observe(&self, key: &SessionKey, workflow: &ActiveWorkflow) -> bool {
        let fingerprint = workflow_fingerprint(workflow);
        let mut seen = self.seen.lock();
        if seen.get(key) == Some(&fingerprint) {
            false
        } else {
            seen.insert(key.clone(), fingerprint);
            true
        }
    }

    pub fn forget(&self, key: &SessionKey) {
        self.seen.lock().remove(key);
    }
}

pub struct ReconcilerState {
    pub platform: Arc<dyn ac_cluster::ClusterAdapter>,
    pub content: Arc<dyn ac_content::ContentAdapter>,
    pub config: ReconcilerConfig,
    pub workflows: WorkflowTracker,
}

impl ReconcilerState {
    pub fn new(platform: Arc<dyn ac_cluster::ClusterAdapter>, content: Arc<dyn ac_content::ContentAdapter>, config: ReconcilerConfig) -> Self {
        Self { platform, content, config, workflows: WorkflowTracker::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(path: &str) -> ActiveWorkflow {
        ActiveWorkflow { git_url: "https://example.com/wf.git".into(), branch: "main".into(), path: path.into() }
    }

    #[test]
    fn first_observation_is_new_repeat_is_not() {
        let tracker = WorkflowTracker::new();
        let key = SessionKey::new("demo", "s1");
        assert!(tracker.observe(&key, &workflow("a")));
        assert!(!tracker.observe(&key, &workflow("a")));
        assert!(tracker.observe(&key, &workflow("b")));
    }
}
