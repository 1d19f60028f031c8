// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session reconciler: the control loop driving every `AgenticSession`
//! through its phase state machine.

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod key;
pub mod queue;
pub mod reconcile;
pub mod state;
pub mod worker;

pub use error::ReconcileError;
pub use key::SessionKey;
pub use queue::{WorkQueue, WorkQueueReceiver};
pub use reconcile::reconcile_once;
pub use state::{ReconcilerConfig, ReconcilerState};

use ac_cluster::ClusterAdapter;
use ac_content::ContentAdapter;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Namespaces this process reconciles and how often it falls back to a
/// full list-based resync of each.
pub struct ReconcilerHandle {
    pub queue: WorkQueue,
    pub tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// Wires up the queue, worker pool, and per-namespace watch/resync tasks,
/// returning a handle the caller can use to enqueue sessions manually
/// (e.g. on webhook-driven invalidation) and to await shutdown.
pub fn spawn(
    platform: Arc<dyn ClusterAdapter>,
    content: Arc<dyn ContentAdapter>,
    config: ReconcilerConfig,
    namespaces: Vec<String>,
    resync_interval: Duration,
    cancel: CancellationToken,
) -> ReconcilerHandle {
    let state = Arc::new(ReconcilerState::new(platform.clone(), content, config));
    let (queue, queue_rx) = WorkQueue::new();

    let mut tasks = Vec::with_capacity(namespaces.len() * 2 + 1);
    tasks.push(tokio::spawn(worker::run(state.clone(), queue_rx, queue.clone(), cancel.clone())));
    for namespace in namespaces {
        tasks.push(tokio::spawn(dispatcher::watch_namespace(platform.clone(), namespace.clone(), queue.clone(), cancel.clone())));
        tasks.push(tokio::spawn(dispatcher::resync_namespace(platform.clone(), namespace, queue.clone(), resync_interval, cancel.clone())));
    }

    ReconcilerHandle { queue, tasks }
}
