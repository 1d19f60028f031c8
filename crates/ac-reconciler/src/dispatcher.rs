// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feeds the [`WorkQueue`]: one task follows `watch_sessions` for the
//! namespaces this process owns, another does a periodic full resync so a
//! missed watch event (connection drop, `kube` relist gap) never leaves a
//! session stuck.

use crate::key::SessionKey;
use crate::queue::WorkQueue;
use ac_cluster::ClusterAdapter;
use futures::StreamExt;
use kube::runtime::watcher::Event as WatchEvent;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Follows `watch_sessions(namespace)`, enqueueing the affected key on
/// every add/update/delete the stream reports. Runs until the stream ends
/// or `cancel` fires; the caller is expected to reconnect on stream end
/// (the underlying `kube` watcher already retries transient failures).
pub async fn watch_namespace(platform: Arc<dyn ClusterAdapter>, namespace: String, queue: WorkQueue, cancel: CancellationToken) {
    let mut stream = platform.watch_sessions(&namespace);
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            next = stream.next() => next,
        };
        let Some(event) = event else { return };
        match event {
            Ok(WatchEvent::Apply(session)) | Ok(WatchEvent::InitApply(session)) => {
                queue.enqueue(SessionKey::new(namespace.clone(), session.name_any()));
            }
            Ok(WatchEvent::Delete(session)) => {
                queue.enqueue(SessionKey::new(namespace.clone(), session.name_any()));
            }
            Ok(WatchEvent::Init) | Ok(WatchEvent::InitDone) => {}
            Err(e) => {
                tracing::warn!(namespace = %namespace, error = %e, "session watch error");
            }
        }
    }
}

/// Lists every session in `namespace` on `interval` and enqueues all of
/// them, so a session whose watch event was dropped still gets reconciled
/// eventually.
pub async fn resync_namespace(platform: Arc<dyn ClusterAdapter>, namespace: String, queue: WorkQueue, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        match platform.list_sessions(&namespace).await {
            Ok(sessions) => {
                for session in sessions {
                    queue.enqueue(SessionKey::new(namespace.clone(), session.name_any()));
                }
            }
            Err(e) => tracing::warn!(namespace = %namespace, error = %e, "resync list failed"),
        }
    }
}
