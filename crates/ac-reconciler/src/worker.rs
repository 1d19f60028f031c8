// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency reconcile loop: a fixed pool of concurrent
//! reconciles, not one task per session key, running [`reconcile_once`]
//! per popped [`SessionKey`].

use crate::key::SessionKey;
use crate::queue::{WorkQueue, WorkQueueReceiver};
use crate::reconcile::reconcile_once;
use crate::state::ReconcilerState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

const MAX_BACKOFF_SECS: u64 = 60;

fn backoff_for(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt.min(6)).min(MAX_BACKOFF_SECS))
}

/// Drains `queue_rx` until cancelled, running at most `state.config.workers`
/// reconciles concurrently. A recoverable failure re-enters the queue after
/// an exponential backoff sleep; a non-recoverable one is logged and
/// dropped (the handler already wrote `phase=Error` itself).
pub async fn run(state: Arc<ReconcilerState>, mut queue_rx: WorkQueueReceiver, requeue: WorkQueue, cancel: CancellationToken) {
    let permits = Arc::new(Semaphore::new(state.config.workers.max(1)));
    loop {
        let key = tokio::select! {
            _ = cancel.cancelled() => break,
            popped = queue_rx.recv() => match popped {
                Some(key) => key,
                None => break,
            },
        };

        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let state = state.clone();
        let requeue = requeue.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _permit = permit;
            reconcile_and_requeue(&state, &key, &requeue, &cancel).await;
        });
    }
}

async fn reconcile_and_requeue(state: &ReconcilerState, key: &SessionKey, requeue: &WorkQueue, cancel: &CancellationToken) {
    match reconcile_once(state, key).await {
        Ok(()) => {}
        Err(e) if e.is_recoverable() => {
            tracing::warn!(session = %key, error = %e, "reconcile failed, will retry");
            let requeue = requeue.clone();
            let key = key.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(backoff_for(0)) => requeue.enqueue(key),
                }
            });
        }
        Err(e) => {
            tracing::error!(session = %key, error = %e, "non-recoverable reconcile failure");
        }
    }
    requeue.complete(key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        assert!(backoff_for(0) < backoff_for(3));
        assert_eq!(backoff_for(10), Duration::from_secs(MAX_BACKOFF_SECS));
    }
}
