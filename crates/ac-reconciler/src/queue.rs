// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-key work queue: a bounded channel of [`SessionKey`]s feeding a
//! fixed worker pool, with an in-flight dedup set so a key already queued
//! is never pushed twice. This is the single-writer-per-session mechanism
//! the reconciler relies on instead of per-session locking.

use crate::key::SessionKey;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

const QUEUE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::Sender<SessionKey>,
    in_flight: Arc<Mutex<HashSet<SessionKey>>>,
}

pub struct WorkQueueReceiver {
    rx: mpsc::Receiver<SessionKey>,
    in_flight: Arc<Mutex<HashSet<SessionKey>>>,
}

impl WorkQueue {
    pub fn new() -> (Self, WorkQueueReceiver) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let in_flight = Arc::new(Mutex::new(HashSet::new()));
        (Self { tx, in_flight: in_flight.clone() }, WorkQueueReceiver { rx, in_flight })
    }

    /// Enqueues `key` unless it is already queued or being worked.
    /// Silently drops on a full channel — the next resync or watch event
    /// will pick the key back up.
    pub fn enqueue(&self, key: SessionKey) {
        {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.insert(key.clone()) {
                return;
            }
        }
        if self.tx.try_send(key.clone()).is_err() {
            self.in_flight.lock().remove(&key);
            tracing::warn!(session = %key, "reconcile queue full, dropping enqueue");
        }
    }

    /// Marks `key` no longer in-flight. Used by the worker pool, which only
    /// holds the `WorkQueue` (sender) handle, not the single-owner
    /// `WorkQueueReceiver`.
    pub fn complete(&self, key: &SessionKey) {
        self.in_flight.lock().remove(key);
    }
}

impl WorkQueueReceiver {
    /// Pops the next key to reconcile. The key remains marked in-flight
    /// until the caller calls [`Self::complete`].
    pub async fn recv(&mut self) -> Option<SessionKey> {
        self.rx.recv().await
    }

    /// Marks `key` no longer in-flight. Must be called exactly once per
    /// key returned by [`Self::recv`], after reconciliation finishes —
    /// otherwise a re-enqueue of the same key while it is being worked
    /// would be silently dropped forever.
    pub fn complete(&self, key: &SessionKey) {
        self.in_flight.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_enqueue_is_deduped_until_complete() {
        let (queue, mut rx) = WorkQueue::new();
        let key = SessionKey::new("demo", "s1");
        queue.enqueue(key.clone());
        queue.enqueue(key.clone());

        let popped = rx.recv().await.unwrap();
        assert_eq!(popped, key);
        assert!(rx.rx.try_recv().is_err());

        rx.complete(&key);
        queue.enqueue(key.clone());
        assert_eq!(rx.recv().await.unwrap(), key);
    }
}
