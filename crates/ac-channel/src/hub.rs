// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session broadcast hub and the registry of live sessions: a single
//! publisher (the tailer) and many WebSocket subscribers share one
//! broadcast channel per session.

use ac_core::Envelope;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

const BROADCAST_CAPACITY: usize = 1024;

/// One session's publish point. The tailer is this channel's only
/// publisher; subscribers each get their own `broadcast::Receiver`.
pub struct SessionChannel {
    tx: broadcast::Sender<Envelope>,
    subscriber_count: AtomicUsize,
    last_activity: Mutex<Instant>,
}

impl SessionChannel {
    fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx, subscriber_count: AtomicUsize::new(0), last_activity: Mutex::new(Instant::now()) }
    }

    pub fn publish(&self, envelope: Envelope) {
        *self.last_activity.lock() = Instant::now();
        // No subscribers is not an error; the broadcast channel simply
        // drops a send with zero receivers.
        let _ = self.tx.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        self.tx.subscribe()
    }

    pub fn unsubscribe(&self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.last_activity.lock().elapsed()
    }
}

/// Registry of live channels keyed by `(namespace, session name)`. One
/// entry exists for as long as a tailer task is running for that session;
/// `hub::tailer` removes its own entry when it exits.
#[derive(Default, Clone)]
pub struct ChannelHub {
    channels: Arc<Mutex<HashMap<(String, String), Arc<SessionChannel>>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, namespace: &str, name: &str) -> Arc<SessionChannel> {
        self.channels
            .lock()
            .entry((namespace.to_string(), name.to_string()))
            .or_insert_with(|| Arc::new(SessionChannel::new()))
            .clone()
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<SessionChannel>> {
        self.channels.lock().get(&(namespace.to_string(), name.to_string())).cloned()
    }

    /// Returns this session's channel, spawning `start_tailer` exactly once
    /// per session — only the caller that actually creates the channel is
    /// responsible for keeping it fed. One tailer per live session, not one
    /// per subscriber.
    pub fn get_or_start<F>(&self, namespace: &str, name: &str, start_tailer: F) -> Arc<SessionChannel>
    where
        F: FnOnce() -> tokio::task::JoinHandle<()>,
    {
        let key = (namespace.to_string(), name.to_string());
        let mut channels = self.channels.lock();
        if let Some(existing) = channels.get(&key) {
            return existing.clone();
        }
        let channel = Arc::new(SessionChannel::new());
        channels.insert(key, channel.clone());
        drop(channels);
        start_tailer();
        channel
    }

    pub fn remove(&self, namespace: &str, name: &str) {
        self.channels.lock().remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn session_count(&self) -> usize {
        self.channels.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::EnvelopeKind;

    fn envelope(seq: u64) -> Envelope {
        Envelope { seq, timestamp: "2026-07-28T00:00:00Z".to_string(), kind: EnvelopeKind::AgentMessage, payload: serde_json::json!({}) }
    }

    #[tokio::test]
    async fn subscriber_receives_published_envelopes_in_order() {
        let hub = ChannelHub::new();
        let channel = hub.get_or_create("demo", "s1");
        let mut rx = channel.subscribe();
        channel.publish(envelope(10));
        channel.publish(envelope(20));
        assert_eq!(rx.recv().await.unwrap().seq, 10);
        assert_eq!(rx.recv().await.unwrap().seq, 20);
    }

    #[test]
    fn unsubscribe_decrements_count() {
        let hub = ChannelHub::new();
        let channel = hub.get_or_create("demo", "s1");
        let _rx = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        channel.unsubscribe();
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn get_or_create_returns_the_same_channel_for_the_same_key() {
        let hub = ChannelHub::new();
        let a = hub.get_or_create("demo", "s1");
        let b = hub.get_or_create("demo", "s1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn get_or_start_only_invokes_the_starter_once_per_key() {
        let hub = ChannelHub::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            let channel = hub.get_or_start("demo", "s1", move || {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async {})
            });
            assert_eq!(channel.subscriber_count(), 0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
