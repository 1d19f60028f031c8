// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subscriber forwarding task: reads from a session's broadcast
//! channel and forwards into a bounded queue sized by
//! `AC_SUBSCRIBER_QUEUE_DEPTH` (default 256). On overflow the subscriber is
//! dropped with a policy-violation close, never the tailer.

use crate::hub::SessionChannel;
use ac_core::Envelope;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// What a subscriber's outbound task delivers to the WebSocket handler.
#[derive(Debug, Clone)]
pub enum SubscriberMessage {
    Envelope(Envelope),
    /// The subscriber fell behind and must be closed with WS close code
    /// 1008 (policy violation); the caller closes the socket on receipt.
    Overflowed,
}

/// Spawns a task forwarding `channel`'s broadcast stream into a new bounded
/// mpsc channel of depth `queue_depth`. The returned receiver yields
/// `SubscriberMessage::Overflowed` at most once, as its final message.
pub fn spawn_subscriber(channel: Arc<SessionChannel>, queue_depth: usize) -> mpsc::Receiver<SubscriberMessage> {
    let mut broadcast_rx = channel.subscribe();
    let (tx, rx) = mpsc::channel(queue_depth);

    tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(envelope) => {
                    if tx.try_send(SubscriberMessage::Envelope(envelope)).is_err() {
                        let _ = tx.send(SubscriberMessage::Overflowed).await;
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    let _ = tx.send(SubscriberMessage::Overflowed).await;
                    break;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        channel.unsubscribe();
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::ChannelHub;
    use ac_core::EnvelopeKind;

    fn envelope(seq: u64) -> Envelope {
        Envelope { seq, timestamp: "2026-07-28T00:00:00Z".to_string(), kind: EnvelopeKind::AgentMessage, payload: serde_json::json!({}) }
    }

    #[tokio::test]
    async fn forwards_published_envelopes() {
        let hub = ChannelHub::new();
        let channel = hub.get_or_create("demo", "s1");
        let mut rx = spawn_subscriber(channel.clone(), 8);
        channel.publish(envelope(1));
        match rx.recv().await.unwrap() {
            SubscriberMessage::Envelope(e) => assert_eq!(e.seq, 1),
            SubscriberMessage::Overflowed => panic!("unexpected overflow"),
        }
    }

    #[tokio::test]
    async fn slow_subscriber_is_dropped_on_lag_not_the_publisher() {
        let hub = ChannelHub::new();
        let channel = hub.get_or_create("demo", "s1");
        // queue_depth 1024 (tokio broadcast default cap in hub.rs), but the
        // subscriber's own forwarding queue is 1 deep here so it lags fast.
        let mut rx = spawn_subscriber(channel.clone(), 1);
        for i in 0..2000u64 {
            channel.publish(envelope(i));
        }
        let mut saw_overflow = false;
        while let Some(msg) = rx.recv().await {
            if matches!(msg, SubscriberMessage::Overflowed) {
                saw_overflow = true;
                break;
            }
        }
        assert!(saw_overflow);
    }
}
