// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session tailer: the Live Channel's one publisher task per session.
//! Reads `messages.jsonl` via the content adapter's streaming tail,
//! publishing parsed envelopes onto the session's broadcast channel.

use crate::envelope_stream::parse_tail_line;
use crate::hub::ChannelHub;
use ac_content::ContentAdapter;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

/// Runs until the tail stream ends, the session reaches a terminal phase
/// with zero subscribers, or `grace` elapses with zero subscribers and no
/// publisher activity — whichever comes first.
pub async fn run_tailer(
    hub: ChannelHub,
    content: Arc<dyn ContentAdapter>,
    token: String,
    namespace: String,
    session_name: String,
    messages_path: String,
    from_offset: u64,
    is_terminal: impl Fn() -> bool + Send + 'static,
    grace: Duration,
) {
    let channel = hub.get_or_create(&namespace, &session_name);
    let mut stream = content.tail(&token, &namespace, &messages_path, from_offset);

    loop {
        let next = tokio::time::timeout(grace, stream.next()).await;
        match next {
            Ok(Some(Ok(line))) => match parse_tail_line(line) {
                Ok(envelope) => channel.publish(envelope),
                Err(e) => tracing::warn!(%namespace, %session_name, error = %e, "tailer: dropping malformed line"),
            },
            Ok(Some(Err(e))) => {
                tracing::warn!(%namespace, %session_name, error = %e, "tailer: content adapter error, stopping");
                break;
            }
            Ok(None) => {
                tracing::info!(%namespace, %session_name, "tailer: stream ended");
                break;
            }
            Err(_timeout) => {
                if channel.subscriber_count() == 0 && (is_terminal() || channel.idle_for() >= grace) {
                    tracing::info!(%namespace, %session_name, "tailer: idle with no subscribers, stopping");
                    break;
                }
            }
        }
    }

    hub.remove(&namespace, &session_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_content::FakeContentAdapter;

    #[tokio::test]
    async fn tailer_publishes_every_line_then_stops_on_stream_end() {
        let hub = ChannelHub::new();
        let content = Arc::new(FakeContentAdapter::new());
        content.seed_file(
            "demo",
            "messages.jsonl",
            format!(
                "{}\n{}\n",
                serde_json::json!({"seq":0,"timestamp":"2026-07-28T00:00:00Z","type":"agent.message","payload":{}}),
                serde_json::json!({"seq":0,"timestamp":"2026-07-28T00:00:01Z","type":"result.message","payload":{}}),
            ),
        );
        let channel = hub.get_or_create("demo", "s1");
        let mut rx = channel.subscribe();

        run_tailer(
            hub.clone(),
            content,
            "tok".to_string(),
            "demo".to_string(),
            "s1".to_string(),
            "messages.jsonl".to_string(),
            0,
            || true,
            Duration::from_millis(50),
        )
        .await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, ac_core::EnvelopeKind::AgentMessage);
        assert_eq!(second.kind, ac_core::EnvelopeKind::ResultMessage);
        assert_eq!(hub.session_count(), 0);
    }
}
