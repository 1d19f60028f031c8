// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of live delivery: one record in `messages.jsonl`, and its
//! WebSocket wire framing.

use serde::{Deserialize, Serialize};

/// `type` values a server->client frame's `payload` may carry. Unknown
/// types observed on the wire (from a runner built against a newer
/// contract) MUST be preserved and forwarded, never dropped — see
/// [`EnvelopeKind::Other`].
///
/// Hand-rolled (de)serialization instead of `#[derive]`: serde has no
/// built-in way to keep the original string on a derive-generated fallback
/// variant (`#[serde(other)]` discards it), and preserving it verbatim is
/// the whole point of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    MessagePartial,
    AgentMessage,
    SystemMessage,
    UserMessage,
    AgentRunning,
    AgentWaiting,
    ResultMessage,
    /// Preserves a type this build does not recognize, verbatim.
    Other(String),
}

impl EnvelopeKind {
    fn as_wire_str(&self) -> &str {
        match self {
            EnvelopeKind::MessagePartial => "message.partial",
            EnvelopeKind::AgentMessage => "agent.message",
            EnvelopeKind::SystemMessage => "system.message",
            EnvelopeKind::UserMessage => "user.message",
            EnvelopeKind::AgentRunning => "agent.running",
            EnvelopeKind::AgentWaiting => "agent.waiting",
            EnvelopeKind::ResultMessage => "result.message",
            EnvelopeKind::Other(s) => s,
        }
    }

    fn from_wire_str(s: &str) -> Self {
        match s {
            "message.partial" => EnvelopeKind::MessagePartial,
            "agent.message" => EnvelopeKind::AgentMessage,
            "system.message" => EnvelopeKind::SystemMessage,
            "user.message" => EnvelopeKind::UserMessage,
            "agent.running" => EnvelopeKind::AgentRunning,
            "agent.waiting" => EnvelopeKind::AgentWaiting,
            "result.message" => EnvelopeKind::ResultMessage,
            other => EnvelopeKind::Other(other.to_string()),
        }
    }
}

impl Serialize for EnvelopeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for EnvelopeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(EnvelopeKind::from_wire_str(&s))
    }
}

/// One envelope as delivered to a WebSocket subscriber:
/// `{ seq, timestamp, type, payload }`. `seq` is the byte offset
/// immediately *after* the delivered record in `messages.jsonl`, so a
/// client can reconnect with its last-received `seq` as `fromOffset` and
/// resume exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_round_trips_verbatim() {
        let json = serde_json::json!({
            "seq": 42,
            "timestamp": "2026-07-28T00:00:00Z",
            "type": "agent.thinking",
            "payload": {"text": "hmm"}
        });
        let envelope: Envelope = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(envelope.kind, EnvelopeKind::Other("agent.thinking".to_string()));
        let back = serde_json::to_value(&envelope).unwrap();
        assert_eq!(back["type"], "agent.thinking");
    }

    #[test]
    fn known_type_parses_to_named_variant() {
        let json = serde_json::json!({
            "seq": 1,
            "timestamp": "2026-07-28T00:00:00Z",
            "type": "result.message",
            "payload": {}
        });
        let envelope: Envelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.kind, EnvelopeKind::ResultMessage);
    }
}
