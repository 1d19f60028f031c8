// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses `messages.jsonl` lines into `ac_core::Envelope` values and
//! recomputes the wire `seq` as "byte offset immediately after this
//! record" — `ac-content`'s tail yields the offset a line *started* at,
//! since that's what the sidecar protocol hands back.

use ac_core::Envelope;
use ac_content::TailLine;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed envelope line: {0}")]
    Malformed(String),
}

pub fn parse_tail_line(line: TailLine) -> Result<Envelope, ParseError> {
    let (start_offset, text) = line;
    if text.trim().is_empty() {
        return Err(ParseError::Malformed("empty line".to_string()));
    }
    let mut envelope: Envelope = serde_json::from_str(&text).map_err(|e| ParseError::Malformed(e.to_string()))?;
    envelope.seq = start_offset + text.as_bytes().len() as u64 + 1;
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::EnvelopeKind;

    #[test]
    fn seq_is_offset_immediately_after_the_record() {
        let line = r#"{"seq":0,"timestamp":"2026-07-28T00:00:00Z","type":"agent.message","payload":{}}"#;
        let env = parse_tail_line((10, line.to_string())).unwrap();
        assert_eq!(env.seq, 10 + line.as_bytes().len() as u64 + 1);
        assert_eq!(env.kind, EnvelopeKind::AgentMessage);
    }

    #[test]
    fn blank_line_is_rejected() {
        assert!(parse_tail_line((0, "   ".to_string())).is_err());
    }
}
