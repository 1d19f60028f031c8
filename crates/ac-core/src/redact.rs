// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token redaction helpers: no log record may contain a substring matching
//! `Bearer [A-Za-z0-9_.-]+`, and `token=` query-string values must be
//! redacted.
//!
//! Kept dependency-free (no `regex`) since this runs on every tracing
//! event; a couple of linear scans over short strings is cheaper and
//! avoids pulling a regex engine into the hot logging path.

/// Replace any `Bearer <token>` substring with `Bearer [REDACTED]`.
pub fn redact_bearer(input: &str) -> String {
    const PREFIX: &str = "Bearer ";
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(PREFIX) {
        out.push_str(&rest[..pos]);
        out.push_str("Bearer [REDACTED]");
        let after = &rest[pos + PREFIX.len()..];
        let token_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'))
            .unwrap_or(after.len());
        rest = &after[token_len..];
    }
    out.push_str(rest);
    out
}

/// Replace `token=<value>` in a query string with `token=[REDACTED]`.
pub fn redact_token_query_param(input: &str) -> String {
    const NEEDLE: &str = "token=";
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(NEEDLE) {
        out.push_str(&rest[..pos]);
        out.push_str("token=[REDACTED]");
        let after = &rest[pos + NEEDLE.len()..];
        let value_len = after.find(['&', ' ']).unwrap_or(after.len());
        rest = &after[value_len..];
    }
    out.push_str(rest);
    out
}

/// `tokenLen=<n>` — the only length-carrying, value-free field callers may
/// log about a bearer token.
pub fn token_len_field(token: &str) -> usize {
    token.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_token_in_header_value() {
        let input = "Authorization: Bearer abc123.def-456_ghi extra text";
        let redacted = redact_bearer(input);
        assert_eq!(redacted, "Authorization: Bearer [REDACTED] extra text");
        assert!(!redacted.contains("abc123"));
    }

    #[test]
    fn redacts_multiple_bearer_occurrences() {
        let input = "first Bearer aaa then Bearer bbb";
        let redacted = redact_bearer(input);
        assert_eq!(redacted, "first Bearer [REDACTED] then Bearer [REDACTED]");
    }

    #[test]
    fn leaves_non_bearer_text_untouched() {
        let input = "no secrets here";
        assert_eq!(redact_bearer(input), input);
    }

    #[test]
    fn redacts_token_query_param() {
        let input = "GET /api/x?token=supersecret&foo=bar";
        let redacted = redact_token_query_param(input);
        assert_eq!(redacted, "GET /api/x?token=[REDACTED]&foo=bar");
    }

    #[cfg(feature = "test-support")]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Invariant 3: after redaction, no substring matches the
            /// bearer-token pattern with actual token bytes remaining.
            #[test]
            fn redacted_output_never_retains_token_bytes(token in "[A-Za-z0-9_.-]{1,40}") {
                let input = format!("Authorization: Bearer {token}");
                let redacted = redact_bearer(&input);
                prop_assert!(!redacted.contains(&token) || token.is_empty());
            }
        }
    }
}
