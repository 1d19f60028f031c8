// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox write path: `POST /messages` and inbound WS frames both land here.
//! Always authored with the caller's own token — never the platform
//! identity.

use ac_content::{ContentAdapter, ContentError};

/// Keeps only the characters that are safe in a single path segment, so a
/// caller-supplied key can be used directly as a filename stem.
fn sanitize_key(key: &str) -> String {
    key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' }).collect()
}

/// Writes `body` under `<stateDir>/<inbox_path>/<key>.json`. The runner
/// sorts entries by filename, so callers that care about delivery order
/// should pick a lexically-monotonic key (a timestamp prefix, a ULID).
///
/// Re-submitting the same key is a no-op: if a file with that name already
/// exists, the write is skipped and the existing path is returned, so a
/// retried request never produces a second inbox file.
pub async fn write_inbox_message(
    content: &dyn ContentAdapter,
    token: &str,
    namespace: &str,
    state_dir: &str,
    inbox_path: &str,
    key: &str,
    body: Vec<u8>,
) -> Result<String, ContentError> {
    let inbox_path = inbox_path.trim_end_matches('/');
    let path = format!("{state_dir}/{inbox_path}/{}.json", sanitize_key(key));
    match content.read(token, namespace, &path).await {
        Ok(_) => return Ok(path),
        Err(ContentError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    content.write(token, namespace, &path, body).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_content::FakeContentAdapter;

    #[tokio::test]
    async fn writes_under_inbox_with_key_derived_name() {
        let content = FakeContentAdapter::new();
        let path = write_inbox_message(&content, "tok", "demo", "/state/s1", "inbox", "msg-1", b"{}".to_vec()).await.unwrap();
        assert_eq!(path, "/state/s1/inbox/msg-1.json");
        assert_eq!(content.get_file("demo", &path).unwrap(), b"{}");
    }

    #[tokio::test]
    async fn retry_with_same_key_does_not_duplicate() {
        let content = FakeContentAdapter::new();
        let first = write_inbox_message(&content, "tok", "demo", "/state/s1", "inbox", "msg-1", b"{\"a\":1}".to_vec()).await.unwrap();
        let second = write_inbox_message(&content, "tok", "demo", "/state/s1", "inbox", "msg-1", b"{\"a\":2}".to_vec()).await.unwrap();
        assert_eq!(first, second);
        // The retry's body is discarded; the first write wins.
        assert_eq!(content.get_file("demo", &first).unwrap(), b"{\"a\":1}");
    }

    #[tokio::test]
    async fn different_keys_produce_different_files() {
        let content = FakeContentAdapter::new();
        let a = write_inbox_message(&content, "tok", "demo", "/state/s1", "inbox", "msg-1", b"{}".to_vec()).await.unwrap();
        let b = write_inbox_message(&content, "tok", "demo", "/state/s1", "inbox", "msg-2", b"{}".to_vec()).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sanitize_key_strips_path_separators() {
        assert_eq!(sanitize_key("../../etc/passwd"), "______etc_passwd");
    }
}
