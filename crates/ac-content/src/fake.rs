// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `ContentAdapter`, gated behind `feature = "test-support"` —
//! mirrors `ac-cluster`'s `FakeClusterAdapter` so the reconciler, gateway,
//! and channel hub can be unit-tested without a live content sidecar.

use crate::client::{ContentAdapter, FileEntry, TailLine};
use crate::error::ContentError;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    files: BTreeMap<(String, String), Vec<u8>>,
}

/// An in-memory content adapter keyed by `(namespace, path)`. `tail`
/// returns whatever is currently stored, split into lines, then ends —
/// there is no live-append simulation, since reconciler/channel tests seed
/// the content they need up front rather than racing a writer.
#[derive(Clone, Default)]
pub struct FakeContentAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeContentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_file(&self, namespace: &str, path: &str, bytes: impl Into<Vec<u8>>) {
        self.state.lock().files.insert((namespace.to_string(), path.to_string()), bytes.into());
    }

    pub fn get_file(&self, namespace: &str, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(&(namespace.to_string(), path.to_string())).cloned()
    }
}

#[async_trait]
impl ContentAdapter for FakeContentAdapter {
    async fn list(&self, _token: &str, namespace: &str, path: &str) -> Result<Vec<FileEntry>, ContentError> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        Ok(self
            .state
            .lock()
            .files
            .iter()
            .filter(|((ns, p), _)| ns == namespace && (p.starts_with(&prefix) || p == path))
            .map(|((_, p), bytes)| FileEntry {
                name: p.rsplit('/').next().unwrap_or(p).to_string(),
                path: p.clone(),
                is_dir: false,
                size: bytes.len() as u64,
                modified_at: Utc::now(),
            })
            .collect())
    }

    async fn read(&self, _token: &str, namespace: &str, path: &str) -> Result<Vec<u8>, ContentError> {
        self.state
            .lock()
            .files
            .get(&(namespace.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| ContentError::NotFound(path.to_string()))
    }

    async fn write(&self, _token: &str, namespace: &str, path: &str, bytes: Vec<u8>) -> Result<(), ContentError> {
        self.state.lock().files.insert((namespace.to_string(), path.to_string()), bytes);
        Ok(())
    }

    fn tail(&self, _token: &str, namespace: &str, path: &str, from_offset: u64) -> BoxStream<'static, Result<TailLine, ContentError>> {
        let bytes = self.state.lock().files.get(&(namespace.to_string(), path.to_string())).cloned().unwrap_or_default();
        let mut lines = Vec::new();
        let mut offset = 0u64;
        for raw in bytes.split(|b| *b == b'\n') {
            if raw.is_empty() && offset as usize >= bytes.len() {
                break;
            }
            let line_len = raw.len() as u64 + 1;
            if offset >= from_offset {
                lines.push(Ok((offset, String::from_utf8_lossy(raw).to_string())));
            }
            offset += line_len;
        }
        stream::iter(lines).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let fake = FakeContentAdapter::new();
        fake.write("t", "demo", "workspace/a.txt", b"hello".to_vec()).await.unwrap();
        let got = fake.read("t", "demo", "workspace/a.txt").await.unwrap();
        assert_eq!(got, b"hello");
    }

    #[tokio::test]
    async fn read_missing_path_is_not_found() {
        let fake = FakeContentAdapter::new();
        let err = fake.read("t", "demo", "nope").await.unwrap_err();
        assert_eq!(err.kind(), ac_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn tail_respects_from_offset() {
        let fake = FakeContentAdapter::new();
        fake.seed_file("demo", "messages.jsonl", b"one\ntwo\nthree\n".to_vec());
        let all: Vec<_> = fake.tail("t", "demo", "messages.jsonl", 0).collect().await;
        assert_eq!(all.len(), 3);
        let (second_offset, _) = all[1].as_ref().unwrap().clone();
        let resumed: Vec<_> = fake.tail("t", "demo", "messages.jsonl", second_offset).collect().await;
        assert_eq!(resumed.len(), 2);
    }
}
