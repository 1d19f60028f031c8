// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContentAdapter`: the control plane's only path to files under a
//! session's state directory. Every call forwards the caller's own bearer
//! token to the sidecar — the adapter never substitutes the platform
//! identity, even for reconciler-initiated reads.

use crate::error::ContentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// One entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// One line read via `tail`, paired with the byte offset it started at so
/// a client can resume a dropped stream with `fromOffset`.
pub type TailLine = (u64, String);

#[async_trait]
pub trait ContentAdapter: Send + Sync {
    async fn list(&self, token: &str, namespace: &str, path: &str) -> Result<Vec<FileEntry>, ContentError>;

    async fn read(&self, token: &str, namespace: &str, path: &str) -> Result<Vec<u8>, ContentError>;

    async fn write(&self, token: &str, namespace: &str, path: &str, bytes: Vec<u8>) -> Result<(), ContentError>;

    /// Streams lines from `path` starting at `from_offset`, staying open for
    /// lines written after the call starts (the sidecar's tail semantics).
    fn tail(&self, token: &str, namespace: &str, path: &str, from_offset: u64) -> BoxStream<'static, Result<TailLine, ContentError>>;
}

/// Reaches the per-namespace content sidecar over HTTP.
///
/// `base` is `CONTENT_SERVICE_BASE` with `%s` already substituted for the
/// namespace by the caller that constructs this adapter per-request, or a
/// format string substituted here — we take the latter so one instance can
/// serve every namespace.
#[derive(Clone)]
pub struct HttpContentAdapter {
    http: reqwest::Client,
    base_template: String,
}

impl HttpContentAdapter {
    pub fn new(http: reqwest::Client, base_template: String) -> Self {
        Self { http, base_template }
    }

    fn base_url(&self, namespace: &str) -> String {
        self.base_template.replacen("%s", namespace, 1)
    }

    fn response_error(status: reqwest::StatusCode, body: String) -> ContentError {
        match status.as_u16() {
            404 => ContentError::NotFound(body),
            401 => ContentError::Unauthorized,
            403 => ContentError::Forbidden(body),
            408 | 504 => ContentError::Timeout,
            _ => ContentError::Other(format!("{status}: {body}")),
        }
    }
}

#[async_trait]
impl ContentAdapter for HttpContentAdapter {
    async fn list(&self, token: &str, namespace: &str, path: &str) -> Result<Vec<FileEntry>, ContentError> {
        let url = format!("{}/list", self.base_url(namespace));
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("path", path)])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Self::response_error(status, resp.text().await.unwrap_or_default()));
        }
        Ok(resp.json::<Vec<FileEntry>>().await?)
    }

    async fn read(&self, token: &str, namespace: &str, path: &str) -> Result<Vec<u8>, ContentError> {
        let url = format!("{}/read", self.base_url(namespace));
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("path", path)])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Self::response_error(status, resp.text().await.unwrap_or_default()));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn write(&self, token: &str, namespace: &str, path: &str, bytes: Vec<u8>) -> Result<(), ContentError> {
        let url = format!("{}/write", self.base_url(namespace));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .query(&[("path", path)])
            .body(bytes)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Self::response_error(status, resp.text().await.unwrap_or_default()));
        }
        Ok(())
    }

    fn tail(&self, token: &str, namespace: &str, path: &str, from_offset: u64) -> BoxStream<'static, Result<TailLine, ContentError>> {
        let http = self.http.clone();
        let url = format!("{}/tail", self.base_url(namespace));
        let token = token.to_string();
        let path = path.to_string();
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let resp = match http
                .get(&url)
                .bearer_auth(&token)
                .query(&[("path", path.as_str()), ("fromOffset", from_offset.to_string().as_str())])
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(Err(ContentError::from(e))).await;
                    return;
                }
            };
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let _ = tx.send(Err(HttpContentAdapter::response_error(status, body))).await;
                return;
            }

            let mut offset = from_offset;
            let mut byte_stream = resp.bytes_stream();
            let mut carry = Vec::new();
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(ContentError::from(e))).await;
                        return;
                    }
                };
                carry.extend_from_slice(&chunk);
                while let Some(pos) = carry.iter().position(|b| *b == b'\n') {
                    let line_bytes: Vec<u8> = carry.drain(..=pos).collect();
                    let line_len = line_bytes.len() as u64;
                    let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]).to_string();
                    let this_offset = offset;
                    offset += line_len;
                    if tx.send(Ok((this_offset, line))).await.is_err() {
                        return;
                    }
                }
            }
        });

        ReceiverStream::new(rx).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_substitutes_namespace() {
        let adapter = HttpContentAdapter::new(reqwest::Client::new(), "http://ambient-content.%s.svc:8080".to_string());
        assert_eq!(adapter.base_url("demo"), "http://ambient-content.demo.svc:8080");
    }

    #[test]
    fn response_error_maps_status_to_kind() {
        assert_eq!(HttpContentAdapter::response_error(reqwest::StatusCode::NOT_FOUND, "x".into()).kind(), ac_core::ErrorKind::NotFound);
        assert_eq!(HttpContentAdapter::response_error(reqwest::StatusCode::FORBIDDEN, "x".into()).kind(), ac_core::ErrorKind::Forbidden);
        assert_eq!(HttpContentAdapter::response_error(reqwest::StatusCode::REQUEST_TIMEOUT, "x".into()).kind(), ac_core::ErrorKind::Transient);
    }
}
