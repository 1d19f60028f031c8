// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the server binary: flat
//! typed getters, no builder.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required and was not set")]
    Missing(&'static str),
    #[error("{0} could not be parsed: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match var(name) {
        Some(s) => s.parse().map_err(|_| ConfigError::Invalid(name, s)),
        None => Ok(default),
    }
}

/// HTTP bind address for the gateway (`AC_HTTP_ADDR`, default
/// `0.0.0.0:8443`).
pub fn http_addr() -> String {
    var("AC_HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8443".to_string())
}

/// `json` (production default) or `pretty` (`AC_LOG_FORMAT=pretty`).
pub fn log_format() -> LogFormat {
    match var("AC_LOG_FORMAT").as_deref() {
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::Json,
    }
}

/// Reconciler worker pool size (`AC_RECONCILE_WORKERS`, default 4).
pub fn reconcile_workers() -> Result<usize, ConfigError> {
    Ok(parse_u64("AC_RECONCILE_WORKERS", 4)? as usize)
}

/// `TokenRequest` duration minted for the runner identity
/// (`AC_RUNNER_TOKEN_TTL_SECS`, default 3600).
pub fn runner_token_ttl_secs() -> Result<i64, ConfigError> {
    Ok(parse_u64("AC_RUNNER_TOKEN_TTL_SECS", 3600)? as i64)
}

/// `ImagePullBackOff`/`CrashLoopBackOff` failure window
/// (`AC_BACKOFF_FAILURE_WINDOW_SECS`, default 300).
pub fn backoff_failure_window() -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_u64("AC_BACKOFF_FAILURE_WINDOW_SECS", 300)?))
}

/// Per-subscriber bounded queue depth (`AC_SUBSCRIBER_QUEUE_DEPTH`,
/// default 256).
pub fn subscriber_queue_depth() -> Result<usize, ConfigError> {
    Ok(parse_u64("AC_SUBSCRIBER_QUEUE_DEPTH", 256)? as usize)
}

/// Tailer idle grace before it exits with zero subscribers
/// (`AC_TAILER_GRACE_SECS`, default 60).
pub fn tailer_grace() -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_u64("AC_TAILER_GRACE_SECS", 60)?))
}

/// `SelfSubjectAccessReview` cache TTL (`AC_ACCESS_REVIEW_CACHE_TTL_SECS`,
/// default 30).
pub fn access_review_cache_ttl() -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_u64("AC_ACCESS_REVIEW_CACHE_TTL_SECS", 30)?))
}

/// Grace period for in-flight requests/reconciles on shutdown
/// (`AC_SHUTDOWN_DRAIN_SECS`, default 30).
pub fn shutdown_drain() -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_u64("AC_SHUTDOWN_DRAIN_SECS", 30)?))
}

/// Content adapter base URL template, `%s` standing in for the namespace
/// (`CONTENT_SERVICE_BASE`, default `http://ambient-content.%s.svc:8080`).
pub fn content_service_base() -> String {
    var("CONTENT_SERVICE_BASE").unwrap_or_else(|| "http://ambient-content.%s.svc:8080".to_string())
}

/// Workspace PVC mount root (`STATE_BASE_DIR`, default `/workspace`).
pub fn state_base_dir() -> String {
    var("STATE_BASE_DIR").unwrap_or_else(|| "/workspace".to_string())
}

/// Runner container image; no sane default, a misconfigured deployment
/// should fail at startup rather than spawn sessions with an empty image.
pub fn runner_image() -> Result<String, ConfigError> {
    var("RUNNER_IMAGE").ok_or(ConfigError::Missing("RUNNER_IMAGE"))
}

/// GitLab pagination cap (`GITLAB_MAX_PAGINATION_PAGES`, default 100).
pub fn gitlab_max_pagination_pages() -> Result<u32, ConfigError> {
    Ok(parse_u64("GITLAB_MAX_PAGINATION_PAGES", 100)? as u32)
}

/// Namespaces this process reconciles and serves (`AC_NAMESPACES`,
/// comma-separated, required). Every `ClusterAdapter` accessor is
/// namespace-scoped (`Api::namespaced`, never `Api::all`), so something has
/// to tell the process which namespaces it owns.
pub fn namespaces() -> Result<Vec<String>, ConfigError> {
    let raw = var("AC_NAMESPACES").ok_or(ConfigError::Missing("AC_NAMESPACES"))?;
    let namespaces: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
    if namespaces.is_empty() {
        return Err(ConfigError::Invalid("AC_NAMESPACES", raw));
    }
    Ok(namespaces)
}

/// Interval for the reconciler's periodic full-list resync per namespace
/// (`AC_RESYNC_INTERVAL_SECS`, default 300), covering any watch event a
/// connection drop or relist gap dropped.
pub fn resync_interval() -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parse_u64("AC_RESYNC_INTERVAL_SECS", 300)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_apply_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("AC_HTTP_ADDR");
        std::env::remove_var("AC_LOG_FORMAT");
        assert_eq!(http_addr(), "0.0.0.0:8443");
        assert_eq!(log_format(), LogFormat::Json);
    }

    #[test]
    fn pretty_log_format_is_recognized() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("AC_LOG_FORMAT", "pretty");
        assert_eq!(log_format(), LogFormat::Pretty);
        std::env::remove_var("AC_LOG_FORMAT");
    }

    #[test]
    fn namespaces_splits_and_trims() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("AC_NAMESPACES", "a, b ,c");
        assert_eq!(namespaces().unwrap(), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        std::env::remove_var("AC_NAMESPACES");
    }

    #[test]
    fn runner_image_is_required() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("RUNNER_IMAGE");
        assert!(matches!(runner_image(), Err(ConfigError::Missing("RUNNER_IMAGE"))));
    }
}
