// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token extraction and the access-review gate every user-initiated
//! request passes through before touching a resource.

use crate::access_cache::AccessReviewCache;
use crate::error::ApiError;
use ac_cluster::{AccessCheck, ClusterAdapter, UserInfo};
use axum::http::HeaderMap;

pub const FORWARDED_ACCESS_TOKEN_HEADER: &str = "x-forwarded-access-token";

/// Extracts the caller's bearer token from `Authorization: Bearer <token>`,
/// falling back to the forwarded-access-token header. Callers must never
/// log the returned value itself — only [`ac_core::redact::token_len_field`].
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| ApiError::MissingOrMalformedAuth)?;
        if let Some(token) = value.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
        return Err(ApiError::MissingOrMalformedAuth);
    }
    if let Some(value) = headers.get(FORWARDED_ACCESS_TOKEN_HEADER) {
        let token = value.to_str().map_err(|_| ApiError::MissingOrMalformedAuth)?;
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
    Err(ApiError::MissingOrMalformedAuth)
}

/// Runs a self-subject-access-review for `(verb, resource)` in `namespace`,
/// consulting and populating `cache` first. Returns `Ok(())` on allow,
/// `Err(ApiError::Forbidden)` on deny.
pub async fn require_access(
    cluster: &dyn ClusterAdapter,
    cache: &AccessReviewCache,
    token: &str,
    verb: &str,
    resource: &str,
    namespace: &str,
) -> Result<(), ApiError> {
    if let Some(allowed) = cache.get(token, verb, resource, namespace) {
        return if allowed { Ok(()) } else { Err(ApiError::Forbidden) };
    }
    let allowed = cluster
        .self_subject_access_review(AccessCheck { verb, resource, namespace: Some(namespace), name: None })
        .await?;
    cache.insert(token, verb, resource, namespace, allowed);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Resolves the caller's group memberships via the orchestrator's
/// identity provider. Never sufficient on its own for an authorization
/// decision — `require_access`'s review always still runs.
pub async fn resolve_user(cluster: &dyn ClusterAdapter) -> Result<UserInfo, ApiError> {
    Ok(cluster.user_info().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn falls_back_to_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_ACCESS_TOKEN_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn malformed_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
