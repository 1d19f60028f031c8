// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy at the HTTP boundary. Every handler returns
//! `Result<T, ApiError>`; `ApiError` maps 1:1 onto an `ac_core::ErrorKind`
//! so the status code a caller sees always matches the classification the
//! rest of the workspace agrees on.

use ac_core::ErrorKind;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid Authorization header")]
    MissingOrMalformedAuth,

    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream error: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingOrMalformedAuth => ErrorKind::Unauthorized,
            ApiError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApiError::Forbidden => ErrorKind::Forbidden,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Transient(_) => ErrorKind::Transient,
            ApiError::Internal(_) => ErrorKind::Fatal,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorBody { error: self.to_string() });
        (status, body).into_response()
    }
}

impl From<ac_cluster::ClusterError> for ApiError {
    fn from(err: ac_cluster::ClusterError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound,
            ErrorKind::Forbidden => ApiError::Forbidden,
            ErrorKind::Unauthorized => ApiError::MissingOrMalformedAuth,
            ErrorKind::Conflict => ApiError::Conflict(err.to_string()),
            ErrorKind::Transient => ApiError::Transient(err.to_string()),
            ErrorKind::InvalidInput | ErrorKind::Fatal => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ac_content::ContentError> for ApiError {
    fn from(err: ac_content::ContentError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound,
            ErrorKind::Forbidden => ApiError::Forbidden,
            ErrorKind::Unauthorized => ApiError::MissingOrMalformedAuth,
            ErrorKind::Conflict => ApiError::Conflict(err.to_string()),
            ErrorKind::Transient => ApiError::Transient(err.to_string()),
            ErrorKind::InvalidInput | ErrorKind::Fatal => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(ApiError::Forbidden.kind().http_status(), 403);
    }

    #[test]
    fn missing_auth_maps_to_401() {
        assert_eq!(ApiError::MissingOrMalformedAuth.kind().http_status(), 401);
    }
}
