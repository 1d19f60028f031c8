// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster adapter errors, classified into the shared error taxonomy.

use ac_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("cluster error: {0}")]
    Other(String),
}

impl ClusterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClusterError::NotFound(_) => ErrorKind::NotFound,
            ClusterError::Forbidden(_) => ErrorKind::Forbidden,
            ClusterError::Conflict(_) => ErrorKind::Conflict,
            ClusterError::Timeout(_) => ErrorKind::Transient,
            ClusterError::Other(_) => ErrorKind::Fatal,
        }
    }
}

/// Classify a raw `kube::Error` into our taxonomy. Not-found during
/// cleanup/reconciliation is handled by the caller (it is not, itself, an
/// error kind distinct from `NotFound` — callers choose to ignore it where
/// appropriate).
impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(api_err) => match api_err.code {
                404 => ClusterError::NotFound(api_err.message.clone()),
                403 => ClusterError::Forbidden(api_err.message.clone()),
                409 => ClusterError::Conflict(api_err.message.clone()),
                408 | 504 => ClusterError::Timeout(api_err.message.clone()),
                _ => ClusterError::Other(api_err.message.clone()),
            },
            other => ClusterError::Other(other.to_string()),
        }
    }
}
