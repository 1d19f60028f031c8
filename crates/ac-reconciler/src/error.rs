// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler-local error taxonomy. Mirrors `ac-cluster`/`ac-content`:
//! one `thiserror` enum exposing `kind()` so the worker loop's retry
//! policy reads off `ac_core::ErrorKind::is_retryable` instead of
//! special-casing each upstream error type.

use ac_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Cluster(#[from] ac_cluster::ClusterError),

    #[error(transparent)]
    Content(#[from] ac_content::ContentError),

    #[error("required secret {0} not found")]
    MissingSecret(String),

    #[error("session cannot make progress: {0}")]
    Fatal(String),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Cluster(e) => e.kind(),
            ReconcileError::Content(e) => e.kind(),
            ReconcileError::MissingSecret(_) => ErrorKind::Fatal,
            ReconcileError::Fatal(_) => ErrorKind::Fatal,
        }
    }

    /// Recoverable failures requeue with backoff; non-recoverable ones set
    /// `phase=Error`.
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_is_not_recoverable() {
        assert!(!ReconcileError::MissingSecret("s".into()).is_recoverable());
    }
}
