// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("content service request timed out")]
    Timeout,

    #[error("content service error: {0}")]
    Other(String),
}

impl ContentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::NotFound(_) => ErrorKind::NotFound,
            ContentError::Unauthorized => ErrorKind::Unauthorized,
            ContentError::Forbidden(_) => ErrorKind::Forbidden,
            ContentError::Timeout => ErrorKind::Transient,
            ContentError::Other(_) => ErrorKind::Fatal,
        }
    }
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ContentError::Timeout;
        }
        match err.status().map(|s| s.as_u16()) {
            Some(404) => ContentError::NotFound(err.to_string()),
            Some(401) => ContentError::Unauthorized,
            Some(403) => ContentError::Forbidden(err.to_string()),
            _ => ContentError::Other(err.to_string()),
        }
    }
}
