// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ac-content: HTTP client for the per-namespace content sidecar.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::{ContentAdapter, FileEntry, HttpContentAdapter, TailLine};
pub use error::ContentError;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeContentAdapter;
