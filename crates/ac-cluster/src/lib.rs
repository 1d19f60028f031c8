// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ac-cluster: typed and dynamic access to orchestrator resources.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapter;
pub mod client_builder;
pub mod error;
pub mod kube_adapter;
pub mod pvc;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use adapter::{AccessCheck, ClusterAdapter, UserInfo};
pub use client_builder::{client_for_token, platform_client};
pub use error::ClusterError;
pub use kube_adapter::KubeClusterAdapter;
pub use pvc::WORKSPACE_PVC_NAME;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClusterAdapter;
