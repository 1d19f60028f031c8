// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization Gateway: the HTTP/WebSocket surface in front of the
//! cluster and content adapters. Every handler resolves a user-scoped
//! client from the caller's own bearer token before touching the cluster
//! or the content service.

pub mod access_cache;
pub mod auth;
pub mod client_factory;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use access_cache::AccessReviewCache;
pub use client_factory::{KubeUserClientFactory, UserClientFactory};
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, GatewayConfig};

#[cfg(any(test, feature = "test-support"))]
pub use client_factory::fake::FakeUserClientFactory;
