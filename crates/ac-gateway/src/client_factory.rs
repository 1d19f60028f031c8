// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a user-scoped `ClusterAdapter` per request. Kept behind a trait
//! so route handlers and their tests don't depend on a live `kube::Client`.

use crate::error::ApiError;
use ac_cluster::{client_for_token, ClusterAdapter, KubeClusterAdapter};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserClientFactory: Send + Sync {
    async fn for_token(&self, token: &str) -> Result<Arc<dyn ClusterAdapter>, ApiError>;
}

/// Production factory: one `kube::Client` per request, bound to the
/// caller's own token — never the platform identity.
pub struct KubeUserClientFactory;

#[async_trait]
impl UserClientFactory for KubeUserClientFactory {
    async fn for_token(&self, token: &str) -> Result<Arc<dyn ClusterAdapter>, ApiError> {
        let client = client_for_token(token).await?;
        Ok(Arc::new(KubeClusterAdapter::new(client)))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use ac_cluster::FakeClusterAdapter;

    /// Hands back the same shared fake regardless of token — the gateway's
    /// own tests drive access decisions via `FakeClusterAdapter::set_access_allowed`
    /// rather than by varying the token.
    pub struct FakeUserClientFactory {
        pub adapter: FakeClusterAdapter,
    }

    #[async_trait]
    impl UserClientFactory for FakeUserClientFactory {
        async fn for_token(&self, _token: &str) -> Result<Arc<dyn ClusterAdapter>, ApiError> {
            Ok(Arc::new(self.adapter.clone()))
        }
    }
}
