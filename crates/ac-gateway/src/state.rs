// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared request context: one struct handed to every handler, holding the
//! guarded registries and adapters a request might need.

use crate::access_cache::AccessReviewCache;
use crate::client_factory::UserClientFactory;
use ac_channel::ChannelHub;
use ac_cluster::ClusterAdapter;
use ac_content::ContentAdapter;
use std::sync::Arc;
use std::time::Duration;

pub struct GatewayConfig {
    pub content_service_base: String,
    pub subscriber_queue_depth: usize,
    pub tailer_grace: Duration,
    pub access_review_cache_ttl: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn ClusterAdapter>,
    pub user_clients: Arc<dyn UserClientFactory>,
    pub content: Arc<dyn ContentAdapter>,
    pub channels: ChannelHub,
    pub access_cache: Arc<AccessReviewCache>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn ClusterAdapter>,
        user_clients: Arc<dyn UserClientFactory>,
        content: Arc<dyn ContentAdapter>,
        config: GatewayConfig,
    ) -> Self {
        let ttl = config.access_review_cache_ttl;
        Self { platform, user_clients, content, channels: ChannelHub::new(), access_cache: Arc::new(AccessReviewCache::new(ttl)), config: Arc::new(config) }
    }
}
