// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ambient-code-server`: the gateway HTTP/WebSocket surface and the
//! session reconciler running in one process, sharing one cancellation
//! token for shutdown.

mod config;
mod logging;

use ac_cluster::{platform_client, KubeClusterAdapter};
use ac_content::HttpContentAdapter;
use ac_gateway::{AppState, GatewayConfig, KubeUserClientFactory};
use ac_reconciler::ReconcilerConfig;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(config::log_format());

    let http_addr = config::http_addr();
    let namespaces = config::namespaces()?;
    let runner_image = config::runner_image()?;
    let resync_interval = config::resync_interval()?;
    let shutdown_drain = config::shutdown_drain()?;

    let client = platform_client().await?;
    let platform: Arc<dyn ac_cluster::ClusterAdapter> = Arc::new(KubeClusterAdapter::new(client));
    let http = reqwest::Client::builder().build()?;
    let content: Arc<dyn ac_content::ContentAdapter> = Arc::new(HttpContentAdapter::new(http, config::content_service_base()));

    let gateway_config = GatewayConfig {
        content_service_base: config::content_service_base(),
        subscriber_queue_depth: config::subscriber_queue_depth()?,
        tailer_grace: config::tailer_grace()?,
        access_review_cache_ttl: config::access_review_cache_ttl()?,
    };
    let app_state = AppState::new(platform.clone(), Arc::new(KubeUserClientFactory), content.clone(), gateway_config);
    let router = axum::Router::new().nest("/api/projects/:project", ac_gateway::router(app_state));

    let reconciler_config = ReconcilerConfig {
        runner_image,
        state_base_dir: config::state_base_dir(),
        content_service_base: config::content_service_base(),
        runner_token_ttl_secs: config::runner_token_ttl_secs()?,
        backoff_failure_window: config::backoff_failure_window()?,
        workers: config::reconcile_workers()?,
    };

    let cancel = CancellationToken::new();
    let reconciler = ac_reconciler::spawn(platform, content, reconciler_config, namespaces, resync_interval, cancel.clone());

    let listener = tokio::net::TcpListener::bind(http_addr.as_str()).await?;
    tracing::info!(addr = %http_addr, "ambient-code-server listening");

    let server_cancel = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_cancel.cancel();
        })
        .await?;

    tracing::info!(drain_secs = shutdown_drain.as_secs(), "draining reconciler tasks");
    let drained = tokio::time::timeout(shutdown_drain, futures::future::join_all(reconciler.tasks)).await;
    if drained.is_err() {
        tracing::warn!("reconciler tasks did not finish draining within the shutdown window");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
