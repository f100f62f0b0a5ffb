// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoints for metrics and health probes.
//!
//! - `/metrics` - Prometheus text exposition of [`METRICS_REGISTRY`](crate::metrics::METRICS_REGISTRY)
//! - `/healthz` - liveness, OK whenever the process is serving
//! - `/readyz` - readiness, OK once the controller is running or waiting for
//!   the leader election lease
//!
//! Metrics and probes listen on separate addresses. When both addresses are
//! equal a single listener serves all three routes.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared readiness flag.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn mark_not_ready(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(readiness): State<Readiness>) -> impl IntoResponse {
    if readiness.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

async fn metrics() -> impl IntoResponse {
    match crate::metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                e.to_string(),
            )
        }
    }
}

/// Router serving `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics))
}

/// Router serving `/healthz` and `/readyz`.
pub fn probes_router(readiness: Readiness) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(readiness)
}

async fn serve_router(addr: SocketAddr, router: Router, what: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Serving {what}");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Serve metrics and probes until a listener fails.
///
/// # Errors
///
/// Returns an error if an address cannot be bound or a server stops with an error.
pub async fn serve(
    metrics_addr: SocketAddr,
    probes_addr: SocketAddr,
    readiness: Readiness,
) -> anyhow::Result<()> {
    if metrics_addr == probes_addr {
        let router = metrics_router().merge(probes_router(readiness));
        return serve_router(metrics_addr, router, "metrics and health probes").await;
    }

    tokio::try_join!(
        serve_router(metrics_addr, metrics_router(), "metrics"),
        serve_router(probes_addr, probes_router(readiness), "health probes"),
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
