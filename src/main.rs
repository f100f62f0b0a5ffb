// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{bail, Result};
use clap::Parser;
use kube::Client;
use kubevirt_dns::{
    config::{Config, LogFormat},
    context::{Context, Settings},
    controller::run_vmi_controller,
    discovery::verify_required_apis,
    leader::LeaderLease,
    server::{self, Readiness},
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Why the controller was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    Signal,
    LeaseLost,
}

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("kubevirt-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

fn init_tracing(format: LogFormat) {
    // Respects RUST_LOG if set, otherwise defaults to INFO level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: Config) -> Result<()> {
    init_tracing(config.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting kubevirt-dns controller");
    debug!(?config, "Loaded configuration");

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    verify_required_apis(&client).await?;

    let readiness = Readiness::new();
    let mut server_task = tokio::spawn(server::serve(
        config.metrics_bind_address,
        config.health_probe_bind_address,
        readiness.clone(),
    ));

    let mut lease = if config.leader_elect {
        let mut lease = LeaderLease::start(
            client.clone(),
            &config.leader_election_id,
            &config.leader_election_namespace,
            &config.identity(),
        )
        .await?;

        // Followers are healthy and ready while they wait for the lease.
        readiness.mark_ready();

        let acquired = tokio::select! {
            result = lease.acquired() => Some(result),
            () = shutdown_signal() => None,
        };
        match acquired {
            Some(result) => result?,
            None => {
                lease.release().await;
                info!("Graceful shutdown completed before acquiring leadership");
                return Ok(());
            }
        }
        Some(lease)
    } else {
        None
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let watchdog = tokio::spawn(async move {
        let reason = match lease.as_mut() {
            Some(held) => tokio::select! {
                () = shutdown_signal() => ShutdownReason::Signal,
                () = held.lost() => ShutdownReason::LeaseLost,
            },
            None => {
                shutdown_signal().await;
                ShutdownReason::Signal
            }
        };
        info!(?reason, "Stopping controller");
        let _ = shutdown_tx.send(());
        (reason, lease)
    });

    let context = Arc::new(Context::new(
        client,
        Settings::from(&config),
        readiness.clone(),
    ));
    let shutdown = async move {
        let _ = shutdown_rx.await;
    };

    tokio::select! {
        result = run_vmi_controller(context, shutdown) => result?,
        joined = &mut server_task => {
            error!(result = ?joined, "CRITICAL: metrics/probe server exited unexpectedly");
            match joined {
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(e.into()),
                Ok(Ok(())) => bail!("metrics/probe server exited unexpectedly without error"),
            }
        }
    }
    readiness.mark_not_ready();

    if !watchdog.is_finished() {
        watchdog.abort();
        bail!("controller exited unexpectedly");
    }

    let (reason, lease) = watchdog.await?;
    if let Some(lease) = lease {
        info!("Releasing leader election lease");
        lease.release().await;
    }

    match reason {
        ShutdownReason::Signal => {
            info!("Graceful shutdown completed successfully");
            Ok(())
        }
        ShutdownReason::LeaseLost => bail!("lost leader election lease"),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown..."),
        () = terminate => info!("Received SIGTERM (pod termination), initiating graceful shutdown..."),
    }
}
