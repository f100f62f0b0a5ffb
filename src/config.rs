// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment variable named in its
//! help text, which is how the controller is usually configured in a pod.

use crate::constants::{
    DEFAULT_HEALTH_PROBE_BIND_ADDRESS, DEFAULT_LEADER_ELECTION_ID, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_RECONCILE_TIMEOUT_SECS, ERROR_REQUEUE_DURATION_SECS,
};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Publishes external-dns `DNSEndpoint` records for annotated KubeVirt VMIs
#[derive(Parser, Debug, Clone)]
#[command(name = "kubevirt-dns", version, about)]
pub struct Config {
    /// Address the Prometheus metrics endpoint binds to
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Address the /healthz and /readyz probes bind to
    #[arg(
        long,
        env = "HEALTH_PROBE_BIND_ADDRESS",
        default_value = DEFAULT_HEALTH_PROBE_BIND_ADDRESS
    )]
    pub health_probe_bind_address: SocketAddr,

    /// Enable leader election so only one replica reconciles at a time
    #[arg(long, env = "LEADER_ELECT")]
    pub leader_elect: bool,

    /// Name of the Lease used for leader election
    #[arg(long, env = "LEADER_ELECTION_ID", default_value = DEFAULT_LEADER_ELECTION_ID)]
    pub leader_election_id: String,

    /// Namespace holding the leader election Lease
    #[arg(long, env = "POD_NAMESPACE", default_value = "default")]
    pub leader_election_namespace: String,

    /// Identity recorded as Lease holder (defaults to the pod name)
    #[arg(long, env = "POD_NAME")]
    pub leader_election_identity: Option<String>,

    /// Restrict the watch to one namespace (cluster-wide when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Upper bound for a single reconciliation pass, in seconds
    #[arg(
        long,
        env = "RECONCILE_TIMEOUT_SECS",
        default_value_t = DEFAULT_RECONCILE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub reconcile_timeout_secs: u64,

    /// Delay before a failed reconciliation is retried, in seconds
    #[arg(
        long,
        env = "ERROR_REQUEUE_SECS",
        default_value_t = ERROR_REQUEUE_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub error_requeue_secs: u64,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, ignore_case = true)]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }

    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    /// Lease holder identity: the explicit flag, then `HOSTNAME`, then the
    /// binary name.
    #[must_use]
    pub fn identity(&self) -> String {
        self.leader_election_identity
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| "kubevirt-dns".to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
