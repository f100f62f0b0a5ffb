// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the VMI controller.
//!
//! The controller receives an `Arc<Context>` holding:
//! - the Kubernetes client
//! - the API collaborator used by the reconciler
//! - runtime settings derived from [`Config`]
//! - the readiness flag served on `/readyz`

use crate::config::Config;
use crate::reconcilers::api::{KubeVmiDnsApi, VmiDnsApi};
use crate::server::Readiness;
use kube::Client;
use std::sync::Arc;
use std::time::Duration;

/// Controller tunables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Deadline applied to each reconciliation pass
    pub reconcile_timeout: Duration,
    /// Requeue delay after a failed pass
    pub error_requeue: Duration,
    /// Namespace to watch; `None` watches the whole cluster
    pub watch_namespace: Option<String>,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            reconcile_timeout: config.reconcile_timeout(),
            error_requeue: config.error_requeue(),
            watch_namespace: config
                .watch_namespace
                .clone()
                .filter(|ns| !ns.trim().is_empty()),
        }
    }
}

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for watches
    pub client: Client,

    /// API collaborator used by reconciliation passes
    pub api: Arc<dyn VmiDnsApi>,

    pub settings: Settings,

    pub readiness: Readiness,
}

impl Context {
    /// Build a context backed by the live cluster API.
    #[must_use]
    pub fn new(client: Client, settings: Settings, readiness: Readiness) -> Self {
        Self {
            api: Arc::new(KubeVmiDnsApi::new(client.clone())),
            client,
            settings,
            readiness,
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
