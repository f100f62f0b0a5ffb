// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Leader election on a `coordination.k8s.io/v1` Lease.
//!
//! Only the replica holding the lease runs the controller. Followers keep
//! serving probes while they wait. A leader that loses the lease shuts down
//! so its pod restarts as a follower.

use crate::constants::{LEASE_DURATION_SECS, LEASE_GRACE_SECS};
use anyhow::{Context as _, Result};
use kube::Client;
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder, LeaseManagerError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A running lease watch.
pub struct LeaderLease {
    identity: String,
    channel: watch::Receiver<bool>,
    task: JoinHandle<Result<LeaseManager, LeaseManagerError>>,
}

impl LeaderLease {
    /// Start contending for the lease `name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease manager cannot be created.
    pub async fn start(
        client: Client,
        name: &str,
        namespace: &str,
        identity: &str,
    ) -> Result<Self> {
        info!(lease = %name, namespace = %namespace, identity = %identity, "Starting leader election");

        let manager = LeaseManagerBuilder::new(client, name)
            .with_namespace(namespace)
            .with_identity(identity)
            .with_duration(LEASE_DURATION_SECS)
            .with_grace(LEASE_GRACE_SECS)
            .build()
            .await
            .context("failed to create lease manager")?;

        let (channel, task) = manager.watch().await;
        Ok(Self {
            identity: identity.to_string(),
            channel,
            task,
        })
    }

    /// Wait until this replica holds the lease.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease manager stops.
    pub async fn acquired(&mut self) -> Result<()> {
        while !*self.channel.borrow_and_update() {
            debug!("Waiting for leader election lease");
            self.channel
                .changed()
                .await
                .context("lease manager stopped while waiting for leadership")?;
        }
        info!(identity = %self.identity, "Acquired leader election lease");
        crate::metrics::record_leader_elected(&self.identity);
        Ok(())
    }

    /// Resolves once the lease is lost or the lease manager stops.
    pub async fn lost(&mut self) {
        loop {
            if self.channel.changed().await.is_err() {
                warn!("Lease manager stopped");
                break;
            }
            if !*self.channel.borrow_and_update() {
                break;
            }
        }
        warn!(identity = %self.identity, "Lost leader election lease");
        crate::metrics::record_leader_lost(&self.identity);
    }

    /// Stop the watch and release the lease.
    pub async fn release(self) {
        let Self {
            identity,
            channel,
            task,
        } = self;
        drop(channel);
        match task.await {
            Ok(Ok(_manager)) => info!(identity = %identity, "Released leader election lease"),
            Ok(Err(e)) => warn!(error = %e, "Lease manager exited with error"),
            Err(e) => warn!(error = %e, "Lease manager task failed"),
        }
    }
}
