// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `VirtualMachineInstance` resources.
//!
//! kubevirt-dns follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - VMI changes arrive through the controller
//! 2. **Reconcile** - Derive the desired `DNSEndpoint` from the VMI
//! 3. **Update** - Create, update or delete the `DNSEndpoint` to match
//!
//! # Available Reconcilers
//!
//! - [`reconcile_vmi`] - Converges the `DNSEndpoint` of one VMI
//! - [`reconcile_vmi_with_deadline`] - `reconcile_vmi` bounded by a timeout
//! - [`upsert_dns_endpoint`] - Create-or-update step used by `reconcile_vmi`
//!
//! All cluster access goes through [`api::VmiDnsApi`].
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use kubevirt_dns::reconcilers::{api::KubeVmiDnsApi, reconcile_vmi};
//! use kube::Client;
//!
//! async fn reconcile_one(client: Client) -> anyhow::Result<()> {
//!     let api = KubeVmiDnsApi::new(client);
//!     let outcome = reconcile_vmi(&api, "vms", "web-01").await?;
//!     println!("{}", outcome.label());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod vmi;

pub use vmi::{
    reconcile_vmi, reconcile_vmi_with_deadline, upsert_dns_endpoint, ReconcileOutcome,
    UpsertOperation,
};
