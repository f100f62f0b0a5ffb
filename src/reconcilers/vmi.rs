// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `VirtualMachineInstance` reconciliation logic.
//!
//! Each pass fetches the VMI, derives the desired `DNSEndpoint` from its
//! hostname annotation and reported addresses, and converges the cluster:
//!
//! | VMI state                                   | Action                          |
//! |---------------------------------------------|---------------------------------|
//! | not found                                   | none (garbage collection)       |
//! | hostname annotation absent or blank         | delete the `DNSEndpoint`        |
//! | hostname present, no usable address yet     | none                            |
//! | hostname present, addresses resolved        | create or update `DNSEndpoint`  |
//!
//! A pass holds no state between runs; running it twice against unchanged
//! inputs issues no write the second time.

use crate::addresses::{select_best, AddressSource};
use crate::annotations::{hostname_annotation, parse_hostnames, parse_ttl, ttl_annotation};
use crate::constants::KIND_VIRTUAL_MACHINE_INSTANCE;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, VirtualMachineInstance};
use crate::endpoints::{
    build_dns_endpoint, build_endpoints, build_owner_reference, set_controller_reference,
};
use crate::errors::ReconcileError;
use crate::reconcilers::api::VmiDnsApi;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// What an upsert did to the `DNSEndpoint`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOperation {
    Created,
    Updated,
    Unchanged,
}

impl UpsertOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for UpsertOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The VMI no longer exists; its `DNSEndpoint` is left to garbage collection.
    VmiNotFound,
    /// No hostname annotation; the stale `DNSEndpoint` was deleted.
    Deleted,
    /// No hostname annotation and no `DNSEndpoint` to remove.
    NothingToDelete,
    /// Hostname annotation present but no source reported a usable address.
    AwaitingAddresses,
    /// Records were published from `source`.
    Published {
        source: AddressSource,
        operation: UpsertOperation,
        endpoints: usize,
    },
}

impl ReconcileOutcome {
    /// Short label used for metrics and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VmiNotFound => "vmi_not_found",
            Self::Deleted => "deleted",
            Self::NothingToDelete => "nothing_to_delete",
            Self::AwaitingAddresses => "awaiting_addresses",
            Self::Published { operation, .. } => operation.as_str(),
        }
    }
}

/// Reconcile the `DNSEndpoint` of the VMI `namespace/name`.
///
/// # Errors
///
/// Returns an error when any read or write against the API fails (other than
/// "not found", which is handled), or when the existing `DNSEndpoint` is
/// controlled by another object. All errors are meant to be retried.
#[instrument(skip(api))]
pub async fn reconcile_vmi<A>(
    api: &A,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, ReconcileError>
where
    A: VmiDnsApi + ?Sized,
{
    let Some(vmi) = api.get_vmi(namespace, name).await? else {
        debug!("VMI not found, DNSEndpoint cleanup is left to garbage collection");
        return Ok(ReconcileOutcome::VmiNotFound);
    };

    let Some(hostname) = hostname_annotation(&vmi) else {
        info!("Hostname annotation absent, ensuring DNSEndpoint is deleted");
        return delete_dns_endpoint_if_exists(api, namespace, name).await;
    };

    let resolved = select_best(&vmi);
    let Some(source) = resolved.source else {
        info!("Hostname annotation present but no IPs available yet, skipping");
        crate::metrics::record_skip("no_addresses");
        return Ok(ReconcileOutcome::AwaitingAddresses);
    };
    info!(
        source = %source,
        ipv4 = ?resolved.ipv4,
        ipv6 = ?resolved.ipv6,
        "Resolved VMI addresses"
    );
    crate::metrics::record_address_source(source.tag());

    let ttl = parse_ttl(ttl_annotation(&vmi));
    let hostnames = parse_hostnames(hostname);
    let endpoints = build_endpoints(&hostnames, &resolved.ipv4, &resolved.ipv6, ttl);
    let count = endpoints.len();

    let operation = upsert_dns_endpoint(api, &vmi, endpoints).await?;
    info!(operation = %operation, endpoints = count, "Reconciled DNSEndpoint");

    Ok(ReconcileOutcome::Published {
        source,
        operation,
        endpoints: count,
    })
}

/// Run [`reconcile_vmi`] under `deadline`.
///
/// # Errors
///
/// Returns [`ReconcileError::Timeout`] when the pass does not finish in time,
/// otherwise whatever [`reconcile_vmi`] returns.
pub async fn reconcile_vmi_with_deadline<A>(
    api: &A,
    namespace: &str,
    name: &str,
    deadline: Duration,
) -> Result<ReconcileOutcome, ReconcileError>
where
    A: VmiDnsApi + ?Sized,
{
    tokio::time::timeout(deadline, reconcile_vmi(api, namespace, name))
        .await
        .unwrap_or_else(|_| {
            Err(ReconcileError::Timeout {
                namespace: namespace.to_string(),
                name: name.to_string(),
                seconds: deadline.as_secs(),
            })
        })
}

async fn delete_dns_endpoint_if_exists<A>(
    api: &A,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, ReconcileError>
where
    A: VmiDnsApi + ?Sized,
{
    if api.get_dns_endpoint(namespace, name).await?.is_none() {
        debug!("No DNSEndpoint to delete");
        return Ok(ReconcileOutcome::NothingToDelete);
    }

    if api.delete_dns_endpoint(namespace, name).await? {
        info!("Deleted DNSEndpoint");
        crate::metrics::record_dns_endpoint_operation("deleted");
        Ok(ReconcileOutcome::Deleted)
    } else {
        debug!("DNSEndpoint disappeared before deletion");
        Ok(ReconcileOutcome::NothingToDelete)
    }
}

/// Create the VMI's `DNSEndpoint`, or bring an existing one in line.
///
/// An existing object keeps its metadata; only `spec.endpoints` and the
/// controller owner reference are rewritten. No write is issued when both
/// already match.
///
/// # Errors
///
/// Returns an error when the VMI has no namespace, an API call fails, or the
/// existing object is controlled by a different owner.
pub async fn upsert_dns_endpoint<A>(
    api: &A,
    vmi: &VirtualMachineInstance,
    endpoints: Vec<Endpoint>,
) -> Result<UpsertOperation, ReconcileError>
where
    A: VmiDnsApi + ?Sized,
{
    let name = vmi.name_any();
    let namespace = vmi
        .namespace()
        .ok_or_else(|| ReconcileError::MissingNamespace {
            kind: KIND_VIRTUAL_MACHINE_INSTANCE,
            name: name.clone(),
        })?;

    let Some(existing) = api.get_dns_endpoint(&namespace, &name).await? else {
        api.create_dns_endpoint(&build_dns_endpoint(vmi, endpoints))
            .await?;
        crate::metrics::record_dns_endpoint_operation(UpsertOperation::Created.as_str());
        return Ok(UpsertOperation::Created);
    };

    let owners = set_controller_reference(existing.owner_references(), build_owner_reference(vmi))
        .map_err(|owner| ReconcileError::AlreadyOwned {
            namespace: namespace.clone(),
            name: name.clone(),
            owner_kind: owner.kind,
            owner_name: owner.name,
        })?;

    if existing.spec.endpoints == endpoints && existing.owner_references() == owners.as_slice() {
        debug!("DNSEndpoint already up to date");
        crate::metrics::record_dns_endpoint_operation(UpsertOperation::Unchanged.as_str());
        return Ok(UpsertOperation::Unchanged);
    }

    let updated = DNSEndpoint {
        metadata: ObjectMeta {
            owner_references: Some(owners),
            ..existing.metadata
        },
        spec: DNSEndpointSpec { endpoints },
        status: existing.status,
    };
    api.replace_dns_endpoint(&updated).await?;
    crate::metrics::record_dns_endpoint_operation(UpsertOperation::Updated.as_str());
    Ok(UpsertOperation::Updated)
}

#[cfg(test)]
#[path = "vmi_tests.rs"]
mod vmi_tests;
