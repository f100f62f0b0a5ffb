// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders for the `DNSEndpoint` published for a `VirtualMachineInstance`.
//!
//! # Example
//!
//! ```rust
//! use kubevirt_dns::endpoints::build_endpoints;
//!
//! let hostnames = vec!["vm.example.com".to_string()];
//! let ipv4 = vec!["192.168.1.1".to_string()];
//! let ipv6 = vec!["2001:db8::1".to_string()];
//!
//! let endpoints = build_endpoints(&hostnames, &ipv4, &ipv6, 300);
//! assert_eq!(endpoints.len(), 2);
//! assert_eq!(endpoints[0].record_type, "A");
//! assert_eq!(endpoints[1].record_type, "AAAA");
//! ```

use crate::constants::{RECORD_TYPE_A, RECORD_TYPE_AAAA};
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, VirtualMachineInstance};
use crate::labels::{K8S_MANAGED_BY, MANAGED_BY_KUBEVIRT_DNS};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Address record types published by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
}

impl RecordType {
    /// The external-dns `recordType` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => RECORD_TYPE_A,
            Self::AAAA => RECORD_TYPE_AAAA,
        }
    }
}

fn endpoint(hostname: &str, record_type: RecordType, targets: &[String], ttl: i64) -> Endpoint {
    Endpoint {
        dns_name: hostname.to_string(),
        targets: targets.to_vec(),
        record_type: record_type.as_str().to_string(),
        record_ttl: Some(ttl),
        ..Default::default()
    }
}

/// Builds the record declarations for a set of hostnames.
///
/// For each hostname, in order, emits one A record carrying every IPv4 target
/// and one AAAA record carrying every IPv6 target. A family with no addresses
/// produces no record, so no declaration ever has an empty target list.
#[must_use]
pub fn build_endpoints(
    hostnames: &[String],
    ipv4: &[String],
    ipv6: &[String],
    ttl: i64,
) -> Vec<Endpoint> {
    let mut endpoints = Vec::with_capacity(hostnames.len() * 2);

    for hostname in hostnames {
        if !ipv4.is_empty() {
            endpoints.push(endpoint(hostname, RecordType::A, ipv4, ttl));
        }
        if !ipv6.is_empty() {
            endpoints.push(endpoint(hostname, RecordType::AAAA, ipv6, ttl));
        }
    }

    endpoints
}

/// Builds the controller owner reference pointing at the VMI.
///
/// Deleting the VMI cascades to the `DNSEndpoint` through Kubernetes garbage
/// collection.
#[must_use]
pub fn build_owner_reference(vmi: &VirtualMachineInstance) -> OwnerReference {
    OwnerReference {
        api_version: VirtualMachineInstance::api_version(&()).to_string(),
        kind: VirtualMachineInstance::kind(&()).to_string(),
        name: vmi.name_any(),
        uid: vmi.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Builds the desired `DNSEndpoint` for a VMI: same name and namespace,
/// owned by the VMI, carrying `endpoints`.
#[must_use]
pub fn build_dns_endpoint(vmi: &VirtualMachineInstance, endpoints: Vec<Endpoint>) -> DNSEndpoint {
    let labels = BTreeMap::from([(
        K8S_MANAGED_BY.to_string(),
        MANAGED_BY_KUBEVIRT_DNS.to_string(),
    )]);

    DNSEndpoint {
        metadata: ObjectMeta {
            name: Some(vmi.name_any()),
            namespace: vmi.namespace(),
            labels: Some(labels),
            owner_references: Some(vec![build_owner_reference(vmi)]),
            ..Default::default()
        },
        spec: DNSEndpointSpec { endpoints },
        status: None,
    }
}

fn api_group(api_version: &str) -> &str {
    api_version.split_once('/').map_or("", |(group, _)| group)
}

/// Owner references name the same object when group, kind and name match.
///
/// The UID is ignored so a VMI recreated under the same name adopts the
/// `DNSEndpoint` left behind by its predecessor.
#[must_use]
pub fn refers_to_same_object(a: &OwnerReference, b: &OwnerReference) -> bool {
    api_group(&a.api_version) == api_group(&b.api_version) && a.kind == b.kind && a.name == b.name
}

/// Inserts or refreshes `controller` in a list of owner references.
///
/// Existing references to the same object are replaced in place; unrelated
/// non-controller references are kept.
///
/// # Errors
///
/// Returns the conflicting reference when a different object already holds
/// the controller reference.
pub fn set_controller_reference(
    existing: &[OwnerReference],
    controller: OwnerReference,
) -> Result<Vec<OwnerReference>, OwnerReference> {
    if let Some(other) = existing
        .iter()
        .find(|owner| owner.controller == Some(true) && !refers_to_same_object(owner, &controller))
    {
        return Err(other.clone());
    }

    let mut owners = existing.to_vec();
    match owners
        .iter_mut()
        .find(|owner| refers_to_same_object(owner, &controller))
    {
        Some(slot) => *slot = controller,
        None => owners.push(controller),
    }
    Ok(owners)
}

#[cfg(test)]
#[path = "endpoints_tests.rs"]
mod endpoints_tests;
