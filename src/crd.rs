// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource types consumed and produced by the controller.
//!
//! Neither kind is owned by this project. Only the fields the controller reads
//! or writes are modelled; unknown fields are ignored when deserializing.
//!
//! # Resource Types
//!
//! - [`VirtualMachineInstance`] - `kubevirt.io/v1`, read-only input
//! - [`DNSEndpoint`] - `externaldns.k8s.io/v1alpha1`, one per annotated VMI
//!
//! # Example: A desired `DNSEndpoint` spec
//!
//! ```rust
//! use kubevirt_dns::crd::{DNSEndpointSpec, Endpoint};
//!
//! let spec = DNSEndpointSpec {
//!     endpoints: vec![Endpoint {
//!         dns_name: "vm.example.com".to_string(),
//!         targets: vec!["192.0.2.10".to_string()],
//!         record_type: "A".to_string(),
//!         record_ttl: Some(300),
//!         ..Default::default()
//!     }],
//! };
//! assert_eq!(spec.endpoints.len(), 1);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `VirtualMachineInstance` is a running KubeVirt virtual machine.
///
/// The controller consumes `metadata.annotations` and `status.interfaces`.
/// Spec fields are not modelled.
///
/// # Example
///
/// ```yaml
/// apiVersion: kubevirt.io/v1
/// kind: VirtualMachineInstance
/// metadata:
///   name: web-01
///   namespace: vms
///   annotations:
///     external-dns.alpha.kubernetes.io/hostname: web-01.example.com
///     external-dns.alpha.kubernetes.io/ttl: "60"
/// status:
///   interfaces:
///     - name: default
///       ipAddress: 10.0.0.12
///       ipAddresses: [10.0.0.12, 2001:db8::12, fe80::1]
///       infoSource: domain, guest-agent
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kubevirt.io",
    version = "v1",
    kind = "VirtualMachineInstance",
    shortname = "vmi",
    namespaced,
    doc = "VirtualMachineInstance is a running KubeVirt virtual machine. Only the fields read by kubevirt-dns are modelled."
)]
#[kube(status = "VirtualMachineInstanceStatus")]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceSpec {}

/// Observed state of a `VirtualMachineInstance`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceStatus {
    /// Network interfaces as reported by the configured info sources, in report order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<VirtualMachineInstanceNetworkInterface>,
}

/// One network interface as reported in `status.interfaces`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineInstanceNetworkInterface {
    /// Logical network name from the VMI spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Interface name inside the guest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,

    /// MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,

    /// Primary address. The only address reported by `multus-status`.
    #[serde(
        default,
        rename = "ipAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub ip: Option<String>,

    /// All addresses seen on the interface. Populated by `guest-agent`.
    #[serde(
        default,
        rename = "ipAddresses",
        skip_serializing_if = "Option::is_none"
    )]
    pub ips: Option<Vec<String>>,

    /// Comma-separated list of the sources that reported this interface
    /// (e.g. `domain, guest-agent, multus-status`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_source: Option<String>,
}

/// `DNSEndpoint` declares DNS records for external-dns to publish.
///
/// The controller writes one `DNSEndpoint` per annotated VMI, named and
/// namespaced identically and owned by the VMI.
///
/// # Example
///
/// ```yaml
/// apiVersion: externaldns.k8s.io/v1alpha1
/// kind: DNSEndpoint
/// metadata:
///   name: web-01
///   namespace: vms
/// spec:
///   endpoints:
///     - dnsName: web-01.example.com
///       recordType: A
///       targets: [10.0.0.12]
///       recordTTL: 60
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    plural = "dnsendpoints",
    namespaced,
    doc = "DNSEndpoint is a set of DNS records published by external-dns."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Record declarations, in publication order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,
}

/// Status written by external-dns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    /// Generation last processed by external-dns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// A single DNS record declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified DNS name.
    pub dns_name: String,

    /// Record targets. Never empty for records written by this controller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Record type (`A`, `AAAA`, ...).
    pub record_type: String,

    /// Identifier for weighted/geo routing policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// Record TTL in seconds.
    #[serde(
        default,
        rename = "recordTTL",
        skip_serializing_if = "Option::is_none"
    )]
    pub record_ttl: Option<i64>,

    /// Labels attached to the endpoint by external-dns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Provider-specific properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_specific: Option<Vec<ProviderSpecificProperty>>,
}

/// Name/value pair interpreted by a specific DNS provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
