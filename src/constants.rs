// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the kubevirt-dns controller.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group served by `KubeVirt`
pub const KUBEVIRT_API_GROUP: &str = "kubevirt.io";

/// API version of `VirtualMachineInstance`
pub const KUBEVIRT_API_VERSION: &str = "v1";

/// Plural resource name of `VirtualMachineInstance`
pub const VMI_RESOURCE_PLURAL: &str = "virtualmachineinstances";

/// API group served by external-dns
pub const EXTERNAL_DNS_API_GROUP: &str = "externaldns.k8s.io";

/// API version of `DNSEndpoint`
pub const EXTERNAL_DNS_API_VERSION: &str = "v1alpha1";

/// Plural resource name of `DNSEndpoint`
pub const DNS_ENDPOINT_RESOURCE_PLURAL: &str = "dnsendpoints";

/// Kind name for `VirtualMachineInstance` resource
pub const KIND_VIRTUAL_MACHINE_INSTANCE: &str = "VirtualMachineInstance";

/// Kind name for `DNSEndpoint` resource
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

// ============================================================================
// DNS Record Constants
// ============================================================================

/// TTL applied when the TTL annotation is absent or invalid (5 minutes)
pub const DEFAULT_DNS_RECORD_TTL_SECS: i64 = 300;

/// External-dns record type for IPv4 targets
pub const RECORD_TYPE_A: &str = "A";

/// External-dns record type for IPv6 targets
pub const RECORD_TYPE_AAAA: &str = "AAAA";

// ============================================================================
// Interface Info Sources
// ============================================================================

/// `infoSource` token set by the QEMU guest agent. Reports the full `ips` list.
pub const INFO_SOURCE_GUEST_AGENT: &str = "guest-agent";

/// `infoSource` token set from the Multus network-status annotation. Reports only `ip`.
pub const INFO_SOURCE_MULTUS_STATUS: &str = "multus-status";

// ============================================================================
// Controller Constants
// ============================================================================

/// Requeue delay after a failed reconciliation
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Upper bound on a single reconciliation pass
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

/// Field manager recorded on objects written by the controller
pub const FIELD_MANAGER: &str = "kubevirt-dns";

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Name of the coordination `Lease` used for leader election
pub const DEFAULT_LEADER_ELECTION_ID: &str = "external-dns-kubevirt-leader";

/// Lease duration (seconds)
pub const LEASE_DURATION_SECS: u64 = 15;

/// Grace period before an expired lease may be taken over (seconds)
pub const LEASE_GRACE_SECS: u64 = 5;

// ============================================================================
// Server Constants
// ============================================================================

/// Default bind address of the Prometheus metrics endpoint
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default bind address of the health probe endpoints
pub const DEFAULT_HEALTH_PROBE_BIND_ADDRESS: &str = "0.0.0.0:8081";
