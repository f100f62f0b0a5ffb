// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation and label keys read from or written to Kubernetes objects.

// ============================================================================
// External-DNS Annotations (read from VirtualMachineInstance)
// ============================================================================

/// Comma-separated list of DNS names to publish for the VMI.
///
/// Required: a VMI without this annotation (or with a blank value) gets no `DNSEndpoint`.
pub const HOSTNAME_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Record TTL in seconds. Optional, defaults to 300.
pub const TTL_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/ttl";

// ============================================================================
// Kubernetes Standard Labels (written to DNSEndpoint)
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value for `app.kubernetes.io/managed-by` on every `DNSEndpoint` this controller writes
pub const MANAGED_BY_KUBEVIRT_DNS: &str = "kubevirt-dns";
