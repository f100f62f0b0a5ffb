// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # kubevirt-dns - external-dns records for KubeVirt VMs
//!
//! kubevirt-dns is a Kubernetes controller that publishes DNS records for
//! KubeVirt `VirtualMachineInstance` objects. A VMI opts in with the
//! `external-dns.alpha.kubernetes.io/hostname` annotation; the controller
//! resolves the VMI's current addresses and maintains an external-dns
//! `DNSEndpoint` with the same name and namespace, owned by the VMI.
//!
//! ## Address sources
//!
//! KubeVirt reports interface addresses from several sources. The QEMU guest
//! agent (`guest-agent`) reports every address of each interface and is
//! preferred; Multus (`multus-status`) reports a single address per
//! interface and is used only when the guest agent yields nothing. IPv6
//! link-local addresses from the guest agent are never published.
//!
//! ## Modules
//!
//! - [`crd`] - `VirtualMachineInstance` and `DNSEndpoint` resource types
//! - [`annotations`] - Hostname and TTL annotation parsing
//! - [`addresses`] - Address extraction and source selection
//! - [`endpoints`] - `DNSEndpoint` and owner reference builders
//! - [`filter`] - Watch event filtering
//! - [`reconcilers`] - Reconciliation logic and API access
//! - [`controller`] - Controller wiring
//! - [`discovery`] - Start-up API availability check
//! - [`leader`] - Leader election
//! - [`server`] - Metrics and health probe endpoints
//!
//! ## Example
//!
//! ```rust
//! use kubevirt_dns::annotations::{parse_hostnames, parse_ttl};
//! use kubevirt_dns::endpoints::build_endpoints;
//!
//! let hostnames = parse_hostnames("vm.example.com, vm.example.org");
//! let ttl = parse_ttl(Some("60"));
//! let endpoints = build_endpoints(&hostnames, &["10.0.0.12".to_string()], &[], ttl);
//!
//! assert_eq!(endpoints.len(), 2);
//! assert_eq!(endpoints[1].dns_name, "vm.example.org");
//! ```

pub mod addresses;
pub mod annotations;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod discovery;
pub mod endpoints;
pub mod errors;
pub mod filter;
pub mod labels;
pub mod leader;
pub mod metrics;
pub mod reconcilers;
pub mod server;
