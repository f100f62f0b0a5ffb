// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Address extraction from `VirtualMachineInstance` interface reports.
//!
//! KubeVirt reports each interface together with the set of sources that
//! observed it (`infoSource`). Two sources are trusted, in priority order:
//!
//! 1. [`AddressSource::GuestAgent`] - reads the full `ipAddresses` list and drops
//!    IPv6 link-local addresses.
//! 2. [`AddressSource::MultusStatus`] - reads only the primary `ipAddress`,
//!    link-local included.
//!
//! Selection is winner-take-all: the first source in [`SOURCE_PRIORITY`] that
//! yields at least one address provides every address of the pass.
//!
//! # Example
//!
//! ```rust
//! use kubevirt_dns::addresses::{extract_addresses, AddressSource};
//! use kubevirt_dns::crd::VirtualMachineInstanceNetworkInterface;
//!
//! let interfaces = vec![VirtualMachineInstanceNetworkInterface {
//!     ips: Some(vec!["192.168.1.1".into(), "2001:db8::1".into(), "fe80::1".into()]),
//!     info_source: Some("domain, guest-agent".into()),
//!     ..Default::default()
//! }];
//!
//! let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
//! assert_eq!(found.ipv4, vec!["192.168.1.1"]);
//! assert_eq!(found.ipv6, vec!["2001:db8::1"]);
//! ```

use crate::constants::{INFO_SOURCE_GUEST_AGENT, INFO_SOURCE_MULTUS_STATUS};
use crate::crd::{VirtualMachineInstance, VirtualMachineInstanceNetworkInterface};
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use tracing::debug;

/// The set of source labels of one interface report, parsed from `infoSource`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTags(Vec<String>);

impl SourceTags {
    /// Splits a comma-separated `infoSource` value into trimmed, non-empty tokens.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Parses the `infoSource` of an interface. A missing field is an empty set.
    #[must_use]
    pub fn of(iface: &VirtualMachineInstanceNetworkInterface) -> Self {
        iface.info_source.as_deref().map(Self::parse).unwrap_or_default()
    }

    /// Exact token match.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

/// A reporting channel whose addresses the controller is willing to publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressSource {
    /// QEMU guest agent. Full address list per interface.
    GuestAgent,
    /// Multus network-status. One primary address per interface.
    MultusStatus,
}

/// Sources tried by [`select_best`], highest priority first.
pub const SOURCE_PRIORITY: [AddressSource; 2] =
    [AddressSource::GuestAgent, AddressSource::MultusStatus];

impl AddressSource {
    /// The `infoSource` token identifying this source.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::GuestAgent => INFO_SOURCE_GUEST_AGENT,
            Self::MultusStatus => INFO_SOURCE_MULTUS_STATUS,
        }
    }

    /// Whether IPv6 link-local addresses from this source are published.
    ///
    /// Multus reports a single address per interface; when that address is
    /// link-local there is nothing better to fall back to.
    #[must_use]
    pub const fn accepts_link_local(self) -> bool {
        match self {
            Self::GuestAgent => false,
            Self::MultusStatus => true,
        }
    }

    /// Whether the interface was reported by this source.
    #[must_use]
    pub fn reported(self, iface: &VirtualMachineInstanceNetworkInterface) -> bool {
        SourceTags::of(iface).contains(self.tag())
    }

    /// Raw address strings this source exposes for one interface.
    #[must_use]
    pub fn candidates(self, iface: &VirtualMachineInstanceNetworkInterface) -> Vec<&str> {
        match self {
            Self::GuestAgent => iface
                .ips
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect(),
            Self::MultusStatus => iface.ip.as_deref().into_iter().collect(),
        }
    }
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Addresses found for one source, split by family, in report order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressFamilies {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

impl AddressFamilies {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

/// Outcome of source selection for one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedAddresses {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    /// Winning source, `None` when no source yielded an address.
    pub source: Option<AddressSource>,
}

impl ResolvedAddresses {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    /// Tag of the winning source, `""` when unresolved.
    #[must_use]
    pub fn source_tag(&self) -> &'static str {
        self.source.map_or("", AddressSource::tag)
    }
}

/// IP family of an accepted address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// Returns true for addresses in `fe80::/10`.
#[must_use]
pub fn is_link_local_v6(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

/// Classifies a trimmed address literal.
///
/// Returns `None` for anything that is not an IP literal. IPv4-mapped IPv6
/// literals (`::ffff:a.b.c.d`) count as IPv4.
#[must_use]
pub fn classify(addr: &str, accept_link_local: bool) -> Option<AddressFamily> {
    match addr.parse::<IpAddr>().ok()? {
        IpAddr::V4(_) => Some(AddressFamily::V4),
        IpAddr::V6(v6) if v6.to_ipv4_mapped().is_some() => Some(AddressFamily::V4),
        IpAddr::V6(v6) if !accept_link_local && is_link_local_v6(&v6) => None,
        IpAddr::V6(_) => Some(AddressFamily::V6),
    }
}

/// Collects the usable addresses `source` reports across `interfaces`.
///
/// Only interfaces whose `infoSource` contains the source's tag are read.
/// Values are trimmed; empty and unparsable values are discarded. Duplicates
/// pass through.
#[must_use]
pub fn extract_addresses(
    interfaces: &[VirtualMachineInstanceNetworkInterface],
    source: AddressSource,
) -> AddressFamilies {
    let mut found = AddressFamilies::default();

    for iface in interfaces.iter().filter(|iface| source.reported(iface)) {
        for raw in source.candidates(iface) {
            let addr = raw.trim();
            if addr.is_empty() {
                continue;
            }
            match classify(addr, source.accepts_link_local()) {
                Some(AddressFamily::V4) => found.ipv4.push(addr.to_string()),
                Some(AddressFamily::V6) => found.ipv6.push(addr.to_string()),
                None => debug!(
                    source = %source,
                    interface = iface.name.as_deref().unwrap_or_default(),
                    address = addr,
                    "Discarding unusable address"
                ),
            }
        }
    }

    found
}

/// Picks the highest-priority source that yields any address.
#[must_use]
pub fn select_best(vmi: &VirtualMachineInstance) -> ResolvedAddresses {
    let interfaces = vmi
        .status
        .as_ref()
        .map(|status| status.interfaces.as_slice())
        .unwrap_or_default();

    for source in SOURCE_PRIORITY {
        let found = extract_addresses(interfaces, source);
        if !found.is_empty() {
            return ResolvedAddresses {
                ipv4: found.ipv4,
                ipv6: found.ipv6,
                source: Some(source),
            };
        }
    }

    ResolvedAddresses::default()
}

#[cfg(test)]
#[path = "addresses_tests.rs"]
mod addresses_tests;
