// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Start-up check that the cluster serves the APIs the controller needs.
//!
//! Both kinds belong to other projects (KubeVirt, external-dns). Watching a
//! resource the API server does not serve fails late and noisily, so the
//! process refuses to start instead and names what is missing.

use crate::constants::{
    DNS_ENDPOINT_RESOURCE_PLURAL, EXTERNAL_DNS_API_GROUP, EXTERNAL_DNS_API_VERSION,
    KUBEVIRT_API_GROUP, KUBEVIRT_API_VERSION, VMI_RESOURCE_PLURAL,
};
use crate::errors::is_not_found;
use anyhow::{bail, Context as _, Result};
use kube::core::GroupVersion;
use kube::Client;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// A group/version/resource the controller depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequiredResource {
    pub group: &'static str,
    pub version: &'static str,
    pub plural: &'static str,
}

impl RequiredResource {
    #[must_use]
    pub fn group_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

impl fmt::Display for RequiredResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.group, self.version, self.plural)
    }
}

/// Resources that must be served before the controller starts.
pub const REQUIRED_RESOURCES: [RequiredResource; 2] = [
    RequiredResource {
        group: KUBEVIRT_API_GROUP,
        version: KUBEVIRT_API_VERSION,
        plural: VMI_RESOURCE_PLURAL,
    },
    RequiredResource {
        group: EXTERNAL_DNS_API_GROUP,
        version: EXTERNAL_DNS_API_VERSION,
        plural: DNS_ENDPOINT_RESOURCE_PLURAL,
    },
];

/// Served resource plurals keyed by `group/version`.
pub type ServedResources = BTreeMap<String, BTreeSet<String>>;

/// Returns the entries of `required` absent from `served`.
#[must_use]
pub fn missing_resources(
    required: &[RequiredResource],
    served: &ServedResources,
) -> Vec<RequiredResource> {
    required
        .iter()
        .filter(|resource| {
            !served
                .get(&resource.group_version())
                .is_some_and(|plurals| plurals.contains(resource.plural))
        })
        .copied()
        .collect()
}

async fn served_plurals(client: &Client, group: &str, version: &str) -> Result<BTreeSet<String>> {
    let gv = GroupVersion::gv(group, version);
    match kube::discovery::pinned_group(client, &gv).await {
        Ok(api_group) => Ok(api_group
            .versioned_resources(version)
            .into_iter()
            .map(|(resource, _caps)| resource.plural)
            .collect()),
        Err(err) if is_not_found(&err) => {
            debug!(group_version = %format!("{group}/{version}"), "API group version not served");
            Ok(BTreeSet::new())
        }
        Err(err) => Err(err).with_context(|| format!("failed to discover {group}/{version}")),
    }
}

/// Verify every [`REQUIRED_RESOURCES`] entry is served by the cluster.
///
/// # Errors
///
/// Returns an error naming the missing resources, or the discovery failure.
pub async fn verify_required_apis(client: &Client) -> Result<()> {
    let mut served = ServedResources::new();
    for resource in &REQUIRED_RESOURCES {
        let group_version = resource.group_version();
        if served.contains_key(&group_version) {
            continue;
        }
        let plurals = served_plurals(client, resource.group, resource.version).await?;
        served.insert(group_version, plurals);
    }

    let missing = missing_resources(&REQUIRED_RESOURCES, &served);
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
        bail!(
            "required APIs are not served by the cluster: {} (is KubeVirt installed and the external-dns DNSEndpoint CRD applied?)",
            names.join(", ")
        );
    }

    info!("Required APIs are served: kubevirt.io/v1 virtualmachineinstances, externaldns.k8s.io/v1alpha1 dnsendpoints");
    Ok(())
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod discovery_tests;
