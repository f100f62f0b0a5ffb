// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Watch event filtering for `VirtualMachineInstance` updates.
//!
//! KubeVirt updates VMI status frequently (conditions, guest OS info, memory
//! hotplug, ...). Only two things influence the published records: the
//! hostname annotation and the interface reports. Update events that change
//! neither are dropped before they reach the reconciler.
//!
//! Creation, deletion and re-list events always pass.

use crate::crd::{VirtualMachineInstance, VirtualMachineInstanceNetworkInterface};
use crate::labels::HOSTNAME_ANNOTATION;
use kube::runtime::watcher::Event;
use kube::ResourceExt;
use std::collections::HashMap;
use tracing::trace;

/// The parts of a VMI that feed into its `DNSEndpoint`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelevantState {
    /// Raw hostname annotation; absent and empty compare equal.
    pub hostname: String,
    /// Full interface report list, order-sensitive.
    pub interfaces: Vec<VirtualMachineInstanceNetworkInterface>,
}

impl RelevantState {
    #[must_use]
    pub fn of(vmi: &VirtualMachineInstance) -> Self {
        Self {
            hostname: vmi
                .annotations()
                .get(HOSTNAME_ANNOTATION)
                .cloned()
                .unwrap_or_default(),
            interfaces: vmi
                .status
                .as_ref()
                .map(|status| status.interfaces.clone())
                .unwrap_or_default(),
        }
    }

    /// True when moving from `self` to `next` affects the published records.
    #[must_use]
    pub fn requires_reconcile(&self, next: &Self) -> bool {
        self != next
    }
}

/// Decides whether an update from `old` to `new` needs a reconciliation.
///
/// True iff the hostname annotation value or the interface report list
/// (both `ipAddress` and `ipAddresses` of every entry, in order) changed.
#[must_use]
pub fn should_reconcile(old: &VirtualMachineInstance, new: &VirtualMachineInstance) -> bool {
    RelevantState::of(old).requires_reconcile(&RelevantState::of(new))
}

type ObjectKey = (Option<String>, String);

/// Stateful adapter applying [`should_reconcile`] to a raw watch stream.
///
/// The watcher delivers bare objects, so the previous version of each VMI is
/// remembered here to reconstruct `(old, new)` pairs.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    seen: HashMap<ObjectKey, RelevantState>,
}

impl ChangeFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `event` should be forwarded to the controller.
    pub fn admit(&mut self, event: &Event<VirtualMachineInstance>) -> bool {
        match event {
            Event::Init => {
                self.seen.clear();
                true
            }
            Event::InitDone => true,
            Event::InitApply(vmi) => {
                if let Some(key) = key_of(vmi) {
                    self.seen.insert(key, RelevantState::of(vmi));
                }
                true
            }
            Event::Apply(vmi) => {
                let Some(key) = key_of(vmi) else {
                    return true;
                };
                let state = RelevantState::of(vmi);
                match self.seen.insert(key, state.clone()) {
                    None => true,
                    Some(previous) => {
                        let changed = previous.requires_reconcile(&state);
                        if !changed {
                            trace!(
                                namespace = ?vmi.namespace(),
                                name = %vmi.name_any(),
                                "Ignoring VMI update without hostname or interface changes"
                            );
                            crate::metrics::record_event_filtered();
                        }
                        changed
                    }
                }
            }
            Event::Delete(vmi) => {
                if let Some(key) = key_of(vmi) {
                    self.seen.remove(&key);
                }
                true
            }
        }
    }
}

fn key_of(vmi: &VirtualMachineInstance) -> Option<ObjectKey> {
    let name = vmi.metadata.name.clone()?;
    Some((vmi.metadata.namespace.clone(), name))
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;
