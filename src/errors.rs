// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation error types.
//!
//! Every failure carries the kind and identity of the object involved so the
//! controller's error policy can log it without extra context.

use thiserror::Error;

/// Errors returned by a reconciliation pass.
///
/// All variants are retryable; the controller requeues the VMI after
/// [`ERROR_REQUEUE_DURATION_SECS`](crate::constants::ERROR_REQUEUE_DURATION_SECS).
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Reading an object failed for a reason other than "not found"
    #[error("failed to get {kind} {namespace}/{name}: {source}")]
    Fetch {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// Creating the `DNSEndpoint` failed
    #[error("failed to create {kind} {namespace}/{name}: {source}")]
    Create {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// Replacing the `DNSEndpoint` failed (including optimistic concurrency conflicts)
    #[error("failed to update {kind} {namespace}/{name}: {source}")]
    Replace {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// Deleting the `DNSEndpoint` failed for a reason other than "not found"
    #[error("failed to delete {kind} {namespace}/{name}: {source}")]
    Delete {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// The triggering object is not namespaced
    #[error("{kind} {name} has no namespace")]
    MissingNamespace { kind: &'static str, name: String },

    /// The `DNSEndpoint` is controlled by a different object
    #[error(
        "DNSEndpoint {namespace}/{name} is already controlled by {owner_kind} {owner_name}"
    )]
    AlreadyOwned {
        namespace: String,
        name: String,
        owner_kind: String,
        owner_name: String,
    },

    /// The pass exceeded the configured reconcile timeout
    #[error("reconciliation of {namespace}/{name} timed out after {seconds}s")]
    Timeout {
        namespace: String,
        name: String,
        seconds: u64,
    },
}

impl ReconcileError {
    /// Short category used as the `error_type` metric label.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Create { .. } => "create",
            Self::Replace { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::MissingNamespace { .. } => "validation",
            Self::AlreadyOwned { .. } => "ownership",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// True if the API server answered 404 Not Found.
#[must_use]
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 404)
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
