// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Parsing of the external-dns annotations carried by a `VirtualMachineInstance`.
//!
//! Both parsers are total: malformed input falls back to a safe value and never
//! aborts a reconciliation.
//!
//! # Example
//!
//! ```rust
//! use kubevirt_dns::annotations::{parse_hostnames, parse_ttl};
//!
//! assert_eq!(parse_hostnames(" a.example.com, ,b.example.com"), vec!["a.example.com", "b.example.com"]);
//! assert_eq!(parse_ttl(Some("60")), 60);
//! assert_eq!(parse_ttl(Some("-1")), 300);
//! ```

use crate::constants::DEFAULT_DNS_RECORD_TTL_SECS;
use crate::crd::VirtualMachineInstance;
use crate::labels::{HOSTNAME_ANNOTATION, TTL_ANNOTATION};
use kube::ResourceExt;
use tracing::debug;

/// Returns the trimmed hostname annotation, or `None` when absent or blank.
#[must_use]
pub fn hostname_annotation(vmi: &VirtualMachineInstance) -> Option<&str> {
    vmi.annotations()
        .get(HOSTNAME_ANNOTATION)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
}

/// Returns the raw TTL annotation value, if present.
#[must_use]
pub fn ttl_annotation(vmi: &VirtualMachineInstance) -> Option<&str> {
    vmi.annotations().get(TTL_ANNOTATION).map(String::as_str)
}

/// Splits a comma-separated hostname list.
///
/// Tokens are trimmed and empty tokens dropped; order is preserved. Duplicates
/// are kept.
#[must_use]
pub fn parse_hostnames(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|hostname| !hostname.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parses the TTL annotation.
///
/// Absent, empty, non-numeric and non-positive values all yield
/// [`DEFAULT_DNS_RECORD_TTL_SECS`]. Positive values pass through unchanged.
#[must_use]
pub fn parse_ttl(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return DEFAULT_DNS_RECORD_TTL_SECS;
    };

    match raw.trim().parse::<i64>() {
        Ok(ttl) if ttl > 0 => ttl,
        Ok(ttl) => {
            debug!(ttl, "Non-positive TTL annotation, using default");
            DEFAULT_DNS_RECORD_TTL_SECS
        }
        Err(e) => {
            debug!(raw, error = %e, "Invalid TTL annotation, using default");
            DEFAULT_DNS_RECORD_TTL_SECS
        }
    }
}

#[cfg(test)]
#[path = "annotations_tests.rs"]
mod annotations_tests;
