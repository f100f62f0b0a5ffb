// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes API access used by the VMI reconciler.
//!
//! The reconciler only talks to the cluster through [`VmiDnsApi`], so the
//! decision logic can be exercised against an in-memory implementation.
//! "Not found" is recovered here: reads return `None` and deletes report
//! whether anything was removed. Every other failure becomes a
//! [`ReconcileError`] carrying the object identity.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubevirt_dns::reconcilers::api::{KubeVmiDnsApi, VmiDnsApi};
//! use kube::Client;
//!
//! async fn example(client: Client) -> anyhow::Result<()> {
//!     let api = KubeVmiDnsApi::new(client);
//!     if let Some(vmi) = api.get_vmi("vms", "web-01").await? {
//!         println!("found {:?}", vmi.metadata.name);
//!     }
//!     Ok(())
//! }
//! ```

use crate::constants::{FIELD_MANAGER, KIND_DNS_ENDPOINT, KIND_VIRTUAL_MACHINE_INSTANCE};
use crate::crd::{DNSEndpoint, VirtualMachineInstance};
use crate::errors::{is_not_found, ReconcileError};
use async_trait::async_trait;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, ResourceExt};
use tracing::debug;

/// Read/write operations the reconciler performs against the cluster.
#[async_trait]
pub trait VmiDnsApi: Send + Sync {
    /// Fetch a VMI; `Ok(None)` when it does not exist.
    async fn get_vmi(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachineInstance>, ReconcileError>;

    /// Fetch a `DNSEndpoint`; `Ok(None)` when it does not exist.
    async fn get_dns_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DNSEndpoint>, ReconcileError>;

    async fn create_dns_endpoint(&self, endpoint: &DNSEndpoint) -> Result<(), ReconcileError>;

    /// Replace an existing `DNSEndpoint`. The object must carry the
    /// `resourceVersion` it was read with.
    async fn replace_dns_endpoint(&self, endpoint: &DNSEndpoint) -> Result<(), ReconcileError>;

    /// Delete a `DNSEndpoint`. Returns `Ok(false)` when it was already gone.
    async fn delete_dns_endpoint(&self, namespace: &str, name: &str)
        -> Result<bool, ReconcileError>;
}

/// [`VmiDnsApi`] backed by a live `kube::Client`.
#[derive(Clone)]
pub struct KubeVmiDnsApi {
    client: Client,
}

impl KubeVmiDnsApi {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn vmis(&self, namespace: &str) -> Api<VirtualMachineInstance> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn dns_endpoints(&self, namespace: &str) -> Api<DNSEndpoint> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn identity(endpoint: &DNSEndpoint) -> (String, String) {
    (endpoint.namespace().unwrap_or_default(), endpoint.name_any())
}

#[async_trait]
impl VmiDnsApi for KubeVmiDnsApi {
    async fn get_vmi(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachineInstance>, ReconcileError> {
        self.vmis(namespace)
            .get_opt(name)
            .await
            .map_err(|source| ReconcileError::Fetch {
                kind: KIND_VIRTUAL_MACHINE_INSTANCE,
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })
    }

    async fn get_dns_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DNSEndpoint>, ReconcileError> {
        self.dns_endpoints(namespace)
            .get_opt(name)
            .await
            .map_err(|source| ReconcileError::Fetch {
                kind: KIND_DNS_ENDPOINT,
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })
    }

    async fn create_dns_endpoint(&self, endpoint: &DNSEndpoint) -> Result<(), ReconcileError> {
        let (namespace, name) = identity(endpoint);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        debug!(namespace = %namespace, name = %name, "Creating DNSEndpoint");
        self.dns_endpoints(&namespace)
            .create(&params, endpoint)
            .await
            .map(|_| ())
            .map_err(|source| ReconcileError::Create {
                kind: KIND_DNS_ENDPOINT,
                namespace,
                name,
                source,
            })
    }

    async fn replace_dns_endpoint(&self, endpoint: &DNSEndpoint) -> Result<(), ReconcileError> {
        let (namespace, name) = identity(endpoint);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        debug!(namespace = %namespace, name = %name, "Replacing DNSEndpoint");
        self.dns_endpoints(&namespace)
            .replace(&name, &params, endpoint)
            .await
            .map(|_| ())
            .map_err(|source| ReconcileError::Replace {
                kind: KIND_DNS_ENDPOINT,
                namespace,
                name,
                source,
            })
    }

    async fn delete_dns_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ReconcileError> {
        debug!(namespace = %namespace, name = %name, "Deleting DNSEndpoint");
        match self
            .dns_endpoints(namespace)
            .delete(name, &DeleteParams::background())
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(source) => Err(ReconcileError::Delete {
                kind: KIND_DNS_ENDPOINT,
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            }),
        }
    }
}
