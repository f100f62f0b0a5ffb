// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `VirtualMachineInstance` controller.
//!
//! Watches VMIs through the [`ChangeFilter`] and reconciles each one with
//! [`reconcile_vmi`](crate::reconcilers::reconcile_vmi) under the configured
//! deadline. Owned `DNSEndpoint` objects are watched too, so an
//! external edit or deletion re-triggers the owning VMI.

use crate::constants::{FIELD_MANAGER, KIND_VIRTUAL_MACHINE_INSTANCE};
use crate::context::Context;
use crate::crd::{DNSEndpoint, VirtualMachineInstance};
use crate::errors::ReconcileError;
use crate::filter::ChangeFilter;
use crate::reconcilers::vmi::reconcile_vmi_with_deadline;
use futures::{future, Future, StreamExt, TryStreamExt};
use kube::api::Api;
use kube::runtime::controller::Action;
use kube::runtime::watcher::{watcher, Config as WatcherConfig};
use kube::runtime::{reflector, Controller, WatchStreamExt};
use kube::{Client, ResourceExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

fn scoped_api<K>(client: Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Error policy for the VMI controller.
///
/// Every [`ReconcileError`] is transient; the VMI is requeued after the
/// configured delay.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy(vmi: Arc<VirtualMachineInstance>, err: &ReconcileError, ctx: Arc<Context>) -> Action {
    error!(
        error = %err,
        namespace = ?vmi.namespace(),
        name = %vmi.name_any(),
        "Reconciliation error - will retry in {}s",
        ctx.settings.error_requeue.as_secs()
    );
    Action::requeue(ctx.settings.error_requeue)
}

/// Reconcile wrapper applying the per-pass deadline and recording metrics.
async fn reconcile(
    vmi: Arc<VirtualMachineInstance>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let name = vmi.name_any();

    let result = match vmi.namespace() {
        Some(namespace) => {
            reconcile_vmi_with_deadline(
                ctx.api.as_ref(),
                &namespace,
                &name,
                ctx.settings.reconcile_timeout,
            )
            .await
        }
        None => Err(ReconcileError::MissingNamespace {
            kind: KIND_VIRTUAL_MACHINE_INSTANCE,
            name: name.clone(),
        }),
    };

    let duration = start.elapsed();
    match result {
        Ok(outcome) => {
            debug!(
                namespace = ?vmi.namespace(),
                name = %name,
                outcome = outcome.label(),
                elapsed_ms = duration.as_millis(),
                "Reconciliation finished"
            );
            crate::metrics::record_reconciliation_success(outcome.label(), duration);
            Ok(Action::await_change())
        }
        Err(err) => {
            crate::metrics::record_reconciliation_error(err.category(), duration);
            Err(err)
        }
    }
}

/// Run the VMI controller until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the controller cannot be started.
pub async fn run_vmi_controller<F>(context: Arc<Context>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + Sync + 'static,
{
    let namespace = context.settings.watch_namespace.clone();
    info!(
        namespace = namespace.as_deref().unwrap_or("<all>"),
        field_manager = FIELD_MANAGER,
        "Starting VirtualMachineInstance controller"
    );

    let client = context.client.clone();
    let vmis: Api<VirtualMachineInstance> = scoped_api(client.clone(), namespace.as_deref());
    let dns_endpoints: Api<DNSEndpoint> = scoped_api(client, namespace.as_deref());

    let (reader, writer) = reflector::store();
    let mut change_filter = ChangeFilter::new();
    let vmi_stream = watcher(vmis, WatcherConfig::default())
        .default_backoff()
        .reflect(writer)
        .try_filter(move |event| future::ready(change_filter.admit(event)))
        .touched_objects();

    context.readiness.mark_ready();

    Controller::for_stream(vmi_stream, reader)
        .owns(dns_endpoints, WatcherConfig::default())
        .graceful_shutdown_on(shutdown)
        .run(reconcile, error_policy, context)
        .for_each(|result| {
            match result {
                Ok((object, _action)) => debug!(vmi = %object, "Reconciled"),
                Err(e) => warn!(error = %e, "Controller reported an error"),
            }
            future::ready(())
        })
        .await;

    info!("VirtualMachineInstance controller stopped");
    Ok(())
}
