//! Kubernetes resource watchers.
//!
//! Watches GPUAddon resources and drives reconciliation through
//! `kube_runtime::Controller`, which handles reconnection and requeueing
//! and serializes reconciles per object.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::GPUAddon;
use futures::StreamExt;
use kube::Api;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Generic watcher helper over `kube_runtime::Controller`.
///
/// The reconcile_fn wraps one of the `Reconciler` methods; errors requeue
/// with a fixed delay, success waits for the next change.
async fn watch_resource<K, F>(
    api: Api<K>,
    reconciler: Arc<Reconciler>,
    reconcile_fn: F,
    resource_name: &str,
) -> Result<(), ControllerError>
where
    K: kube::Resource + Clone + Send + Sync + 'static + std::fmt::Debug + serde::de::DeserializeOwned,
    K::DynamicType: Default + std::cmp::Eq + std::hash::Hash + Clone + std::fmt::Debug + Unpin,
    F: Fn(Arc<Reconciler>, Arc<K>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Action, ControllerError>> + Send>> + Send + Sync + Clone + 'static,
{
    info!("Starting {} watcher", resource_name);

    // Error policy: requeue with a fixed delay; retry pacing is this
    // layer's job, the reconcilers never retry internally.
    let error_policy = |obj: Arc<K>, error: &ControllerError, _ctx: Arc<Reconciler>| {
        error!("Reconciliation error for {} {:?}: {}", resource_name, obj, error);
        Action::requeue(Duration::from_secs(60))
    };

    let reconcile = move |obj: Arc<K>, ctx: Arc<Reconciler>| {
        let reconcile_fn = reconcile_fn.clone();
        let resource_name = resource_name.to_string();
        async move {
            debug!("Reconciling {} {:?}", resource_name, obj);

            match reconcile_fn(ctx, obj).await {
                Ok(action) => Ok(action),
                Err(e) => {
                    error!("Reconciliation failed for {}: {}", resource_name, e);
                    Err(e)
                }
            }
        }
    };

    // Debounce batches bursts of events; one reconcile in flight per object
    // is already guaranteed by Controller.
    let controller_config = ControllerConfig::default().debounce(Duration::from_secs(5));

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for {}: {}", resource_name, e);
            }
        })
        .await;

    Ok(())
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    gpu_addon_api: Api<GPUAddon>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(reconciler: Arc<Reconciler>, gpu_addon_api: Api<GPUAddon>) -> Self {
        Self {
            reconciler,
            gpu_addon_api,
        }
    }

    /// Starts watching GPUAddon resources.
    pub async fn watch_gpu_addons(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.gpu_addon_api.clone(),
            self.reconciler.clone(),
            |reconciler, resource| {
                Box::pin(async move {
                    match reconciler.reconcile_gpu_addon(&resource).await {
                        Ok(()) => Ok(Action::await_change()),
                        Err(e) => Err(e),
                    }
                })
            },
            "GPUAddon",
        )
        .await
    }
}
