//! Reconciliation logic for the GPUAddon CRD.
//!
//! The top-level `Reconciler` handles GPUAddon events: finalizer
//! bookkeeping, teardown on deletion, and persisting the reconcile outcome
//! onto the addon status. The managed-resource logic lives in
//! `cluster_policy`.

pub mod cluster_policy;

use crate::config::Config;
use crate::error::ControllerError;
use crate::store::KubeStore;
use cluster_policy::ClusterPolicyResourceReconciler;
use crds::{GPUAddon, GPUAddonStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::{Patch, PatchParams};
use kube::Api;
use serde_json::json;
use tracing::{debug, info};

/// Finalizer ensuring the ClusterPolicy is torn down before the addon CR
/// disappears.
const GPU_ADDON_FINALIZER: &str = "addons.microscaler.io/cluster-policy-cleanup";

/// Reconciles GPUAddon resources.
pub struct Reconciler {
    pub(crate) store: KubeStore,
    pub(crate) gpu_addon_api: Api<GPUAddon>,
    pub(crate) cluster_policy: ClusterPolicyResourceReconciler,
}

impl Reconciler {
    pub fn new(store: KubeStore, gpu_addon_api: Api<GPUAddon>, config: &Config) -> Self {
        Self {
            store,
            gpu_addon_api,
            cluster_policy: ClusterPolicyResourceReconciler::new(config),
        }
    }

    pub async fn reconcile_gpu_addon(&self, addon: &GPUAddon) -> Result<(), ControllerError> {
        let name = addon
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| ControllerError::InvalidConfig("GPUAddon missing name".to_string()))?;
        let namespace = addon.metadata.namespace.as_deref().unwrap_or("default");

        if addon.metadata.deletion_timestamp.is_some() {
            info!(
                "GPUAddon {}/{} is being deleted, removing ClusterPolicy",
                namespace, name
            );
            let deleted = self.cluster_policy.delete(&self.store).await?;
            if !deleted {
                debug!("ClusterPolicy already absent for GPUAddon {}/{}", namespace, name);
            }
            return self.remove_finalizer(addon, name).await;
        }

        self.ensure_finalizer(addon, name).await?;

        info!("Reconciling GPUAddon {}/{}", namespace, name);
        let conditions = self.cluster_policy.reconcile(&self.store, addon).await?;
        self.patch_status(addon, name, conditions).await
    }

    /// Persists the reconcile outcome onto the addon status, skipping the
    /// write when nothing but the transition timestamp would change.
    async fn patch_status(
        &self,
        addon: &GPUAddon,
        name: &str,
        conditions: Vec<Condition>,
    ) -> Result<(), ControllerError> {
        if !status_needs_update(addon.status.as_ref(), &conditions) {
            debug!("GPUAddon {} status already up to date, skipping update", name);
            return Ok(());
        }

        let patch = json!({ "status": GPUAddonStatus { conditions } });
        self.gpu_addon_api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn ensure_finalizer(&self, addon: &GPUAddon, name: &str) -> Result<(), ControllerError> {
        let mut finalizers = addon.metadata.finalizers.clone().unwrap_or_default();
        if finalizers.iter().any(|f| f == GPU_ADDON_FINALIZER) {
            return Ok(());
        }
        finalizers.push(GPU_ADDON_FINALIZER.to_string());

        let patch = json!({ "metadata": { "finalizers": finalizers } });
        self.gpu_addon_api
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn remove_finalizer(&self, addon: &GPUAddon, name: &str) -> Result<(), ControllerError> {
        let Some(finalizers) = addon.metadata.finalizers.clone() else {
            return Ok(());
        };
        if !finalizers.iter().any(|f| f == GPU_ADDON_FINALIZER) {
            return Ok(());
        }
        let finalizers: Vec<String> = finalizers
            .into_iter()
            .filter(|f| f != GPU_ADDON_FINALIZER)
            .collect();

        let patch = json!({ "metadata": { "finalizers": finalizers } });
        self.gpu_addon_api
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

/// True when the conditions differ from what the status already holds in
/// anything but `lastTransitionTime`.
fn status_needs_update(current: Option<&GPUAddonStatus>, desired: &[Condition]) -> bool {
    let Some(status) = current else {
        return true;
    };
    status.conditions.len() != desired.len()
        || status
            .conditions
            .iter()
            .zip(desired)
            .any(|(current, desired)| {
                current.type_ != desired.type_
                    || current.status != desired.status
                    || current.reason != desired.reason
                    || current.message != desired.message
            })
}
