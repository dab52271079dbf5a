//! GPUAddon CRD
//!
//! User-facing addon configuration. One GPUAddon per cluster drives the
//! managed ClusterPolicy.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "addons.microscaler.io",
    version = "v1alpha1",
    kind = "GPUAddon",
    namespaced,
    status = "GPUAddonStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GPUAddonSpec {
    /// Pinned NVIDIA driver version, e.g. "470.82.01".
    /// Empty derives the driver image from the GPU operator
    /// ClusterServiceVersion instead.
    #[serde(default)]
    pub driver_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct GPUAddonStatus {
    /// Conditions reported by the resource reconcilers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}
