//! ClusterServiceVersion CRD (OLM)
//!
//! Minimal rendition of `operators.coreos.com/v1alpha1`: only the bundle
//! metadata the driver resolver inspects. Read-only to this operator.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "ClusterServiceVersion",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersionSpec {
    /// Human-readable bundle name
    #[serde(default)]
    pub display_name: String,

    /// Bundle version
    #[serde(default)]
    pub version: String,

    /// Images the bundled operator references at runtime
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_images: Vec<RelatedImage>,
}

/// One entry under `spec.relatedImages`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RelatedImage {
    /// Well-known key, e.g. "driver-image"
    pub name: String,

    /// Full image reference, digest- or tag-pinned
    pub image: String,
}
