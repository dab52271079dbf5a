//! ClusterPolicy CRD (NVIDIA GPU operator)
//!
//! Typed rendition of the cluster-scoped `nvidia.com/v1` ClusterPolicy this
//! operator creates and converges. Only the surface the addon operator
//! touches is modelled; the GPU operator owns the rest and its defaulting.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "nvidia.com",
    version = "v1",
    kind = "ClusterPolicy",
    status = "ClusterPolicyStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPolicySpec {
    /// Operator-wide settings
    #[serde(default)]
    pub operator: OperatorSpec,

    /// NVIDIA driver daemonset
    #[serde(default)]
    pub driver: DriverSpec,

    /// Container toolkit daemonset
    #[serde(default)]
    pub toolkit: ComponentSpec,

    /// Device plugin daemonset
    #[serde(default)]
    pub device_plugin: ComponentSpec,

    /// DCGM exporter daemonset
    #[serde(default)]
    pub dcgm_exporter: ComponentSpec,

    /// GPU feature discovery daemonset
    #[serde(default)]
    pub gfd: ComponentSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSpec {
    /// Container runtime the operand pods are built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_runtime: Option<String>,
}

/// Driver daemonset settings.
///
/// Repository, image, and version are the fields the addon operator owns;
/// unset values leave the GPU operator's own defaulting in charge.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriverSpec {
    /// Whether the driver daemonset is deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Image registry and org, e.g. "nvcr.io/nvidia"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Image name, e.g. "driver"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Driver version, e.g. "470.82.01"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Enable/disable toggle shared by the simple operand daemonsets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Whether the operand daemonset is deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ClusterPolicySpec {
    /// Baseline spec the addon operator installs: every operand enabled,
    /// everything else at GPU operator defaults.
    #[must_use]
    pub fn baseline() -> Self {
        let enabled = ComponentSpec {
            enabled: Some(true),
        };
        Self {
            operator: OperatorSpec::default(),
            driver: DriverSpec {
                enabled: Some(true),
                ..DriverSpec::default()
            },
            toolkit: enabled.clone(),
            device_plugin: enabled.clone(),
            dcgm_exporter: enabled.clone(),
            gfd: enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPolicyStatus {
    /// Overall operand state reported by the GPU operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}
