//! GPU Addon Operator CRD Definitions
//!
//! Kubernetes custom resource types for the gpu-addon controller:
//! - GPUAddon: user-facing addon configuration (owned by this operator)
//! - ClusterPolicy: the NVIDIA GPU operator resource this operator manages
//! - ClusterServiceVersion: the OLM bundle metadata the resolver inspects

pub mod cluster_policy;
pub mod cluster_service_version;
pub mod gpu_addon;

pub use cluster_policy::*;
pub use cluster_service_version::*;
pub use gpu_addon::*;
