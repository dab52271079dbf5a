//! Process configuration.
//!
//! Values are read from the environment once at startup and injected into
//! the components that need them; nothing reads ambient state afterwards.

use std::env;

/// Names and scopes the controller is wired with at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Well-known name of the singleton ClusterPolicy this operator manages.
    pub cluster_policy_name: String,

    /// Namespace the addon (and the GPU operator CSV) is installed in.
    pub namespace: String,

    /// Package-name prefix identifying the GPU operator CSV. OLM suffixes
    /// CSV names with the bundle version, so lookup is by prefix.
    pub gpu_operator_csv_prefix: String,
}

impl Config {
    /// Loads configuration from environment variables, with defaults
    /// matching the addon's standard installation.
    pub fn from_env() -> Self {
        Self {
            cluster_policy_name: env::var("CLUSTER_POLICY_NAME")
                .unwrap_or_else(|_| "gpu-cluster-policy".to_string()),
            namespace: env::var("WATCH_NAMESPACE")
                .unwrap_or_else(|_| "nvidia-gpu-addon".to_string()),
            gpu_operator_csv_prefix: env::var("GPU_OPERATOR_CSV_PREFIX")
                .unwrap_or_else(|_| "gpu-operator-certified".to_string()),
        }
    }
}
