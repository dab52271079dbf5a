//! GPU Addon Controller
//!
//! Manages the NVIDIA GPU operator ClusterPolicy on behalf of the GPUAddon
//! CRD:
//! - creates the singleton ClusterPolicy when the addon appears
//! - converges its driver repository/image/version fields
//! - reports a `ClusterPolicyDeployed` condition on the addon status
//! - tears the ClusterPolicy down when the addon is deleted

mod conditions;
mod config;
mod controller;
mod error;
mod image_reference;
mod reconciler;
mod resolver;
mod store;
#[cfg(test)]
mod test_utils;
mod watcher;

use crate::error::ControllerError;
use config::Config;
use controller::Controller;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting GPU addon controller");

    let config = Config::from_env();
    info!("Configuration:");
    info!("  ClusterPolicy name: {}", config.cluster_policy_name);
    info!("  Namespace: {}", config.namespace);
    info!("  GPU operator CSV prefix: {}", config.gpu_operator_csv_prefix);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
