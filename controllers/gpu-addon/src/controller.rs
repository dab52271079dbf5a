//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the object store, the reconciler, and the GPUAddon watcher
//! together.

use crate::config::Config;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::store::KubeStore;
use crate::watcher::Watcher;
use crds::GPUAddon;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for GPU addon management.
pub struct Controller {
    gpu_addon_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing GPU addon controller");

        let kube_client = Client::try_default().await?;
        let gpu_addon_api: Api<GPUAddon> = Api::namespaced(kube_client.clone(), &config.namespace);
        let store = KubeStore::new(kube_client);

        let reconciler = Arc::new(Reconciler::new(store, gpu_addon_api.clone(), &config));
        let watcher = Arc::new(Watcher::new(reconciler, gpu_addon_api));

        let gpu_addon_watcher = tokio::spawn(async move { watcher.watch_gpu_addons().await });

        Ok(Self { gpu_addon_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("GPU addon controller running");

        self.gpu_addon_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("GPUAddon watcher panicked: {}", e)))?
            .map_err(|e| ControllerError::Watch(format!("GPUAddon watcher error: {}", e)))?;

        Ok(())
    }
}
