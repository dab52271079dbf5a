//! Controller-specific error types.
//!
//! This module defines error types specific to the GPU addon controller
//! that are not covered by upstream library errors.

use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the GPU addon controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Pinned driver version failed validation
    #[error("invalid driver version: {0}")]
    InvalidDriverVersion(String),

    /// No ClusterServiceVersion found for the GPU operator package
    #[error("ClusterServiceVersion not found: {0}")]
    CsvNotFound(String),

    /// The GPU operator CSV does not declare the driver image
    #[error("driver image not declared: {0}")]
    DriverImageNotDeclared(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
