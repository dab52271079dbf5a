//! Driver version and image resolution.
//!
//! The ClusterPolicy driver fields come from exactly one of two places per
//! reconcile: a version pinned on the GPUAddon spec, or the driver image
//! the GPU operator ClusterServiceVersion declares. Never a mix of both.
//! Resolution is re-done in full on every reconcile; nothing is cached.

use crate::config::Config;
use crate::error::ControllerError;
use crate::image_reference::ImageReference;
use crate::store::ObjectStore;
use crds::{ClusterServiceVersion, GPUAddon};
use tracing::debug;

/// Related-image key under which the GPU operator CSV declares the driver.
const DRIVER_IMAGE_NAME: &str = "driver-image";

/// Driver fields destined for the ClusterPolicy spec. `None` leaves the
/// GPU operator's own defaulting in charge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDriver {
    pub repository: Option<String>,
    pub image: Option<String>,
    pub version: Option<String>,
}

/// Resolves the ClusterPolicy driver fields for a GPUAddon. Read-only.
#[derive(Debug, Clone)]
pub struct DriverResolver {
    namespace: String,
    csv_prefix: String,
}

impl DriverResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            namespace: config.namespace.clone(),
            csv_prefix: config.gpu_operator_csv_prefix.clone(),
        }
    }

    /// Computes the driver fields from the addon spec, falling back to CSV
    /// inspection when no version is pinned.
    pub async fn resolve<S>(
        &self,
        store: &S,
        addon: &GPUAddon,
    ) -> Result<ResolvedDriver, ControllerError>
    where
        S: ObjectStore<ClusterServiceVersion>,
    {
        let pinned = addon.spec.driver_version.trim();
        if !pinned.is_empty() {
            // Admission should have rejected malformed versions already,
            // but garbage must not end up in the ClusterPolicy.
            if !is_valid_driver_version(pinned) {
                return Err(ControllerError::InvalidDriverVersion(pinned.to_string()));
            }
            debug!("Using pinned driver version {}", pinned);
            return Ok(ResolvedDriver {
                version: Some(pinned.to_string()),
                ..ResolvedDriver::default()
            });
        }

        let csv = self.gpu_operator_csv(store).await?;
        let csv_name = csv.metadata.name.as_deref().unwrap_or_default().to_string();

        let declared = csv
            .spec
            .related_images
            .iter()
            .find(|related| related.name == DRIVER_IMAGE_NAME)
            .ok_or_else(|| {
                ControllerError::DriverImageNotDeclared(format!(
                    "CSV {} declares no related image named {}",
                    csv_name, DRIVER_IMAGE_NAME
                ))
            })?;

        debug!(
            "Deriving driver image from CSV {} reference {}",
            csv_name, declared.image
        );
        Ok(match ImageReference::parse(&declared.image) {
            ImageReference::Canonical { repository, image } => ResolvedDriver {
                repository: Some(repository),
                image: Some(image),
                version: None,
            },
            ImageReference::Opaque(image) => ResolvedDriver {
                image: Some(image),
                ..ResolvedDriver::default()
            },
        })
    }

    /// Finds the GPU operator CSV in the addon namespace by package-name
    /// prefix (OLM suffixes CSV names with the bundle version).
    async fn gpu_operator_csv<S>(&self, store: &S) -> Result<ClusterServiceVersion, ControllerError>
    where
        S: ObjectStore<ClusterServiceVersion>,
    {
        let csvs = store.list(Some(&self.namespace)).await?;
        csvs.into_iter()
            .find(|csv| {
                csv.metadata
                    .name
                    .as_deref()
                    .is_some_and(|name| name.starts_with(&self.csv_prefix))
            })
            .ok_or_else(|| {
                ControllerError::CsvNotFound(format!(
                    "no ClusterServiceVersion with prefix {} in namespace {}",
                    self.csv_prefix, self.namespace
                ))
            })
    }
}

/// Driver versions are two or three dot-separated numeric components,
/// e.g. "470.82.01".
fn is_valid_driver_version(version: &str) -> bool {
    let components: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&components.len())
        && components
            .iter()
            .all(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
}
