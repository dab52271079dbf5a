//! ClusterPolicy resource reconciler.
//!
//! Owns the singleton ClusterPolicy: creates it when absent, converges the
//! driver fields when drifted, and reports a single `ClusterPolicyDeployed`
//! condition per reconcile. Conflicts and transport failures surface to the
//! trigger machinery; there is no retry loop in here.

use crate::conditions;
use crate::config::Config;
use crate::error::ControllerError;
use crate::resolver::{DriverResolver, ResolvedDriver};
use crate::store::{is_not_found, ObjectStore};
use crds::{ClusterPolicy, ClusterPolicySpec, ClusterServiceVersion, DriverSpec, GPUAddon};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, ObjectMeta};
use tracing::{debug, info};

/// Reconciles the ClusterPolicy the addon depends on.
pub struct ClusterPolicyResourceReconciler {
    cluster_policy_name: String,
    resolver: DriverResolver,
}

impl ClusterPolicyResourceReconciler {
    pub fn new(config: &Config) -> Self {
        Self {
            cluster_policy_name: config.cluster_policy_name.clone(),
            resolver: DriverResolver::new(config),
        }
    }

    /// Converges the ClusterPolicy to the state `addon` asks for and returns
    /// exactly one `ClusterPolicyDeployed` condition.
    ///
    /// Resolution errors abort before any write and return no condition.
    /// Unchanged driver fields skip the write entirely, so a second call
    /// with the same inputs is a no-op.
    pub async fn reconcile<S>(
        &self,
        store: &S,
        addon: &GPUAddon,
    ) -> Result<Vec<Condition>, ControllerError>
    where
        S: ObjectStore<ClusterPolicy> + ObjectStore<ClusterServiceVersion>,
    {
        let driver = self.resolver.resolve(store, addon).await?;

        match ObjectStore::<ClusterPolicy>::get(store, None, &self.cluster_policy_name).await {
            Ok(existing) => {
                if driver_fields_match(&existing.spec.driver, &driver) {
                    debug!(
                        "ClusterPolicy {} already up to date, skipping update",
                        self.cluster_policy_name
                    );
                } else {
                    info!(
                        "ClusterPolicy {} driver fields drifted, updating",
                        self.cluster_policy_name
                    );
                    let mut desired = existing;
                    apply_driver_fields(&mut desired.spec.driver, &driver);
                    ObjectStore::<ClusterPolicy>::update(store, &desired).await?;
                }
            }
            Err(err) if is_not_found(&err) => {
                info!("Creating ClusterPolicy {}", self.cluster_policy_name);
                let policy = self.new_cluster_policy(&driver);
                ObjectStore::<ClusterPolicy>::create(store, &policy).await?;
            }
            Err(err) => return Err(err.into()),
        }

        Ok(vec![conditions::cluster_policy_deployed()])
    }

    /// Removes the ClusterPolicy. Returns whether this call deleted it; an
    /// already-absent object is success, not an error, so repeated calls
    /// converge to `Ok(false)`.
    pub async fn delete<S>(&self, store: &S) -> Result<bool, ControllerError>
    where
        S: ObjectStore<ClusterPolicy>,
    {
        match ObjectStore::<ClusterPolicy>::get(store, None, &self.cluster_policy_name).await {
            Ok(_) => {}
            Err(err) if is_not_found(&err) => return Ok(false),
            Err(err) => return Err(err.into()),
        }

        match ObjectStore::<ClusterPolicy>::delete(store, None, &self.cluster_policy_name).await {
            Ok(()) => {
                info!("Deleted ClusterPolicy {}", self.cluster_policy_name);
                Ok(true)
            }
            // Lost the race to another deleter; the object is gone either way.
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Baseline ClusterPolicy with only the resolved driver fields pinned.
    fn new_cluster_policy(&self, driver: &ResolvedDriver) -> ClusterPolicy {
        let mut spec = ClusterPolicySpec::baseline();
        apply_driver_fields(&mut spec.driver, driver);
        ClusterPolicy {
            metadata: ObjectMeta {
                name: Some(self.cluster_policy_name.clone()),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }
}

/// Compares only the driver fields this controller owns.
fn driver_fields_match(current: &DriverSpec, desired: &ResolvedDriver) -> bool {
    current.repository == desired.repository
        && current.image == desired.image
        && current.version == desired.version
}

/// Writes the owned driver fields, leaving everything else (including
/// fields other actors manage) untouched.
fn apply_driver_fields(driver: &mut DriverSpec, resolved: &ResolvedDriver) {
    driver.repository = resolved.repository.clone();
    driver.image = resolved.image.clone();
    driver.version = resolved.version.clone();
}
