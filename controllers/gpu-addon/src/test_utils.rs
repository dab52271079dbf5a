//! Test utilities for unit testing reconcilers
//!
//! An in-memory object store with the same not-found/conflict semantics as
//! the Kubernetes-backed store, plus builders for test objects.

use crate::config::Config;
use crate::store::ObjectStore;
use async_trait::async_trait;
use crds::{
    ClusterPolicy, ClusterPolicySpec, ClusterServiceVersion, ClusterServiceVersionSpec, GPUAddon,
    GPUAddonSpec, RelatedImage,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::ErrorResponse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the cluster. Tracks writes separately from seeds
/// so tests can assert idempotence.
#[derive(Default)]
pub struct FakeStore {
    cluster_policies: Mutex<BTreeMap<String, ClusterPolicy>>,
    csvs: Mutex<BTreeMap<String, ClusterServiceVersion>>,
    resource_versions: AtomicU64,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a ClusterPolicy without counting it as a reconciler write.
    pub fn seed_cluster_policy(&self, mut policy: ClusterPolicy) {
        let name = policy.metadata.name.clone().unwrap_or_default();
        policy.metadata.resource_version = Some(self.next_resource_version());
        self.cluster_policies
            .lock()
            .expect("lock poisoned")
            .insert(name, policy);
    }

    /// Seeds a ClusterServiceVersion without counting it as a write.
    pub fn seed_csv(&self, csv: ClusterServiceVersion) {
        self.csvs
            .lock()
            .expect("lock poisoned")
            .insert(csv_key(&csv.metadata), csv);
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn next_resource_version(&self) -> String {
        (self.resource_versions.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

fn csv_key(metadata: &ObjectMeta) -> String {
    format!(
        "{}/{}",
        metadata.namespace.as_deref().unwrap_or("default"),
        metadata.name.as_deref().unwrap_or_default()
    )
}

fn not_found(kind: &str, name: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} {} not found", kind, name),
        reason: "NotFound".to_string(),
        code: 404,
    })
}

fn conflict(kind: &str, name: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} {} was modified concurrently", kind, name),
        reason: "Conflict".to_string(),
        code: 409,
    })
}

fn already_exists(kind: &str, name: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} {} already exists", kind, name),
        reason: "AlreadyExists".to_string(),
        code: 409,
    })
}

#[async_trait]
impl ObjectStore<ClusterPolicy> for FakeStore {
    async fn get(&self, _namespace: Option<&str>, name: &str) -> Result<ClusterPolicy, kube::Error> {
        self.cluster_policies
            .lock()
            .expect("lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("ClusterPolicy", name))
    }

    async fn list(&self, _namespace: Option<&str>) -> Result<Vec<ClusterPolicy>, kube::Error> {
        Ok(self
            .cluster_policies
            .lock()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn create(&self, obj: &ClusterPolicy) -> Result<ClusterPolicy, kube::Error> {
        let name = obj.metadata.name.clone().unwrap_or_default();
        let mut policies = self.cluster_policies.lock().expect("lock poisoned");
        if policies.contains_key(&name) {
            return Err(already_exists("ClusterPolicy", &name));
        }

        let mut stored = obj.clone();
        stored.metadata.resource_version = Some(self.next_resource_version());
        policies.insert(name, stored.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn update(&self, obj: &ClusterPolicy) -> Result<ClusterPolicy, kube::Error> {
        let name = obj.metadata.name.clone().unwrap_or_default();
        let mut policies = self.cluster_policies.lock().expect("lock poisoned");
        let current = policies
            .get(&name)
            .ok_or_else(|| not_found("ClusterPolicy", &name))?;
        if obj.metadata.resource_version != current.metadata.resource_version {
            return Err(conflict("ClusterPolicy", &name));
        }

        let mut stored = obj.clone();
        stored.metadata.resource_version = Some(self.next_resource_version());
        policies.insert(name, stored.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn delete(&self, _namespace: Option<&str>, name: &str) -> Result<(), kube::Error> {
        let mut policies = self.cluster_policies.lock().expect("lock poisoned");
        if policies.remove(name).is_none() {
            return Err(not_found("ClusterPolicy", name));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore<ClusterServiceVersion> for FakeStore {
    async fn get(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<ClusterServiceVersion, kube::Error> {
        let key = format!("{}/{}", namespace.unwrap_or("default"), name);
        self.csvs
            .lock()
            .expect("lock poisoned")
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found("ClusterServiceVersion", name))
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<ClusterServiceVersion>, kube::Error> {
        let csvs = self.csvs.lock().expect("lock poisoned");
        Ok(csvs
            .values()
            .filter(|csv| match namespace {
                Some(ns) => csv.metadata.namespace.as_deref() == Some(ns),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn create(&self, obj: &ClusterServiceVersion) -> Result<ClusterServiceVersion, kube::Error> {
        let key = csv_key(&obj.metadata);
        let mut csvs = self.csvs.lock().expect("lock poisoned");
        if csvs.contains_key(&key) {
            return Err(already_exists("ClusterServiceVersion", &key));
        }
        csvs.insert(key, obj.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(obj.clone())
    }

    async fn update(&self, obj: &ClusterServiceVersion) -> Result<ClusterServiceVersion, kube::Error> {
        let key = csv_key(&obj.metadata);
        let mut csvs = self.csvs.lock().expect("lock poisoned");
        if !csvs.contains_key(&key) {
            return Err(not_found("ClusterServiceVersion", &key));
        }
        csvs.insert(key, obj.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(obj.clone())
    }

    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<(), kube::Error> {
        let key = format!("{}/{}", namespace.unwrap_or("default"), name);
        let mut csvs = self.csvs.lock().expect("lock poisoned");
        if csvs.remove(&key).is_none() {
            return Err(not_found("ClusterServiceVersion", name));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration the tests wire reconcilers with.
pub fn test_config() -> Config {
    Config {
        cluster_policy_name: "gpu-cluster-policy".to_string(),
        namespace: "nvidia-gpu-addon".to_string(),
        gpu_operator_csv_prefix: "gpu-operator-certified".to_string(),
    }
}

/// Helper to create a test GPUAddon. An empty `driver_version` selects the
/// CSV inspection path.
pub fn create_test_gpu_addon(name: &str, namespace: &str, driver_version: &str) -> GPUAddon {
    GPUAddon {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: GPUAddonSpec {
            driver_version: driver_version.to_string(),
        },
        status: None,
    }
}

/// Helper to create a baseline ClusterPolicy under the given name.
pub fn create_test_cluster_policy(name: &str) -> ClusterPolicy {
    ClusterPolicy {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: ClusterPolicySpec::baseline(),
        status: None,
    }
}

/// Helper to create a GPU operator CSV declaring the given related images.
pub fn create_test_csv(
    namespace: &str,
    name: &str,
    related_images: Vec<(&str, &str)>,
) -> ClusterServiceVersion {
    ClusterServiceVersion {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: ClusterServiceVersionSpec {
            display_name: "NVIDIA GPU Operator".to_string(),
            version: "1.10.1".to_string(),
            related_images: related_images
                .into_iter()
                .map(|(name, image)| RelatedImage {
                    name: name.to_string(),
                    image: image.to_string(),
                })
                .collect(),
        },
    }
}
