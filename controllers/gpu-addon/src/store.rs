//! Typed access to cluster-stored objects.
//!
//! Reconcilers talk to the cluster through the `ObjectStore` capability
//! trait instead of `kube::Api` directly, so the test suite can substitute
//! an in-memory store with the same not-found/conflict semantics.

use async_trait::async_trait;
use crds::{ClusterPolicy, ClusterServiceVersion};
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};

/// CRUD capabilities over a single object kind.
///
/// Errors stay `kube::Error` on purpose: callers classify 404/409 via
/// [`is_not_found`] / [`is_conflict`] and surface everything else
/// unmodified. Optimistic concurrency is the API server's
/// `resourceVersion` token, checked on `update`.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync {
    /// Fetch one object by name. Cluster-scoped kinds pass `None`.
    async fn get(&self, namespace: Option<&str>, name: &str) -> Result<K, kube::Error>;

    /// List all objects in scope.
    async fn list(&self, namespace: Option<&str>) -> Result<Vec<K>, kube::Error>;

    /// Create a new object. Fails with a 409 when racing an existing one.
    async fn create(&self, obj: &K) -> Result<K, kube::Error>;

    /// Replace an existing object. Fails with a 409 when the object's
    /// `resourceVersion` is stale.
    async fn update(&self, obj: &K) -> Result<K, kube::Error>;

    /// Delete by name. Fails with a 404 when already absent.
    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<(), kube::Error>;
}

/// Returns true when the error is a 404 from the API server.
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

/// Returns true when the error is a 409: an update against a stale
/// `resourceVersion`, or a create racing an existing object.
pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 409)
}

/// Kubernetes-API-backed store.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn cluster_policies(&self) -> Api<ClusterPolicy> {
        Api::all(self.client.clone())
    }

    fn csvs(&self, namespace: Option<&str>) -> Api<ClusterServiceVersion> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

#[async_trait]
impl ObjectStore<ClusterPolicy> for KubeStore {
    async fn get(&self, _namespace: Option<&str>, name: &str) -> Result<ClusterPolicy, kube::Error> {
        self.cluster_policies().get(name).await
    }

    async fn list(&self, _namespace: Option<&str>) -> Result<Vec<ClusterPolicy>, kube::Error> {
        let list = self.cluster_policies().list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn create(&self, obj: &ClusterPolicy) -> Result<ClusterPolicy, kube::Error> {
        self.cluster_policies()
            .create(&PostParams::default(), obj)
            .await
    }

    async fn update(&self, obj: &ClusterPolicy) -> Result<ClusterPolicy, kube::Error> {
        let name = obj.metadata.name.clone().unwrap_or_default();
        self.cluster_policies()
            .replace(&name, &PostParams::default(), obj)
            .await
    }

    async fn delete(&self, _namespace: Option<&str>, name: &str) -> Result<(), kube::Error> {
        self.cluster_policies()
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ObjectStore<ClusterServiceVersion> for KubeStore {
    async fn get(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<ClusterServiceVersion, kube::Error> {
        self.csvs(namespace).get(name).await
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<ClusterServiceVersion>, kube::Error> {
        let list = self.csvs(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn create(&self, obj: &ClusterServiceVersion) -> Result<ClusterServiceVersion, kube::Error> {
        let namespace = obj.metadata.namespace.clone();
        self.csvs(namespace.as_deref())
            .create(&PostParams::default(), obj)
            .await
    }

    async fn update(&self, obj: &ClusterServiceVersion) -> Result<ClusterServiceVersion, kube::Error> {
        let namespace = obj.metadata.namespace.clone();
        let name = obj.metadata.name.clone().unwrap_or_default();
        self.csvs(namespace.as_deref())
            .replace(&name, &PostParams::default(), obj)
            .await
    }

    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<(), kube::Error> {
        self.csvs(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
    }
}
