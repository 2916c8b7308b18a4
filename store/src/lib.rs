//! The typed object store boundary described in spec §6.
//!
//! This is deliberately thin: the reconcilers in this workspace never talk
//! to `kube::Api<T>` directly, they talk to `&dyn ObjectStore<T>`. That
//! keeps every suspension point (spec §5) explicit and lets tests substitute
//! [`fake::FakeStore`] for a live apiserver.

pub mod fake;
pub mod kube_store;

use async_trait::async_trait;
use kcpcore_types::ClusterPath;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found in cluster '{cluster}'")]
    NotFound {
        kind: &'static str,
        cluster: String,
        name: String,
    },

    #[error("conflicting update to '{name}' in cluster '{cluster}': resource version changed")]
    Conflict { cluster: String, name: String },

    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("malformed object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// `get`/`list`/`create`/`update` per entity kind, backed either by a real
/// apiserver (`kube_store::KubeStore`) or an in-memory double
/// (`fake::FakeStore`). Listing is expected to be index-backed and gets
/// cache-backed in a production implementation; this trait makes no
/// promise about either, it only fixes the shape callers may rely on.
#[async_trait]
pub trait ObjectStore<T>: Send + Sync {
    async fn get(&self, cluster: &ClusterPath, name: &str) -> Result<Option<T>, StoreError>;
    async fn list(&self, cluster: &ClusterPath) -> Result<Vec<T>, StoreError>;
    async fn create(&self, cluster: &ClusterPath, obj: T) -> Result<T, StoreError>;
    async fn update(&self, cluster: &ClusterPath, obj: T) -> Result<T, StoreError>;
}
