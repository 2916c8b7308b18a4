use k8s_openapi::api::core::v1::ConfigMap;
use kcpcore_store::{ObjectStore, StoreError};
use kcpcore_types::{APIExport, ClusterPath};
use owo_colors::OwoColorize;

use crate::reconcile::{ApiExportSummary, IDENTITY_CACHE_BLOB_NAME, IdentityCacheAction, reconcile};

/// Adapts the pure [`reconcile`] decision into the single mutating store
/// call spec §4.3 allows per invocation. Wired by `kcpcore-operator` into a
/// `tokio::time::interval` tick, mirroring how the teacher's metrics server
/// runs its own maintenance loop on a timer (`common/src/metrics.rs`).
pub async fn run_once(
    exports: &dyn ObjectStore<APIExport>,
    blobs: &dyn ObjectStore<ConfigMap>,
    global_cluster: &ClusterPath,
) -> Result<IdentityCacheAction, StoreError> {
    let summaries: Vec<ApiExportSummary> = exports
        .list(global_cluster)
        .await?
        .into_iter()
        .map(|export| ApiExportSummary {
            name: export.metadata.name.clone().unwrap_or_default(),
            identity_hash: export.status.and_then(|s| s.identity_hash),
        })
        .collect();

    let cache_cluster = ClusterPath::system_identity_cache();
    let current = blobs.get(&cache_cluster, IDENTITY_CACHE_BLOB_NAME).await?;
    let action = reconcile(&summaries, current.as_ref());

    match &action {
        IdentityCacheAction::Noop => {}
        IdentityCacheAction::Create(cm) => {
            blobs.create(&cache_cluster, cm.clone()).await?;
            println!("{}", "🔑 Identity cache blob created".green());
        }
        IdentityCacheAction::Update(cm) => {
            blobs.update(&cache_cluster, cm.clone()).await?;
            println!("{}", "🔑 Identity cache blob updated".green());
        }
    }

    Ok(action)
}

#[cfg(test)]
mod tests {
    use kcpcore_store::fake::FakeStore;
    use kcpcore_types::{APIExport, APIExportSpec, APIExportStatus};
    use kube::api::ObjectMeta;

    use super::*;

    fn export(name: &str, hash: Option<&str>) -> APIExport {
        APIExport {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                ..Default::default()
            },
            spec: APIExportSpec::default(),
            status: Some(APIExportStatus {
                identity_hash: hash.map(str::to_owned),
            }),
        }
    }

    #[tokio::test]
    async fn first_run_creates_blob_from_global_exports() {
        let global = ClusterPath::new("root");
        let exports = FakeStore::<APIExport>::new("APIExport");
        exports
            .create(&global, export("some-export", Some("hash1")))
            .await
            .unwrap();
        let blobs = FakeStore::<ConfigMap>::new("ConfigMap");

        let action = run_once(&exports, &blobs, &global).await.unwrap();
        assert!(matches!(action, IdentityCacheAction::Create(_)));

        let stored = blobs
            .get(&ClusterPath::system_identity_cache(), IDENTITY_CACHE_BLOB_NAME)
            .await
            .unwrap()
            .expect("blob created");
        assert_eq!(stored.data.unwrap().get("some-export"), Some(&"hash1".to_owned()));
    }

    #[tokio::test]
    async fn second_run_with_unchanged_exports_is_noop() {
        let global = ClusterPath::new("root");
        let exports = FakeStore::<APIExport>::new("APIExport");
        exports
            .create(&global, export("some-export", Some("hash1")))
            .await
            .unwrap();
        let blobs = FakeStore::<ConfigMap>::new("ConfigMap");

        run_once(&exports, &blobs, &global).await.unwrap();
        let second = run_once(&exports, &blobs, &global).await.unwrap();
        assert_eq!(second, IdentityCacheAction::Noop);
    }
}
