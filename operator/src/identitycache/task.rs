use std::time::Duration;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::Client;
use owo_colors::OwoColorize;

use kcpcore_identitycache::run_once;
use kcpcore_store::kube_store::KubeStore;
use kcpcore_types::{APIExport, ClusterPath};

/// Periodic wrapper around the one-shot identity-cache reconciler (spec
/// §4.3): the reconciler itself makes at most one mutating call per
/// invocation, this loop is what decides when "per invocation" happens,
/// mirroring how `common/src/metrics.rs` runs its own maintenance loop on a
/// `tokio::time::interval` rather than reacting to a watch.
pub async fn run(client: Client, global_cluster: ClusterPath, period: Duration) {
    println!("{}", "🔑 Starting identity cache ticker...".green());
    let exports = KubeStore::<APIExport>::new(client.clone(), "APIExport");
    let blobs = KubeStore::<ConfigMap>::new(client, "ConfigMap");

    let mut tick = tokio::time::interval(period);
    loop {
        tick.tick().await;
        if let Err(e) = run_once(&exports, &blobs, &global_cluster).await {
            eprintln!("{}", format!("identity cache reconcile failed: {e}").red());
        }
    }
}
