use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use kube::{
    Api, Client, ResourceExt,
    runtime::{
        Controller,
        controller::Action,
        watcher::{self, Event},
    },
};
use kube_leader_election::{LeaseLock, LeaseLockParams, LeaseLockResult};
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;

use kcpcore_apibinding::{ReconcileContext, RecentlyDeletedCrds, Requeue, reconcile as reconcile_binding};
use kcpcore_store::ObjectStore;
use kcpcore_store::kube_store::{KubeClusterStore, KubeLabeledClusterStore, KubeStore, cluster_for};
use kcpcore_types::crd::{CustomResourceDefinition, annotations as crd_annotations, labels as crd_labels};
use kcpcore_types::{APIBinding, APIExport, APIResourceSchema, LogicalCluster};

use crate::error::Error;
use crate::util::PROBE_INTERVAL;
use crate::util::patch::patch_status;

/// Everything the APIBinding reconciler needs to talk to the live
/// apiserver, the live analogue of `apibinding::scenario_tests::Fixture`.
struct ContextData {
    client: Client,
    exports: KubeStore<APIExport>,
    schemas: KubeStore<APIResourceSchema>,
    logical_clusters: KubeStore<LogicalCluster>,
    bound_crds: KubeClusterStore<CustomResourceDefinition>,
    native_crds: KubeLabeledClusterStore<CustomResourceDefinition>,
    bindings: KubeStore<APIBinding>,
    recently_deleted: RecentlyDeletedCrds,
}

impl ContextData {
    fn new(client: Client) -> Self {
        Self {
            exports: KubeStore::new(client.clone(), "APIExport"),
            schemas: KubeStore::new(client.clone(), "APIResourceSchema"),
            logical_clusters: KubeStore::new(client.clone(), "LogicalCluster"),
            bound_crds: KubeClusterStore::new(client.clone()),
            native_crds: KubeLabeledClusterStore::new(client.clone(), crd_labels::OWNING_CLUSTER),
            bindings: KubeStore::new(client.clone(), "APIBinding"),
            recently_deleted: RecentlyDeletedCrds::default(),
            client,
        }
    }
}

/// Keeps `recently_deleted` in sync with the apiserver's view of bound CRDs:
/// a `Deleted` event remembers the schema UID (the bound CRD's name) so
/// reconcile.rs:239's race guard can actually suppress a recreate, and an
/// `Applied` event forgets it once the object is observed to exist again.
/// Runs for as long as the process does; leadership doesn't gate it since
/// it only ever mutates the in-memory `recently_deleted` set, never the
/// apiserver.
fn spawn_recently_deleted_watcher(ctx: Arc<ContextData>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let api: Api<CustomResourceDefinition> = Api::all(ctx.client.clone());
        let config = watcher::Config::default().labels(&format!("{}=true", crd_annotations::BOUND));
        let mut stream = Box::pin(watcher::watcher(api, config));
        loop {
            match stream.next().await {
                Some(Ok(Event::Applied(crd))) => ctx.recently_deleted.forget(&crd.name_any()),
                Some(Ok(Event::Deleted(crd))) => ctx.recently_deleted.remember(crd.name_any()),
                Some(Ok(Event::Restarted(_))) => {}
                Some(Err(e)) => kcpcore_common::print_warning(format!("bound-CRD watch stream error: {e}")),
                None => break,
            }
        }
    })
}

/// Adapts the pure `kcpcore_apibinding::reconcile` entry point into a
/// `kube::runtime::Controller` reconcile callback: fetch happens upstream
/// (the controller hands us the live object), we call `reconcile`, persist
/// the mutated status with an optimistic-concurrency patch, and translate
/// `Requeue`/`ReconcileError` into `Action`.
async fn reconcile_adapter(binding: Arc<APIBinding>, ctx: Arc<ContextData>) -> Result<Action, Error> {
    let namespace = binding
        .namespace()
        .ok_or_else(|| Error::UserInput("APIBinding is missing metadata.namespace".to_string()))?;
    let name = binding.name_any();
    let consumer_cluster = cluster_for(&namespace);

    let rctx = ReconcileContext {
        exports: &ctx.exports,
        schemas: &ctx.schemas,
        logical_clusters: &ctx.logical_clusters,
        bound_crds: &ctx.bound_crds,
        native_crds: &ctx.native_crds,
        bindings: &ctx.bindings,
        recently_deleted: &ctx.recently_deleted,
        consumer_cluster,
        now: k8s_openapi::chrono::Utc::now(),
    };

    let mut mutated = (*binding).clone();
    let start = Instant::now();
    let result = reconcile_binding(&rctx, &mut mutated).await;

    metrics::counter!("kcpcore_apibinding_reconcile_total").increment(1);
    metrics::histogram!("kcpcore_apibinding_reconcile_seconds").record(start.elapsed().as_secs_f64());

    if mutated.status != binding.status {
        patch_status(ctx.client.clone(), &*binding, &mutated).await?;
    }

    match result {
        Ok(Requeue::Immediate) => Ok(Action::requeue(Duration::from_secs(1))),
        Ok(Requeue::No) => Ok(Action::requeue(PROBE_INTERVAL)),
        Err(e) => {
            kcpcore_common::print_warning(format!("{namespace}/{name} requeued after error: {e}"));
            Err(e.into())
        }
    }
}

/// Backoff policy lives on `ReconcileError` itself
/// (`should_return_error`/`condition_reason`), not here: a `Reconcile`
/// error that the reconciler already absorbed into a condition (UserInput,
/// NotFound) gets a longer, calmer requeue, while everything else backs off
/// at the taxonomy's usual five seconds.
fn on_error(binding: Arc<APIBinding>, error: &Error, _ctx: Arc<ContextData>) -> Action {
    let (reason, requeue_after) = match error {
        Error::Reconcile(e) if !e.should_return_error() => (e.condition_reason(), PROBE_INTERVAL),
        Error::Reconcile(e) => (e.condition_reason(), Duration::from_secs(5)),
        _ => ("InternalError", Duration::from_secs(5)),
    };
    eprintln!(
        "{}",
        format!("Reconciliation error for {} ({reason}): {error}", binding.name_any()).red()
    );
    Action::requeue(requeue_after)
}

/// Entrypoint for the APIBinding controller. Leader-elected the same way
/// `clusters/reconcile.rs::run` elects leadership for the Cluster
/// controller: only the replica holding the lease runs a live
/// `kube::runtime::Controller`, every other replica stands by.
pub async fn run(
    client: Client,
    lease_namespace: String,
    lease_ttl: Duration,
    renew_every: Duration,
) -> Result<(), Error> {
    println!("{}", "⚙️ Starting APIBinding controller...".green());
    let context: Arc<ContextData> = Arc::new(ContextData::new(client.clone()));
    spawn_recently_deleted_watcher(context.clone());

    let holder_id = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("kcpcore-apibinding-controller-{}", uuid::Uuid::new_v4()));
    let leadership = LeaseLock::new(
        client.clone(),
        &lease_namespace,
        LeaseLockParams {
            holder_id,
            lease_name: "kcpcore-apibinding-controller-lock".to_string(),
            lease_ttl,
        },
    );

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        kcpcore_common::shutdown::shutdown_signal().await;
        shutdown_signal.cancel();
    });
    kcpcore_common::signal_ready();

    let mut controller_task: Option<tokio::task::JoinHandle<()>> = None;
    let mut tick = tokio::time::interval(renew_every);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                if let Some(task) = controller_task.take() {
                    task.abort();
                    task.await.ok();
                }
                break Ok(());
            }
            _ = tick.tick() => {}
        }

        let lease = match leadership.try_acquire_or_renew().await {
            Ok(l) => l,
            Err(e) => {
                eprintln!("leader election renew/acquire failed: {e}");
                if let Some(task) = controller_task.take() {
                    task.abort();
                    eprintln!("aborted controller due to leader election error");
                }
                continue;
            }
        };

        if matches!(lease, LeaseLockResult::Acquired(_)) {
            if controller_task.is_none() {
                println!("{}", "👑 Acquired leadership; starting APIBinding controller".green());
                // `APIBinding`s are namespaced per consumer logical cluster
                // (`kcpcore_store::kube_store::namespace_for`), so the
                // controller must watch every namespace rather than one.
                let api: Api<APIBinding> = Api::all(client.clone());
                let context_for_controller = context.clone();
                controller_task = Some(tokio::spawn(async move {
                    println!("{}", "🚀 APIBinding controller started.".green());
                    Controller::new(api, Default::default())
                        .run(reconcile_adapter, on_error, context_for_controller)
                        .for_each(|_res| async move {})
                        .await;
                }));
            }
        } else if let Some(task) = controller_task.take() {
            eprintln!("lost leadership; stopping APIBinding controller");
            task.abort();
        }
    }
}
