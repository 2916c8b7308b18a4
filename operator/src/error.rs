/// Aggregates the error types that can surface while wiring the pure
/// reconcilers in this workspace into live `kube::runtime::Controller`
/// loops: store-layer failures, the reconciler's own taxonomy, and
/// apiserver errors encountered directly by the wiring code itself (status
/// patches, leader election).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] kcpcore_store::StoreError),

    #[error(transparent)]
    Reconcile(#[from] kcpcore_apibinding::ReconcileError),

    #[error("Kubernetes reported error: {0}")]
    Kube(#[from] kube::Error),

    #[error("invalid user input: {0}")]
    UserInput(String),
}
