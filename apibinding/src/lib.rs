//! The APIBinding reconciler: resolves exported API resources, arbitrates
//! exclusive (group, resource) ownership within a consumer cluster, and
//! materializes backing schemas as bound CRDs in the system cluster.

pub mod conflict;
pub mod error;
pub mod materialize;
pub mod recently_deleted;
pub mod reconcile;

pub use error::ReconcileError;
pub use recently_deleted::RecentlyDeletedCrds;
pub use reconcile::{LOGICAL_CLUSTER_NAME, ReconcileContext, Requeue, reconcile};
