use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::{DateTime, Utc};
use kcpcore_store::{ObjectStore, StoreError};
use kcpcore_types::condition::{reasons, types as cond_types};
use kcpcore_types::crd::CustomResourceDefinition;
use kcpcore_types::{
    APIBinding, APIBindingPhase, APIExport, APIResourceSchema, BoundAPIResource, BoundSchemaRef,
    ClusterPath, ConditionSet, LogicalCluster, Severity, lock_key,
};

use crate::conflict::{claim_lock, lock_map_conflict, peer_binding_conflict};
use crate::error::ReconcileError;
use crate::materialize::{build_bound_crd, is_established, stored_versions};
use crate::recently_deleted::RecentlyDeletedCrds;

/// Name of the singleton `LogicalCluster` object carried in every logical
/// cluster, matching the upstream convention this system inherits.
pub const LOGICAL_CLUSTER_NAME: &str = "cluster";

const MAX_LOCK_CLAIM_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    No,
    Immediate,
}

pub struct ReconcileContext<'a> {
    pub exports: &'a dyn ObjectStore<APIExport>,
    pub schemas: &'a dyn ObjectStore<APIResourceSchema>,
    pub logical_clusters: &'a dyn ObjectStore<LogicalCluster>,
    pub bound_crds: &'a dyn ObjectStore<CustomResourceDefinition>,
    /// Native, user-authored CRDs, scoped to `consumer_cluster`. Kept
    /// distinct from `bound_crds`: that store holds the materialized
    /// bound-CRD objects in the system-bound-crds cluster, keyed globally
    /// by schema UID, while this one answers "does a native CRD still
    /// exist in *this* consumer cluster" for the lock-map conflict check
    /// (spec §4.1 step 5) — a question `bound_crds` cannot answer without
    /// conflating unrelated tenants that happen to share one apiserver.
    pub native_crds: &'a dyn ObjectStore<CustomResourceDefinition>,
    pub bindings: &'a dyn ObjectStore<APIBinding>,
    pub recently_deleted: &'a RecentlyDeletedCrds,
    pub consumer_cluster: ClusterPath,
    pub now: DateTime<Utc>,
}

impl<'a> ReconcileContext<'a> {
    fn now_time(&self) -> Time {
        Time(self.now)
    }
}

/// The APIBinding reconciler's single entry point (spec §4.1). Mutates only
/// `binding`'s status; callers own persistence of both the binding and any
/// side effects already committed to the store (LogicalCluster lock map,
/// bound CRDs) during this call.
pub async fn reconcile(
    ctx: &ReconcileContext<'_>,
    binding: &mut APIBinding,
) -> Result<Requeue, ReconcileError> {
    let binding_name = binding.metadata.name.clone().unwrap_or_default();
    let status = binding.status.get_or_insert_with(Default::default);
    if status.phase.is_none() {
        status.phase = Some(APIBindingPhase::Binding);
    }

    // Step 1: export resolution.
    let Some(export_ref) = binding.spec.export.clone() else {
        let status = binding.status.get_or_insert_with(Default::default);
        let mut conditions = ConditionSet::new(&mut status.conditions);
        conditions.set_false(
            cond_types::API_EXPORT_VALID,
            Severity::Error,
            reasons::INVALID_REFERENCE,
            "spec.export is unset",
            ctx.now_time(),
        );
        return Ok(Requeue::No);
    };

    let export_cluster = ClusterPath::from(export_ref.path.clone());
    let export = match ctx.exports.get(&export_cluster, &export_ref.name).await {
        Ok(Some(export)) => export,
        Ok(None) => {
            set_export_condition(
                binding,
                ctx,
                Severity::Error,
                reasons::NOT_FOUND,
                &format!("APIExport {} not found in {}", export_ref.name, export_ref.path),
            );
            return Ok(Requeue::No);
        }
        Err(e) => {
            set_export_condition(binding, ctx, Severity::Error, reasons::INTERNAL_ERROR, &e.to_string());
            return Err(ReconcileError::Internal(e.to_string()));
        }
    };

    // Step 2: identity gate.
    let Some(identity_hash) = export.status.as_ref().and_then(|s| s.identity_hash.clone()) else {
        return Ok(Requeue::No);
    };

    // Step 3: schema resolution.
    let mut resolved = Vec::with_capacity(export.spec.resource_schemas.len());
    for resource in &export.spec.resource_schemas {
        let schema = match ctx.schemas.get(&export_cluster, &resource.schema).await {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                set_export_condition(
                    binding,
                    ctx,
                    Severity::Error,
                    reasons::INTERNAL_ERROR,
                    &format!("APIResourceSchema {} referenced by export but not found", resource.schema),
                );
                return Ok(Requeue::No);
            }
            Err(e) => {
                set_export_condition(binding, ctx, Severity::Error, reasons::INTERNAL_ERROR, &e.to_string());
                return Err(ReconcileError::Internal(e.to_string()));
            }
        };
        resolved.push((resource.clone(), schema));
    }

    // Step 4: LogicalCluster acquisition.
    let Some(mut logical_cluster) = ctx
        .logical_clusters
        .get(&ctx.consumer_cluster, LOGICAL_CLUSTER_NAME)
        .await
        .map_err(|e| ReconcileError::Transient(e))?
    else {
        set_progress_condition(
            binding,
            ctx,
            Severity::Error,
            reasons::LOGICAL_CLUSTER_NOT_FOUND,
            &format!("LogicalCluster not found in {}", ctx.consumer_cluster),
        );
        return Err(ReconcileError::Internal("logical cluster missing".into()));
    };

    // Steps 5 & 6: conflict checks against the lock map and peer bindings.
    let peers = ctx.bindings.list(&ctx.consumer_cluster).await.map_err(ReconcileError::Transient)?;
    let lock_map = logical_cluster.lock_map().map_err(|e| ReconcileError::Internal(e.to_string()))?;

    for (resource, schema) in &resolved {
        let key = lock_key(&resource.group, &resource.resource);
        // A native CRD in the *consumer* cluster, not the system-bound-crds
        // cluster — this is the object a CRD-owned lock entry guards.
        let existing_crd = ctx
            .native_crds
            .list(&ctx.consumer_cluster)
            .await
            .map_err(ReconcileError::Transient)?
            .iter()
            .any(|crd| {
                crd.spec.group == resource.group && crd.spec.names.plural == schema.spec.names.plural
            });

        if let Some(holder) = lock_map_conflict(&lock_map, &key, &binding_name, ctx.now, existing_crd) {
            set_progress_condition(
                binding,
                ctx,
                Severity::Error,
                reasons::NAMING_CONFLICTS,
                &format!("{} is owned by {}", key, holder),
            );
            return Err(ReconcileError::Conflict {
                cluster: ctx.consumer_cluster.to_string(),
                resource: key,
                holder,
            });
        }

        let schema_uid = schema.metadata.uid.clone().unwrap_or_default();
        if let Some(peer) = peer_binding_conflict(&peers, &binding_name, &resource.group, &resource.resource, &schema_uid) {
            set_progress_condition(
                binding,
                ctx,
                Severity::Error,
                reasons::NAMING_CONFLICTS,
                &format!("{} already bound by {}", key, peer),
            );
            return Err(ReconcileError::Conflict {
                cluster: ctx.consumer_cluster.to_string(),
                resource: key,
                holder: peer,
            });
        }
    }

    // Step 7: lock claim with bounded optimistic-concurrency retry.
    let mut attempt = 0;
    loop {
        let mut map = logical_cluster.lock_map().map_err(|e| ReconcileError::Internal(e.to_string()))?;
        for (resource, _) in &resolved {
            claim_lock(&mut map, &lock_key(&resource.group, &resource.resource), &binding_name);
        }
        logical_cluster
            .set_lock_map(&map)
            .map_err(|e| ReconcileError::Internal(e.to_string()))?;

        match ctx.logical_clusters.update(&ctx.consumer_cluster, logical_cluster.clone()).await {
            Ok(_) => break,
            Err(StoreError::Conflict { .. }) => {
                attempt += 1;
                if attempt >= MAX_LOCK_CLAIM_ATTEMPTS {
                    return Err(ReconcileError::Internal("exhausted lock-claim retries".into()));
                }
                logical_cluster = ctx
                    .logical_clusters
                    .get(&ctx.consumer_cluster, LOGICAL_CLUSTER_NAME)
                    .await
                    .map_err(ReconcileError::Transient)?
                    .ok_or_else(|| ReconcileError::Internal("logical cluster disappeared mid-retry".into()))?;
                continue;
            }
            Err(e) => return Err(ReconcileError::Internal(e.to_string())),
        }
    }

    // Step 8: CRD materialization.
    let mut crds = Vec::with_capacity(resolved.len());
    for (resource, schema) in &resolved {
        let schema_uid = schema.metadata.uid.clone().unwrap_or_default();
        let schema_name = schema.metadata.name.clone().unwrap_or_default();
        let crd_spec = match build_bound_crd(&schema_uid, &schema_name, &export_ref.path, &schema.spec) {
            Ok(crd) => crd,
            Err(ReconcileError::UserInput(msg)) => {
                set_progress_condition(binding, ctx, Severity::Error, reasons::API_RESOURCE_SCHEMA_INVALID, &msg);
                return Ok(Requeue::No);
            }
            Err(other) => return Err(other),
        };

        if ctx.recently_deleted.contains(&schema_uid) {
            // Tombstone may not have propagated yet; skip this pass rather
            // than racing a recreate.
            set_progress_condition(binding, ctx, Severity::Warning, reasons::WAITING_FOR_ESTABLISHED, "bound CRD recently deleted, waiting before recreating");
            return Ok(Requeue::Immediate);
        }

        let existing = ctx
            .bound_crds
            .get(&ClusterPath::system_bound_crds(), &schema_uid)
            .await
            .map_err(ReconcileError::Transient)?;

        let crd = match existing {
            Some(crd) => crd,
            None => ctx
                .bound_crds
                .create(&ClusterPath::system_bound_crds(), crd_spec)
                .await
                .map_err(|e| match e {
                    StoreError::Conflict { .. } => ReconcileError::Conflict {
                        cluster: "system:bound-crds".into(),
                        resource: schema_uid.clone(),
                        holder: "<concurrent creator>".into(),
                    },
                    other => ReconcileError::Internal(other.to_string()),
                })?,
        };
        crds.push((resource.clone(), schema_name, schema_uid, crd));
    }

    // Step 9: establishment wait.
    let not_established: Vec<_> = crds.iter().filter(|(_, _, _, crd)| !is_established(crd)).collect();
    if !not_established.is_empty() {
        set_progress_condition(
            binding,
            ctx,
            Severity::Warning,
            reasons::WAITING_FOR_ESTABLISHED,
            &format!("{} bound CRD(s) not yet established", not_established.len()),
        );
        let status = binding.status.get_or_insert_with(Default::default);
        let mut conditions = ConditionSet::new(&mut status.conditions);
        conditions.set_false(cond_types::READY, Severity::Info, reasons::WAITING_FOR_ESTABLISHED, "waiting for CRDs to establish", ctx.now_time());
        return Ok(Requeue::Immediate);
    }

    // Step 10: bound-resources emission with accumulative storage versions.
    let status = binding.status.get_or_insert_with(Default::default);
    let mut bound_resources = Vec::with_capacity(crds.len());
    for (resource, schema_name, schema_uid, crd) in &crds {
        let mut versions = status
            .bound_resource(&resource.group, &resource.resource)
            .map(|r| r.storage_versions.clone())
            .unwrap_or_default();
        for v in stored_versions(crd) {
            if !versions.contains(&v) {
                versions.push(v);
            }
        }
        bound_resources.push(BoundAPIResource {
            group: resource.group.clone(),
            resource: resource.resource.clone(),
            schema: BoundSchemaRef {
                name: schema_name.clone(),
                uid: schema_uid.clone(),
            },
            identity_hash: identity_hash.clone(),
            storage_versions: versions,
        });
    }
    status.bound_resources = bound_resources;
    status.phase = Some(APIBindingPhase::Bound);
    #[cfg(feature = "virtual-workspace-urls")]
    {
        status.virtual_workspace_urls = virtual_workspace_urls(&export_ref.path, &export_ref.name);
    }

    let mut conditions = ConditionSet::new(&mut status.conditions);
    conditions.set_true(cond_types::API_EXPORT_VALID, ctx.now_time());
    conditions.set_true(cond_types::INITIAL_BINDING_COMPLETED, ctx.now_time());
    conditions.set_true(cond_types::READY, ctx.now_time());

    Ok(Requeue::No)
}

fn set_export_condition(binding: &mut APIBinding, ctx: &ReconcileContext<'_>, severity: Severity, reason: &str, message: &str) {
    let status = binding.status.get_or_insert_with(Default::default);
    let mut conditions = ConditionSet::new(&mut status.conditions);
    conditions.set_false(cond_types::API_EXPORT_VALID, severity, reason, message, ctx.now_time());
}

fn set_progress_condition(binding: &mut APIBinding, ctx: &ReconcileContext<'_>, severity: Severity, reason: &str, message: &str) {
    let status = binding.status.get_or_insert_with(Default::default);
    let mut conditions = ConditionSet::new(&mut status.conditions);
    conditions.set_false(cond_types::INITIAL_BINDING_COMPLETED, severity, reason, message, ctx.now_time());
}

/// Derives the export's virtual workspace read URL. Path-based, not a
/// store lookup: emitting this never costs a reconcile an extra round trip
/// and never fails, which is what keeps it a pure status side-effect that
/// cannot perturb phase or Ready.
#[cfg(feature = "virtual-workspace-urls")]
fn virtual_workspace_urls(export_path: &str, export_name: &str) -> Vec<String> {
    vec![format!(
        "https://virtual-workspaces.kcpcore.io/services/apiexport/{export_path}/{export_name}"
    )]
}
