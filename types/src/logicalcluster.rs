use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lock::{RESOURCE_BINDINGS_ANNOTATION, ResourceBindingsAnnotation, parse_lock_map, serialize_lock_map};

/// `LogicalCluster` carries no meaningful spec for this subsystem's
/// purposes; its `ResourceBindingsAnnotation` lives on `metadata.annotations`
/// per spec §3/§6, not in a typed field, since the lock map is shared with
/// a peer reconciler that only knows about annotations.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "core.kcpcore.io",
    version = "v1alpha1",
    kind = "LogicalCluster",
    plural = "logicalclusters",
    derive = "PartialEq",
    status = "LogicalClusterStatus",
    namespaced
)]
pub struct LogicalClusterSpec {}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct LogicalClusterStatus {}

impl LogicalCluster {
    /// Parse this cluster's lock map. An object with no annotation (or an
    /// empty one) has no claims yet.
    pub fn lock_map(&self) -> Result<ResourceBindingsAnnotation, serde_json::Error> {
        let raw = self
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(RESOURCE_BINDINGS_ANNOTATION))
            .map(String::as_str);
        parse_lock_map(raw)
    }

    /// Write `map` back into `metadata.annotations`, ready for an
    /// optimistic-concurrency update (the caller is responsible for using
    /// `metadata.resource_version` as the CAS token).
    pub fn set_lock_map(&mut self, map: &ResourceBindingsAnnotation) -> Result<(), serde_json::Error> {
        let serialized = serialize_lock_map(map)?;
        self.metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(RESOURCE_BINDINGS_ANNOTATION.to_owned(), serialized);
        Ok(())
    }
}
