use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct ExportReference {
    pub path: String,
    pub name: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "apis.kcpcore.io",
    version = "v1alpha2",
    kind = "APIBinding",
    plural = "apibindings",
    derive = "PartialEq",
    status = "APIBindingStatus",
    namespaced
)]
pub struct APIBindingSpec {
    /// `None` when the user created the binding without an export
    /// reference — an immediate `APIExportValid = False(InvalidReference)`
    /// per spec §4.1 step 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportReference>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum APIBindingPhase {
    Binding,
    Bound,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct BoundSchemaRef {
    pub name: String,
    pub uid: String,
}

/// One bound (group, resource), emitted once every backing CRD is
/// established (spec §4.1 step 10).
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct BoundAPIResource {
    pub group: String,
    pub resource: String,
    pub schema: BoundSchemaRef,
    pub identity_hash: String,
    /// Union of every version ever persisted for this resource in this
    /// cluster; monotonically grows (spec §3, §8 invariant 4).
    #[serde(default)]
    pub storage_versions: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct APIBindingStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<APIBindingPhase>,
    #[serde(default)]
    pub bound_resources: Vec<BoundAPIResource>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Read URLs for the export's virtual workspace, one per shard it is
    /// served from. Populated only when the `virtual-workspace-urls`
    /// feature is enabled; a pure status side-effect that never feeds back
    /// into phase or the Ready condition (spec §9 Design Notes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_workspace_urls: Vec<String>,
}

impl APIBindingStatus {
    pub fn bound_resource(&self, group: &str, resource: &str) -> Option<&BoundAPIResource> {
        self.bound_resources
            .iter()
            .find(|r| r.group == group && r.resource == resource)
    }
}
