use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One resource offered by an `APIExport`: a (group, resource) pair backed
/// by a named `APIResourceSchema`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct ExportedResourceSchema {
    pub group: String,
    pub resource: String,
    /// Name of the `APIResourceSchema` in the export's home cluster.
    pub schema: String,
    /// Opaque selector for which storage backend serves this resource.
    /// Not interpreted by the reconciler; plumbed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_selector: Option<String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "apis.kcpcore.io",
    version = "v1alpha2",
    kind = "APIExport",
    plural = "apiexports",
    derive = "PartialEq",
    status = "APIExportStatus",
    namespaced
)]
pub struct APIExportSpec {
    #[serde(default)]
    pub resource_schemas: Vec<ExportedResourceSchema>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct APIExportStatus {
    /// Stable cryptographic fingerprint of this export, derived on the
    /// producer side from a per-export secret. `None` until the producer
    /// has published it; bindings must wait rather than error (spec §4.1
    /// step 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_hash: Option<String>,
}
