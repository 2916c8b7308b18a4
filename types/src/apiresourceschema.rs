use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct ResourceNames {
    pub plural: String,
    pub singular: String,
    pub kind: String,
    pub list_kind: String,
    #[serde(default)]
    pub short_names: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema, Default)]
pub enum ResourceScope {
    #[default]
    Namespaced,
    Cluster,
}

/// One version of a schema's served shape. `schema` and `subresources` /
/// `additional_printer_columns` are kept as raw JSON here (the producer's
/// own serialized representation); the reconciler parses them into the
/// real `apiextensions.k8s.io/v1` shapes when materializing a bound CRD
/// (spec §4.1 step 8), so a malformed payload surfaces as a
/// schema-invalid condition rather than a type error this far upstream.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SchemaVersion {
    pub name: String,
    pub served: bool,
    pub storage: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_warning: Option<String>,
    /// Raw JSON Schema (structural schema), e.g. `{"type":"object",...}`.
    pub schema: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresources: Option<serde_json::Value>,
    #[serde(default)]
    pub additional_printer_columns: Vec<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConversionStrategy {
    None,
    Webhook,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "apis.kcpcore.io",
    version = "v1alpha1",
    kind = "APIResourceSchema",
    plural = "apiresourceschemas",
    derive = "PartialEq",
    namespaced
)]
pub struct APIResourceSchemaSpec {
    pub group: String,
    pub names: ResourceNames,
    #[serde(default)]
    pub scope: ResourceScope,
    pub versions: Vec<SchemaVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionStrategy>,
}

impl APIResourceSchemaSpec {
    /// True when more than one version is declared but no conversion
    /// strategy was supplied (spec §3 invariant, checked again at
    /// materialization time in spec §4.1 step 8).
    pub fn missing_required_conversion(&self) -> bool {
        self.versions.len() > 1 && self.conversion.is_none()
    }

    pub fn storage_version(&self) -> Option<&SchemaVersion> {
        self.versions.iter().find(|v| v.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(name: &str, storage: bool) -> SchemaVersion {
        SchemaVersion {
            name: name.to_owned(),
            served: true,
            storage,
            deprecated: false,
            deprecation_warning: None,
            schema: serde_json::json!({"type": "object"}),
            subresources: None,
            additional_printer_columns: Vec::new(),
        }
    }

    #[test]
    fn single_version_needs_no_conversion() {
        let spec = APIResourceSchemaSpec {
            group: "kcp.io".into(),
            names: ResourceNames::default(),
            scope: ResourceScope::Namespaced,
            versions: vec![version("v1", true)],
            conversion: None,
        };
        assert!(!spec.missing_required_conversion());
    }

    #[test]
    fn multiple_versions_require_conversion() {
        let spec = APIResourceSchemaSpec {
            group: "kcp.io".into(),
            names: ResourceNames::default(),
            scope: ResourceScope::Namespaced,
            versions: vec![version("v1", false), version("v2", true)],
            conversion: None,
        };
        assert!(spec.missing_required_conversion());
        let spec = APIResourceSchemaSpec {
            conversion: Some(ConversionStrategy::None),
            ..spec
        };
        assert!(!spec.missing_required_conversion());
    }
}
