use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceColumnDefinition, CustomResourceConversion, CustomResourceDefinition,
    CustomResourceDefinitionNames, CustomResourceDefinitionSpec, CustomResourceDefinitionVersion,
    CustomResourceSubresources, CustomResourceValidation, JSONSchemaProps,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kcpcore_types::{APIResourceSchemaSpec, ConversionStrategy, ResourceScope, crd::annotations};
use std::collections::BTreeMap;

use crate::error::ReconcileError;

/// Translates a producer-authored schema into the bound-CRD shape named in
/// spec §4.1 step 8. The object name is the schema's UID — deterministic
/// and collision-free across exports — never the user-visible plural
/// (spec §9 design note).
pub fn build_bound_crd(
    schema_uid: &str,
    schema_name: &str,
    schema_cluster: &str,
    spec: &APIResourceSchemaSpec,
) -> Result<CustomResourceDefinition, ReconcileError> {
    if spec.missing_required_conversion() {
        return Err(ReconcileError::UserInput(format!(
            "schema {schema_name} declares {} versions but no conversion strategy",
            spec.versions.len()
        )));
    }

    let versions = spec
        .versions
        .iter()
        .map(|v| {
            let schema = serde_json::from_value::<JSONSchemaProps>(v.schema.clone())
                .map_err(|e| ReconcileError::UserInput(format!("schema {schema_name} version {}: invalid structural schema: {e}", v.name)))?;
            let subresources = v
                .subresources
                .as_ref()
                .map(|raw| serde_json::from_value::<CustomResourceSubresources>(raw.clone()))
                .transpose()
                .map_err(|e| ReconcileError::UserInput(format!("schema {schema_name} version {}: invalid subresources: {e}", v.name)))?;
            let additional_printer_columns = if v.additional_printer_columns.is_empty() {
                None
            } else {
                Some(
                    v.additional_printer_columns
                        .iter()
                        .map(|raw| serde_json::from_value::<CustomResourceColumnDefinition>(raw.clone()))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| ReconcileError::UserInput(format!("schema {schema_name} version {}: invalid printer columns: {e}", v.name)))?,
                )
            };

            Ok(CustomResourceDefinitionVersion {
                name: v.name.clone(),
                served: v.served,
                storage: v.storage,
                deprecated: Some(v.deprecated),
                deprecation_warning: v.deprecation_warning.clone(),
                schema: Some(CustomResourceValidation {
                    open_apiv3_schema: Some(schema),
                }),
                subresources,
                additional_printer_columns,
            })
        })
        .collect::<Result<Vec<_>, ReconcileError>>()?;

    let mut labels_annotations = BTreeMap::new();
    labels_annotations.insert(annotations::LOGICAL_CLUSTER.to_owned(), annotations::SYSTEM_BOUND_CRDS_CLUSTER.to_owned());
    labels_annotations.insert(annotations::BOUND.to_owned(), "true".to_owned());
    labels_annotations.insert(annotations::SCHEMA_CLUSTER.to_owned(), schema_cluster.to_owned());
    labels_annotations.insert(annotations::SCHEMA_NAME.to_owned(), schema_name.to_owned());
    labels_annotations.insert(kcpcore_common::annotations::CREATED_BY.to_owned(), kcpcore_common::MANAGER_NAME.to_owned());
    // Lets a future reconciliation tell "schema changed under us" apart from
    // "apiserver echoed the object back unchanged" without a deep diff.
    labels_annotations.insert(kcpcore_common::annotations::SPEC_HASH.to_owned(), kcpcore_common::hash_spec(spec));

    Ok(CustomResourceDefinition {
        metadata: ObjectMeta {
            name: Some(schema_uid.to_owned()),
            annotations: Some(labels_annotations),
            ..Default::default()
        },
        spec: CustomResourceDefinitionSpec {
            group: spec.group.clone(),
            names: CustomResourceDefinitionNames {
                plural: spec.names.plural.clone(),
                singular: Some(spec.names.singular.clone()),
                kind: spec.names.kind.clone(),
                list_kind: Some(spec.names.list_kind.clone()),
                short_names: if spec.names.short_names.is_empty() {
                    None
                } else {
                    Some(spec.names.short_names.clone())
                },
                categories: None,
            },
            scope: match spec.scope {
                ResourceScope::Namespaced => "Namespaced".to_owned(),
                ResourceScope::Cluster => "Cluster".to_owned(),
            },
            versions,
            conversion: spec.conversion.map(|strategy| CustomResourceConversion {
                strategy: match strategy {
                    ConversionStrategy::None => "None".to_owned(),
                    ConversionStrategy::Webhook => "Webhook".to_owned(),
                },
                webhook: None,
            }),
            preserve_unknown_fields: None,
        },
        status: None,
    })
}

/// True once the CRD's `Established` condition is `status: "True"` (spec
/// §4.1 step 9).
pub fn is_established(crd: &CustomResourceDefinition) -> bool {
    crd.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == kcpcore_types::crd::ESTABLISHED_CONDITION && c.status == "True")
        })
}

/// The CRD's currently-stored versions, empty when the apiserver has not
/// reported any yet.
pub fn stored_versions(crd: &CustomResourceDefinition) -> Vec<String> {
    crd.status
        .as_ref()
        .and_then(|s| s.stored_versions.clone())
        .unwrap_or_default()
}
