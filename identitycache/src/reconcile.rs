use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;

/// Name of the published blob (spec §4.3). The namespace it lives in is the
/// logical-cluster-to-namespace mapping `kcpcore-store` already applies to
/// [`kcpcore_types::ClusterPath::system_identity_cache`].
pub const IDENTITY_CACHE_BLOB_NAME: &str = "identity-cache";

/// The subset of an `APIExport` this reconciler cares about: its name and,
/// if the producer has published one yet, its identity hash (spec §4.1
/// step 2 — exports without a hash are simply omitted from the blob, not an
/// error here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiExportSummary {
    pub name: String,
    pub identity_hash: Option<String>,
}

/// The desired mapping `exportName -> identityHash`, exactly the shape
/// spec.md describes the blob's data as.
pub type IdentityCacheBlob = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityCacheAction {
    Noop,
    Create(ConfigMap),
    Update(ConfigMap),
}

/// Builds the desired blob from the current export list: exports without a
/// hash are omitted (spec §4.3 step 2).
pub fn desired_blob(exports: &[ApiExportSummary]) -> IdentityCacheBlob {
    exports
        .iter()
        .filter_map(|e| e.identity_hash.clone().map(|hash| (e.name.clone(), hash)))
        .collect()
}

/// One-shot, idempotent reconciliation of the identity cache (spec §4.3):
/// builds the desired blob, compares it against the current object's data
/// (ignoring server-stamped metadata such as `resourceVersion`), and decides
/// the single mutating call — if any — the caller should make. Never makes
/// the call itself; that's the caller's job, mirroring the store-free
/// `reconcile()` entry point in `kcpcore-apibinding`.
pub fn reconcile(exports: &[ApiExportSummary], current: Option<&ConfigMap>) -> IdentityCacheAction {
    let desired = desired_blob(exports);

    match current {
        None => IdentityCacheAction::Create(ConfigMap {
            metadata: ObjectMeta {
                name: Some(IDENTITY_CACHE_BLOB_NAME.to_owned()),
                ..Default::default()
            },
            data: Some(desired),
            ..Default::default()
        }),
        Some(existing) => {
            let existing_data = existing.data.clone().unwrap_or_default();
            if existing_data == desired {
                IdentityCacheAction::Noop
            } else {
                let mut updated = existing.clone();
                updated.data = Some(desired);
                IdentityCacheAction::Update(updated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(name: &str, hash: Option<&str>) -> ApiExportSummary {
        ApiExportSummary {
            name: name.to_owned(),
            identity_hash: hash.map(str::to_owned),
        }
    }

    fn configmap(data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(IDENTITY_CACHE_BLOB_NAME.to_owned()),
                resource_version: Some("42".to_owned()),
                ..Default::default()
            },
            data: Some(data.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn exports_without_hash_are_omitted() {
        let exports = vec![export("with-hash", Some("h1")), export("no-hash-yet", None)];
        let blob = desired_blob(&exports);
        assert_eq!(blob.len(), 1);
        assert_eq!(blob.get("with-hash"), Some(&"h1".to_owned()));
    }

    #[test]
    fn absent_blob_creates() {
        let exports = vec![export("some-export", Some("hash1"))];
        match reconcile(&exports, None) {
            IdentityCacheAction::Create(cm) => {
                assert_eq!(cm.metadata.name.as_deref(), Some(IDENTITY_CACHE_BLOB_NAME));
                assert_eq!(cm.data.unwrap().get("some-export"), Some(&"hash1".to_owned()));
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn semantically_equal_blob_is_noop() {
        let exports = vec![export("some-export", Some("hash1"))];
        let current = configmap(&[("some-export", "hash1")]);
        assert_eq!(reconcile(&exports, Some(&current)), IdentityCacheAction::Noop);
    }

    #[test]
    fn changed_hash_updates_and_preserves_resource_version() {
        let exports = vec![export("some-export", Some("hash2"))];
        let current = configmap(&[("some-export", "hash1")]);
        match reconcile(&exports, Some(&current)) {
            IdentityCacheAction::Update(cm) => {
                assert_eq!(cm.metadata.resource_version.as_deref(), Some("42"));
                assert_eq!(cm.data.unwrap().get("some-export"), Some(&"hash2".to_owned()));
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn removed_export_updates_blob_to_drop_its_entry() {
        let exports = vec![export("still-here", Some("hashA"))];
        let current = configmap(&[("still-here", "hashA"), ("gone-now", "hashB")]);
        match reconcile(&exports, Some(&current)) {
            IdentityCacheAction::Update(cm) => {
                let data = cm.data.unwrap();
                assert_eq!(data.len(), 1);
                assert!(!data.contains_key("gone-now"));
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn converges_after_one_update_regardless_of_starting_state() {
        let exports = vec![export("a", Some("1")), export("b", Some("2"))];
        let mut current: Option<ConfigMap> = None;
        for _ in 0..3 {
            current = match reconcile(&exports, current.as_ref()) {
                IdentityCacheAction::Noop => current,
                IdentityCacheAction::Create(cm) | IdentityCacheAction::Update(cm) => Some(cm),
            };
        }
        assert_eq!(reconcile(&exports, current.as_ref()), IdentityCacheAction::Noop);
    }
}
