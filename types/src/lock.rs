use std::collections::BTreeMap;

use k8s_openapi::chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Annotation key under which the `ResourceBindingsAnnotation` (the lock
/// map, JSON-encoded) is carried on a `LogicalCluster`.
pub const RESOURCE_BINDINGS_ANNOTATION: &str = "apis.kcpcore.io/bound-resources";

/// Which kind of owner holds an `ExpirableLock`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum LockOwner {
    Binding {
        #[serde(rename = "Name")]
        name: String,
    },
    Crd {
        #[serde(rename = "CRD")]
        crd: bool,
    },
}

/// A single entry of the resource-bindings lock map: either a binding
/// claims the `<resource>.<group>` slot, or a native CRD does (optionally
/// with an expiry after which the claim may be reclaimed).
///
/// Wire shape (spec §6):
/// `{ "Lock": { "Name": "<binding-name>" } }` or
/// `{ "Lock": { "CRD": true }, "CRDExpiry": "<RFC3339 timestamp>" }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExpirableLock {
    #[serde(rename = "Lock")]
    pub lock: LockOwner,
    #[serde(rename = "CRDExpiry", skip_serializing_if = "Option::is_none", default)]
    pub crd_expiry: Option<DateTime<Utc>>,
}

impl ExpirableLock {
    pub fn owned_by_binding(name: impl Into<String>) -> Self {
        Self {
            lock: LockOwner::Binding { name: name.into() },
            crd_expiry: None,
        }
    }

    pub fn owned_by_crd(expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            lock: LockOwner::Crd { crd: true },
            crd_expiry: expiry,
        }
    }

    pub fn binding_name(&self) -> Option<&str> {
        match &self.lock {
            LockOwner::Binding { name } => Some(name),
            LockOwner::Crd { .. } => None,
        }
    }

    pub fn is_crd_owned(&self) -> bool {
        matches!(self.lock, LockOwner::Crd { .. })
    }

    /// True when this is a CRD-owned claim with an expiry that has already
    /// passed. An expired, no-longer-materialized claim is reclaimable; a
    /// non-expired or still-materialized one is not (see spec §4.1 step 5).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.is_crd_owned() && self.crd_expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// `<resource>.<group>` -> lock, deserialized from the JSON blob carried in
/// [`RESOURCE_BINDINGS_ANNOTATION`]. An object with no annotation has no
/// claims (spec §4.1 step 4).
pub type ResourceBindingsAnnotation = BTreeMap<String, ExpirableLock>;

pub fn lock_key(group: &str, resource: &str) -> String {
    format!("{resource}.{group}")
}

pub fn parse_lock_map(annotation_value: Option<&str>) -> Result<ResourceBindingsAnnotation, serde_json::Error> {
    match annotation_value {
        None => Ok(ResourceBindingsAnnotation::new()),
        Some(raw) if raw.is_empty() => Ok(ResourceBindingsAnnotation::new()),
        Some(raw) => serde_json::from_str(raw),
    }
}

pub fn serialize_lock_map(map: &ResourceBindingsAnnotation) -> Result<String, serde_json::Error> {
    serde_json::to_string(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_binding_owned_lock() {
        let lock = ExpirableLock::owned_by_binding("my-binding");
        let json = serde_json::to_string(&lock).unwrap();
        assert_eq!(json, r#"{"Lock":{"Name":"my-binding"}}"#);
        let back: ExpirableLock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lock);
    }

    #[test]
    fn round_trips_crd_owned_lock_with_expiry() {
        let expiry = DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let lock = ExpirableLock::owned_by_crd(Some(expiry));
        let json = serde_json::to_string(&lock).unwrap();
        let back: ExpirableLock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lock);
        assert!(json.contains("CRDExpiry"));
    }

    #[test]
    fn missing_annotation_means_no_claims() {
        let map = parse_lock_map(None).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn expiry_in_the_past_is_expired() {
        let past = DateTime::parse_from_rfc3339("2000-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let lock = ExpirableLock::owned_by_crd(Some(past));
        assert!(lock.is_expired(Utc::now()));
    }

    #[test]
    fn no_expiry_never_expires() {
        let lock = ExpirableLock::owned_by_crd(None);
        assert!(!lock.is_expired(Utc::now()));
    }
}
