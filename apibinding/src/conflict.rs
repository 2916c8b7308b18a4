use k8s_openapi::chrono::{DateTime, Utc};
use kcpcore_types::{APIBinding, APIBindingPhase, ExpirableLock, ResourceBindingsAnnotation};

/// Evaluates the lock-map half of spec §4.1 step 5. Returns the name of the
/// conflicting holder when the slot cannot be claimed, `None` when it's
/// free or reclaimable. `existing_crd_in_consumer` answers whether a native
/// CRD for this (group, resource) still exists in the consumer cluster —
/// required to tell an expired-and-reclaimable claim apart from an
/// expired-but-still-materialized one.
pub fn lock_map_conflict(
    lock_map: &ResourceBindingsAnnotation,
    key: &str,
    claimant: &str,
    now: DateTime<Utc>,
    existing_crd_in_consumer: bool,
) -> Option<String> {
    let lock = lock_map.get(key)?;

    if let Some(owner) = lock.binding_name() {
        if owner != claimant {
            return Some(owner.to_owned());
        }
        return None;
    }

    // CRD-owned.
    if !lock.is_expired(now) {
        return Some("<native CRD>".to_owned());
    }
    if existing_crd_in_consumer {
        return Some("<native CRD>".to_owned());
    }
    // Expired and no longer materialized: reclaimable, not a conflict.
    None
}

/// Writes `claimant`'s name into the lock for `key`, overwriting a
/// reclaimable CRD-owned claim if present (spec §4.1 step 5, last
/// paragraph).
pub fn claim_lock(lock_map: &mut ResourceBindingsAnnotation, key: &str, claimant: &str) {
    lock_map.insert(key.to_owned(), ExpirableLock::owned_by_binding(claimant));
}

/// Evaluates spec §4.1 step 6: a peer APIBinding already Bound to the same
/// (group, resource) via a different schema UID conflicts. Bindings to the
/// same schema UID (re-reconciling itself, or a second binding to the exact
/// same export resource) are not conflicts.
pub fn peer_binding_conflict<'a>(
    peers: impl IntoIterator<Item = &'a APIBinding>,
    self_name: &str,
    group: &str,
    resource: &str,
    schema_uid: &str,
) -> Option<String> {
    for peer in peers {
        let Some(name) = peer.metadata.name.as_deref() else {
            continue;
        };
        if name == self_name {
            continue;
        }
        let Some(status) = peer.status.as_ref().filter(|s| s.phase == Some(APIBindingPhase::Bound)) else {
            continue;
        };
        if let Some(bound) = status.bound_resource(group, resource) {
            if bound.schema.uid != schema_uid {
                return Some(name.to_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::chrono::TimeZone;
    use kcpcore_types::lock_key;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn free_slot_has_no_conflict() {
        let map = ResourceBindingsAnnotation::new();
        assert_eq!(lock_map_conflict(&map, "widgets.kcp.io", "me", now(), false), None);
    }

    #[test]
    fn owned_by_self_has_no_conflict() {
        let mut map = ResourceBindingsAnnotation::new();
        map.insert(lock_key("kcp.io", "widgets"), ExpirableLock::owned_by_binding("me"));
        assert_eq!(lock_map_conflict(&map, &lock_key("kcp.io", "widgets"), "me", now(), false), None);
    }

    #[test]
    fn owned_by_other_binding_conflicts() {
        let mut map = ResourceBindingsAnnotation::new();
        map.insert(lock_key("kcp.io", "widgets"), ExpirableLock::owned_by_binding("other"));
        assert_eq!(
            lock_map_conflict(&map, &lock_key("kcp.io", "widgets"), "me", now(), false),
            Some("other".to_owned())
        );
    }

    #[test]
    fn crd_owned_with_no_expiry_conflicts() {
        let mut map = ResourceBindingsAnnotation::new();
        map.insert(lock_key("kcp.io", "widgets"), ExpirableLock::owned_by_crd(None));
        assert!(lock_map_conflict(&map, &lock_key("kcp.io", "widgets"), "me", now(), false).is_some());
    }

    #[test]
    fn crd_owned_expired_with_no_live_crd_is_reclaimable() {
        let past = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut map = ResourceBindingsAnnotation::new();
        map.insert(lock_key("kcp.io", "widgets"), ExpirableLock::owned_by_crd(Some(past)));
        assert_eq!(lock_map_conflict(&map, &lock_key("kcp.io", "widgets"), "me", now(), false), None);
    }

    #[test]
    fn crd_owned_expired_but_crd_still_exists_conflicts() {
        let past = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut map = ResourceBindingsAnnotation::new();
        map.insert(lock_key("kcp.io", "widgets"), ExpirableLock::owned_by_crd(Some(past)));
        assert!(lock_map_conflict(&map, &lock_key("kcp.io", "widgets"), "me", now(), true).is_some());
    }
}
