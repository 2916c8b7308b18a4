use kcpcore_types::ClusterPath;

use crate::reserved_groups::is_reserved;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("group {group} is reserved; rejecting request from cluster {cluster}")]
pub struct Forbidden {
    pub group: String,
    pub cluster: String,
}

/// Synchronous validating gate on CRD create/update (spec §4.2). Runs
/// before any cluster-binding logic so a non-system cluster can never
/// register a reserved-group CRD. `old_group` is `None` on create; on
/// update, a group identical to the prior value is always accepted — CRD
/// groups are immutable in practice, and a still-reserved group that was
/// already established is out of scope for this gate, not a fresh
/// violation (spec §8 seed scenario 6).
pub fn validate(cluster: &ClusterPath, group: &str, old_group: Option<&str>) -> Result<(), Forbidden> {
    if old_group.is_some_and(|old| old == group) {
        return Ok(());
    }
    if !is_reserved(group) {
        return Ok(());
    }
    if *cluster == ClusterPath::system_crds() {
        return Ok(());
    }
    Err(Forbidden {
        group: group.to_owned(),
        cluster: cluster.to_string(),
    })
}
