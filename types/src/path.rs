use std::fmt;

/// A colon-separated logical cluster path, e.g. `root:org:ws`.
///
/// Paths are opaque identifiers to everything outside this crate; the only
/// structural fact callers may rely on is that segments are colon-separated
/// and the `system:` prefix marks the small set of cluster paths that are
/// not user workspaces (e.g. `system:system-crds`, `system:bound-crds`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ClusterPath(String);

impl ClusterPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system(&self) -> bool {
        self.0.starts_with("system:")
    }

    /// The cluster in which bound CRDs are materialized. Distinct from any
    /// user-authored cluster so collisions on (group, resource) can never
    /// reach real apiserver storage.
    pub fn system_bound_crds() -> Self {
        Self::new("system:bound-crds")
    }

    /// The cluster from which reserved API groups may legitimately
    /// originate.
    pub fn system_crds() -> Self {
        Self::new("system:system-crds")
    }

    /// The cluster that owns the published identity-cache blob, readable by
    /// every shard.
    pub fn system_identity_cache() -> Self {
        Self::new("system:identity-cache")
    }
}

impl fmt::Display for ClusterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClusterPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClusterPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
