/// API groups (and everything beneath them) that only the designated
/// system CRD cluster may introduce (spec §4.2, §6). Bit-exact with the
/// upstream control plane's reserved set.
pub const PROTECTED_ROOTS: &[&str] = &[
    "apis.kcp.io",
    "core.kcp.io",
    "tenancy.kcp.io",
    "scheduling.kcp.io",
    "workload.kcp.io",
    "topology.kcp.io",
];

/// `group` is protected when it equals a protected root or is a proper
/// sub-domain of one, matched per DNS label from the right (spec §4.2):
/// `foo.apis.kcp.io` is protected, `apis.kcp.io` is protected,
/// `apis.kcp.io.evil.com` is not.
pub fn is_reserved(group: &str) -> bool {
    PROTECTED_ROOTS.iter().any(|root| is_subdomain_or_equal(group, root))
}

fn is_subdomain_or_equal(group: &str, root: &str) -> bool {
    if group == root {
        return true;
    }
    group
        .strip_suffix(root)
        .map(|prefix| prefix.ends_with('.'))
        .unwrap_or(false)
}
