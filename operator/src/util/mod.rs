use std::time::Duration;

pub mod patch;

/// The default interval for requeuing a bound CRD that is not yet
/// established (spec §4.1 step 9).
pub(crate) const PROBE_INTERVAL: Duration = Duration::from_secs(30);
