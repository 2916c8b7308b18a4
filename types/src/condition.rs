use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type names used by the APIBinding reconciler.
pub mod types {
    pub const READY: &str = "Ready";
    pub const API_EXPORT_VALID: &str = "APIExportValid";
    pub const INITIAL_BINDING_COMPLETED: &str = "InitialBindingCompleted";
}

/// Condition reasons. Upstream kcp maps both naming conflicts between peer
/// bindings and CRD-vs-binding conflicts to `NamingConflicts`; we preserve
/// that and leave disambiguation to the message text (see spec Open
/// Question on `resourceConflict` vs `namingConflict`).
pub mod reasons {
    pub const INVALID_REFERENCE: &str = "InvalidReference";
    pub const NOT_FOUND: &str = "NotFound";
    pub const INTERNAL_ERROR: &str = "InternalError";
    pub const WAITING_FOR_ESTABLISHED: &str = "WaitingForEstablished";
    pub const API_RESOURCE_SCHEMA_INVALID: &str = "APIResourceSchemaInvalid";
    pub const LOGICAL_CLUSTER_NOT_FOUND: &str = "LogicalClusterNotFound";
    pub const NAMING_CONFLICTS: &str = "NamingConflicts";
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single status condition, matching the wire shape from spec §6:
/// `{ type, status, severity, reason, message, lastTransitionTime }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub severity: Severity,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "lastTransitionTime", skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

impl Condition {
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// A thin wrapper around `Vec<Condition>` providing the "set operation that
/// preserves `LastTransitionTime` when the `Status` is unchanged" called for
/// in the design notes.
#[derive(Default)]
pub struct ConditionSet<'a>(pub &'a mut Vec<Condition>);

impl<'a> ConditionSet<'a> {
    pub fn new(conditions: &'a mut Vec<Condition>) -> Self {
        Self(conditions)
    }

    pub fn get(&self, type_: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.type_ == type_)
    }

    /// Insert or update the named condition. `last_transition_time` is
    /// preserved from the previous value of this condition unless the
    /// status changed, in which case it is set to `now`.
    pub fn set(
        &mut self,
        type_: &str,
        status: ConditionStatus,
        severity: Severity,
        reason: &str,
        message: &str,
        now: Time,
    ) {
        if let Some(existing) = self.0.iter_mut().find(|c| c.type_ == type_) {
            let transitioned = existing.status != status;
            existing.status = status;
            existing.severity = severity;
            existing.reason = reason.to_owned();
            existing.message = message.to_owned();
            if transitioned || existing.last_transition_time.is_none() {
                existing.last_transition_time = Some(now);
            }
        } else {
            self.0.push(Condition {
                type_: type_.to_owned(),
                status,
                severity,
                reason: reason.to_owned(),
                message: message.to_owned(),
                last_transition_time: Some(now),
            });
        }
    }

    pub fn set_true(&mut self, type_: &str, now: Time) {
        self.set(type_, ConditionStatus::True, Severity::Info, "", "", now);
    }

    pub fn set_false(&mut self, type_: &str, severity: Severity, reason: &str, message: &str, now: Time) {
        self.set(type_, ConditionStatus::False, severity, reason, message, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::chrono::{TimeZone, Utc};

    fn ts(secs: i64) -> Time {
        Time(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn preserves_transition_time_when_status_unchanged() {
        let mut conditions = Vec::new();
        {
            let mut set = ConditionSet::new(&mut conditions);
            set.set_false(types::READY, Severity::Error, "X", "first", ts(100));
        }
        {
            let mut set = ConditionSet::new(&mut conditions);
            set.set_false(types::READY, Severity::Error, "X", "second message", ts(200));
        }
        let c = conditions.iter().find(|c| c.type_ == types::READY).unwrap();
        assert_eq!(c.message, "second message");
        assert_eq!(c.last_transition_time, Some(ts(100)));
    }

    #[test]
    fn updates_transition_time_when_status_changes() {
        let mut conditions = Vec::new();
        {
            let mut set = ConditionSet::new(&mut conditions);
            set.set_false(types::READY, Severity::Error, "X", "not ready", ts(100));
        }
        {
            let mut set = ConditionSet::new(&mut conditions);
            set.set_true(types::READY, ts(200));
        }
        let c = conditions.iter().find(|c| c.type_ == types::READY).unwrap();
        assert!(c.is_true());
        assert_eq!(c.last_transition_time, Some(ts(200)));
    }
}
