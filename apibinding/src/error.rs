/// The five-category error taxonomy from the reconciler's failure-semantics
/// table: each variant carries its own requeue/condition policy rather than
/// leaving that decision to call sites.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// User should fix: invalid export reference, invalid schema. Recorded
    /// as a False condition with Error severity; never retried.
    #[error("user input: {0}")]
    UserInput(String),

    /// A resolvable absence: export/schema not yet created. False
    /// condition; re-enqueue happens via watch, no explicit retry.
    #[error("not found: {0}")]
    NotFound(String),

    /// Another binding (or a native CRD) already owns the slot. Sets a
    /// False condition and asks the caller to requeue with backoff.
    #[error("conflict: {resource} in {cluster} is owned by {holder}")]
    Conflict {
        cluster: String,
        resource: String,
        holder: String,
    },

    /// Network failure, update contention. No condition change; return the
    /// error so the caller backs off.
    #[error(transparent)]
    Transient(#[from] kcpcore_store::StoreError),

    /// A code invariant was violated. False condition with InternalError
    /// reason; return the error for backoff.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReconcileError {
    /// Whether this error class asks the controller to return an error (and
    /// thus backoff) to its caller, versus being fully absorbed into a
    /// condition with no error propagated (spec §7: UserInput/NotFound are
    /// condition-only, the rest return an error).
    pub fn should_return_error(&self) -> bool {
        !matches!(self, ReconcileError::UserInput(_) | ReconcileError::NotFound(_))
    }

    pub fn condition_reason(&self) -> &'static str {
        match self {
            ReconcileError::UserInput(_) => kcpcore_types::condition::reasons::INVALID_REFERENCE,
            ReconcileError::NotFound(_) => kcpcore_types::condition::reasons::NOT_FOUND,
            ReconcileError::Conflict { .. } => kcpcore_types::condition::reasons::NAMING_CONFLICTS,
            ReconcileError::Transient(_) => kcpcore_types::condition::reasons::INTERNAL_ERROR,
            ReconcileError::Internal(_) => kcpcore_types::condition::reasons::INTERNAL_ERROR,
        }
    }
}
