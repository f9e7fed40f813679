/// One execution the server refused to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// Execution identifier as reported by the server.
    pub id: String,
    /// Server-provided reason.
    pub message: String,
}

/// Server report for one bulk-delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    /// Number of executions submitted.
    pub requested: u64,
    /// Number of executions deleted.
    pub succeeded: u64,
    /// Number of executions left in place.
    pub failed: u64,
    /// Server flag set when every requested execution was deleted.
    pub all_successful: bool,
    /// Per-execution failure details, when provided.
    pub failures: Vec<DeletionFailure>,
}

impl DeletionOutcome {
    /// Builds an outcome where every requested execution was deleted.
    #[must_use]
    pub fn all_deleted(requested: u64) -> Self {
        Self {
            requested,
            succeeded: requested,
            failed: 0,
            all_successful: true,
            failures: Vec::new(),
        }
    }
}
