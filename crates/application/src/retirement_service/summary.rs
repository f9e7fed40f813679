use super::*;

/// Counters collected over one retirement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetirementSummary {
    /// Run start timestamp.
    pub started_at: DateTime<Utc>,
    /// Run finish timestamp when the run completed.
    pub finished_at: Option<DateTime<Utc>>,
    /// Projects selected for processing.
    pub projects_processed: u64,
    /// Project or job scopes that were started.
    pub scopes_processed: u64,
    /// Scopes left before their last page.
    pub scopes_abandoned: u64,
    /// Pages fetched successfully.
    pub pages_fetched: u64,
    /// Executions the server reported as deleted.
    pub executions_deleted: u64,
    /// Executions the server reported as not deleted.
    pub executions_not_deleted: u64,
    /// Bulk-delete requests that failed before an outcome was reported.
    pub failed_delete_requests: u64,
}

impl RetirementSummary {
    /// Creates an empty summary for a run starting at `started_at`.
    #[must_use]
    pub fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            projects_processed: 0,
            scopes_processed: 0,
            scopes_abandoned: 0,
            pages_fetched: 0,
            executions_deleted: 0,
            executions_not_deleted: 0,
            failed_delete_requests: 0,
        }
    }

    /// Returns wall-clock run time once the run has finished.
    #[must_use]
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.finished_at
            .and_then(|finished_at| (finished_at - self.started_at).to_std().ok())
    }

    pub(super) fn record_deletion(&mut self, deletion: &BatchDeletion) {
        self.executions_deleted = self.executions_deleted.saturating_add(deletion.deleted());
        self.executions_not_deleted = self.executions_not_deleted.saturating_add(deletion.failed());
        if matches!(deletion, BatchDeletion::RequestFailed { .. }) {
            self.failed_delete_requests = self.failed_delete_requests.saturating_add(1);
        }
    }

    pub(super) fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
    }
}
