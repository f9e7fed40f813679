use std::num::NonZeroU32;
use std::sync::Arc;

use sweeper_core::AppError;
use sweeper_domain::{DeletionOutcome, ExecutionId};
use tracing::{info, warn};

use crate::retirement_ports::ExecutionApi;

/// Result of submitting one page of execution ids for deletion.
#[derive(Debug)]
pub enum BatchDeletion {
    /// Nothing to delete; no request was sent.
    Empty,
    /// Every requested execution was deleted.
    Completed(DeletionOutcome),
    /// The server processed the request but left some executions in place.
    Partial(DeletionOutcome),
    /// A request failed before the server reported an outcome.
    RequestFailed {
        /// Error of the failed request.
        error: AppError,
        /// Merged outcome of the chunks accepted before the failure.
        completed: Option<DeletionOutcome>,
    },
}

impl BatchDeletion {
    /// Returns whether the batch was fully deleted or empty.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Empty | Self::Completed(_))
    }

    /// Number of executions the server reported as deleted.
    #[must_use]
    pub fn deleted(&self) -> u64 {
        match self {
            Self::Completed(outcome) | Self::Partial(outcome) => outcome.succeeded,
            Self::RequestFailed { completed, .. } => {
                completed.as_ref().map_or(0, |outcome| outcome.succeeded)
            }
            Self::Empty => 0,
        }
    }

    /// Number of executions the server reported as not deleted.
    #[must_use]
    pub fn failed(&self) -> u64 {
        match self {
            Self::Partial(outcome) => outcome.failed,
            Self::RequestFailed { completed, .. } => {
                completed.as_ref().map_or(0, |outcome| outcome.failed)
            }
            Self::Empty | Self::Completed(_) => 0,
        }
    }
}

/// Submits execution ids to the bulk-delete endpoint in bounded chunks.
#[derive(Clone)]
pub struct BulkDeletionCoordinator {
    api: Arc<dyn ExecutionApi>,
    chunk_size: NonZeroU32,
}

impl BulkDeletionCoordinator {
    /// Creates a coordinator issuing requests of at most `chunk_size` ids.
    #[must_use]
    pub fn new(api: Arc<dyn ExecutionApi>, chunk_size: NonZeroU32) -> Self {
        Self { api, chunk_size }
    }

    /// Deletes `ids` and interprets the server outcome.
    ///
    /// A page that already fits the chunk bound is sent as one request. When a
    /// request fails outright the remaining chunks are not submitted.
    pub async fn delete(&self, ids: &[ExecutionId]) -> BatchDeletion {
        if ids.is_empty() {
            return BatchDeletion::Empty;
        }

        let chunk_size = usize::try_from(self.chunk_size.get()).unwrap_or(usize::MAX);
        let mut merged: Option<DeletionOutcome> = None;

        for chunk in ids.chunks(chunk_size) {
            let outcome = match self.api.bulk_delete(chunk).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(
                        requested = chunk.len(),
                        already_deleted = merged.as_ref().map_or(0, |outcome| outcome.succeeded),
                        error = %error,
                        "bulk delete request failed"
                    );
                    return BatchDeletion::RequestFailed {
                        error,
                        completed: merged,
                    };
                }
            };

            merged = Some(match merged {
                Some(previous) => merge_outcomes(previous, outcome),
                None => outcome,
            });
        }

        let Some(outcome) = merged else {
            return BatchDeletion::Empty;
        };

        if outcome.all_successful {
            info!(
                deleted = outcome.succeeded,
                "all requested executions were successfully deleted"
            );
            BatchDeletion::Completed(outcome)
        } else {
            warn!(
                failed = outcome.failed,
                requested = outcome.requested,
                "errors on deleting requested executions"
            );
            for failure in &outcome.failures {
                warn!(
                    execution_id = %failure.id,
                    reason = %failure.message,
                    "execution was not deleted"
                );
            }
            BatchDeletion::Partial(outcome)
        }
    }
}

fn merge_outcomes(mut left: DeletionOutcome, right: DeletionOutcome) -> DeletionOutcome {
    left.requested = left.requested.saturating_add(right.requested);
    left.succeeded = left.succeeded.saturating_add(right.succeeded);
    left.failed = left.failed.saturating_add(right.failed);
    left.all_successful = left.all_successful && right.all_successful;
    left.failures.extend(right.failures);
    left
}
