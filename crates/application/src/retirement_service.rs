use std::sync::Arc;

use chrono::{DateTime, Utc};
use sweeper_core::{AppError, AppResult};
use sweeper_domain::{ExecutionId, PageSequence, ProjectName, RetirementScope, retain_deletable};
use tracing::{debug, error, info, warn};

use crate::deletion_service::{BatchDeletion, BulkDeletionCoordinator};
use crate::retirement_ports::{ExecutionApi, FilterMode, RetirementOptions, ScopeFailurePolicy};

mod projects;
mod scope;
mod summary;

pub use summary::RetirementSummary;

/// Top-level retirement loop over projects, jobs and pages.
///
/// One run is strictly sequential: a single request is in flight at a time
/// and pages of a scope are processed in order.
#[derive(Clone)]
pub struct RetirementService {
    api: Arc<dyn ExecutionApi>,
    deletion: BulkDeletionCoordinator,
    options: RetirementOptions,
    failure_policy: ScopeFailurePolicy,
}

impl RetirementService {
    /// Creates a retirement service using the failure policy of the configured mode.
    #[must_use]
    pub fn new(api: Arc<dyn ExecutionApi>, options: RetirementOptions) -> Self {
        let deletion = BulkDeletionCoordinator::new(api.clone(), options.page_size);
        let failure_policy = options.mode.failure_policy();

        Self {
            api,
            deletion,
            options,
            failure_policy,
        }
    }

    /// Overrides the failure policy derived from the filter mode.
    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: ScopeFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Returns the active failure policy.
    #[must_use]
    pub fn failure_policy(&self) -> ScopeFailurePolicy {
        self.failure_policy
    }
}

#[cfg(test)]
mod tests;
