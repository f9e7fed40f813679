use std::num::NonZeroU32;

use sweeper_domain::{JobId, ProjectName, RetentionWindow};

/// Granularity at which executions are retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// One scope per project.
    ByProject,
    /// One scope per job inside each project.
    ByJob,
}

impl FilterMode {
    /// Returns the failure policy each mode runs with by default.
    #[must_use]
    pub fn failure_policy(&self) -> ScopeFailurePolicy {
        match self {
            Self::ByProject => ScopeFailurePolicy::AbortRun,
            Self::ByJob => ScopeFailurePolicy::AbandonScope,
        }
    }

    /// Returns stable display value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByProject => "by_project",
            Self::ByJob => "by_job",
        }
    }
}

/// What happens when a scope cannot be processed to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFailurePolicy {
    /// Count, fetch or listing failures abort the whole run. Failed deletions
    /// are logged and the next page is processed. Empty pages are no-ops.
    AbortRun,
    /// Count, fetch or listing failures abandon the current scope only. An
    /// empty page or a failed deletion ends the scope early.
    AbandonScope,
}

/// Retirement parameters derived from validated configuration.
#[derive(Debug, Clone)]
pub struct RetirementOptions {
    /// Scope granularity.
    pub mode: FilterMode,
    /// Executions older than this window are deletion candidates.
    pub retention: RetentionWindow,
    /// Page size, also the upper bound of one bulk-delete request.
    pub page_size: NonZeroU32,
    /// Whether in-flight executions are skipped.
    pub exclude_running: bool,
    /// Restricts the run to one project.
    pub filtered_project: Option<ProjectName>,
    /// Restricts a by-job run to one job.
    pub filtered_job: Option<JobId>,
}
