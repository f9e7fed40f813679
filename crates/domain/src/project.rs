use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sweeper_core::{AppError, AppResult, NonEmptyString};

/// Project name used as the scoping key for execution queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(NonEmptyString);

impl ProjectName {
    /// Creates a validated project name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("project name must not be empty".to_owned()))
    }

    /// Returns the project name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ProjectName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Job identifier, unique across the orchestration server.
///
/// Generated ids are UUIDs, but the server also accepts custom identifiers,
/// so any non-blank value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(NonEmptyString);

impl JobId {
    /// Creates a validated job identifier, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        NonEmptyString::new(value.trim())
            .map(Self)
            .map_err(|_| AppError::Validation("job id must not be empty".to_owned()))
    }

    /// Returns the job identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for JobId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unit over which executions are counted, paginated and deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetirementScope {
    /// Every execution of one project.
    Project(ProjectName),
    /// Executions of a single job inside a project.
    Job {
        /// Owning project, kept for log context.
        project: ProjectName,
        /// Job identifier.
        job_id: JobId,
    },
}

impl RetirementScope {
    /// Returns whether executions are addressed through the job endpoint.
    #[must_use]
    pub fn is_job(&self) -> bool {
        matches!(self, Self::Job { .. })
    }
}

impl Display for RetirementScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project(project) => write!(formatter, "[{project}]"),
            Self::Job { project, job_id } => write!(formatter, "[{project}/{job_id}]"),
        }
    }
}
