use serde::{Deserialize, Serialize};

/// Server-assigned execution identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(u64);

impl ExecutionId {
    /// Creates an execution identifier.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Lifecycle status reported for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Execution is still in flight.
    Running,
    /// Execution finished successfully.
    Succeeded,
    /// Execution finished with a failure.
    Failed,
    /// Execution was aborted by an operator.
    Aborted,
    /// Execution exceeded its time limit.
    TimedOut,
    /// Execution failed and a retry was scheduled.
    FailedWithRetry,
    /// Execution is scheduled but has not started.
    Scheduled,
    /// Custom or unknown status value.
    Other,
}

impl ExecutionStatus {
    /// Maps a server value. Unknown values become [`ExecutionStatus::Other`].
    #[must_use]
    pub fn from_server_value(value: &str) -> Self {
        match value {
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "aborted" => Self::Aborted,
            "timedout" => Self::TimedOut,
            "failed-with-retry" => Self::FailedWithRetry,
            "scheduled" => Self::Scheduled,
            _ => Self::Other,
        }
    }

    /// Returns whether the execution is still in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Execution record as far as retirement is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Reported status.
    pub status: ExecutionStatus,
}

impl Execution {
    /// Creates an execution record.
    #[must_use]
    pub fn new(id: ExecutionId, status: ExecutionStatus) -> Self {
        Self { id, status }
    }
}

/// Drops in-flight executions from a fetched batch.
///
/// Order and every non-running element are preserved. With `exclude_running`
/// disabled the batch is returned untouched.
#[must_use]
pub fn retain_deletable(executions: Vec<Execution>, exclude_running: bool) -> Vec<Execution> {
    if !exclude_running {
        return executions;
    }

    executions
        .into_iter()
        .filter(|execution| !execution.status.is_running())
        .collect()
}
