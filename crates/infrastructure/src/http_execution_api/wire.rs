use serde::Deserialize;
use serde_json::Value;
use sweeper_core::{AppError, AppResult};
use sweeper_domain::{
    DeletionFailure, DeletionOutcome, Execution, ExecutionId, ExecutionStatus, JobId, ProjectName,
};

#[derive(Debug, Deserialize)]
pub(super) struct ProjectResponse {
    name: String,
}

impl ProjectResponse {
    pub(super) fn into_project_name(self) -> AppResult<ProjectName> {
        ProjectName::new(self.name).map_err(|error| {
            AppError::Protocol(format!("project listing returned an invalid name: {error}"))
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct JobResponse {
    id: String,
}

impl JobResponse {
    pub(super) fn into_job_id(self) -> AppResult<JobId> {
        JobId::new(self.id).map_err(|error| {
            AppError::Protocol(format!("job listing returned an invalid id: {error}"))
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PagingResponse {
    pub(super) total: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExecutionCountResponse {
    pub(super) paging: PagingResponse,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExecutionResponse {
    id: u64,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExecutionListResponse {
    executions: Vec<ExecutionResponse>,
}

impl ExecutionListResponse {
    pub(super) fn into_executions(self) -> Vec<Execution> {
        self.executions
            .into_iter()
            .map(|execution| {
                let status = execution
                    .status
                    .as_deref()
                    .map_or(ExecutionStatus::Other, ExecutionStatus::from_server_value);
                Execution::new(ExecutionId::new(execution.id), status)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkDeleteFailureResponse {
    id: Value,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BulkDeleteResponse {
    request_count: u64,
    #[serde(rename = "allsuccessful")]
    all_successful: bool,
    #[serde(default)]
    success_count: u64,
    #[serde(default)]
    failed_count: u64,
    #[serde(default)]
    failures: Vec<BulkDeleteFailureResponse>,
}

impl BulkDeleteResponse {
    pub(super) fn into_outcome(self) -> DeletionOutcome {
        DeletionOutcome {
            requested: self.request_count,
            succeeded: self.success_count,
            failed: self.failed_count,
            all_successful: self.all_successful,
            failures: self
                .failures
                .into_iter()
                .map(|failure| DeletionFailure {
                    id: match failure.id {
                        Value::String(id) => id,
                        other => other.to_string(),
                    },
                    message: failure.message,
                })
                .collect(),
        }
    }
}
