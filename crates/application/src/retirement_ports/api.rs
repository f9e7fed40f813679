use async_trait::async_trait;
use sweeper_core::AppResult;
use sweeper_domain::{
    DeletionOutcome, Execution, ExecutionId, JobId, PageRequest, ProjectName, RetentionWindow,
    RetirementScope,
};

/// Port for the orchestration server's execution API.
///
/// Implementations apply their own per-call timeouts and classify failures as
/// transport or protocol errors. Retrying is not part of this contract.
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// Lists every project visible to the configured token.
    async fn list_projects(&self) -> AppResult<Vec<ProjectName>>;

    /// Lists jobs defined in one project.
    async fn list_jobs_by_project(&self, project: &ProjectName) -> AppResult<Vec<JobId>>;

    /// Counts executions in a scope older than the retention window.
    async fn count_executions(
        &self,
        scope: &RetirementScope,
        older_than: RetentionWindow,
    ) -> AppResult<u64>;

    /// Fetches one page of executions in a scope older than the retention window.
    async fn fetch_execution_page(
        &self,
        scope: &RetirementScope,
        older_than: RetentionWindow,
        page: PageRequest,
    ) -> AppResult<Vec<Execution>>;

    /// Deletes executions in one bulk request.
    async fn bulk_delete(&self, ids: &[ExecutionId]) -> AppResult<DeletionOutcome>;
}
