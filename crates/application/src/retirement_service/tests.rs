use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use sweeper_core::{AppError, AppResult};
use sweeper_domain::{
    DeletionOutcome, Execution, ExecutionId, ExecutionStatus, JobId, PageRequest, ProjectName,
    RetentionWindow, RetirementScope,
};

use crate::retirement_ports::{ExecutionApi, FilterMode, RetirementOptions, ScopeFailurePolicy};

use super::RetirementService;

#[derive(Default)]
struct FakeExecutionApi {
    projects: Mutex<Option<Vec<ProjectName>>>,
    jobs: Mutex<HashMap<String, Vec<JobId>>>,
    failing_job_listings: Mutex<HashSet<String>>,
    counts: Mutex<HashMap<String, u64>>,
    failing_counts: Mutex<HashSet<String>>,
    pages: Mutex<HashMap<String, VecDeque<Vec<Execution>>>>,
    failing_fetches: Mutex<HashSet<(String, u64)>>,
    delete_results: Mutex<VecDeque<AppResult<DeletionOutcome>>>,
    calls: Mutex<Vec<String>>,
    deleted: Mutex<Vec<Vec<ExecutionId>>>,
}

impl FakeExecutionApi {
    fn with_projects(names: &[&str]) -> Self {
        let projects = names.iter().map(|name| project(name)).collect();
        Self {
            projects: Mutex::new(Some(projects)),
            ..Self::default()
        }
    }

    async fn set_count(&self, scope: &str, total: u64) {
        self.counts.lock().await.insert(scope.to_owned(), total);
    }

    async fn push_page(&self, scope: &str, executions: Vec<Execution>) {
        self.pages
            .lock()
            .await
            .entry(scope.to_owned())
            .or_default()
            .push_back(executions);
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn fetch_calls(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter(|call| call.starts_with("fetch"))
            .collect()
    }
}

#[async_trait]
impl ExecutionApi for FakeExecutionApi {
    async fn list_projects(&self) -> AppResult<Vec<ProjectName>> {
        self.calls.lock().await.push("projects".to_owned());
        self.projects
            .lock()
            .await
            .clone()
            .ok_or_else(|| AppError::Transport("connection refused".to_owned()))
    }

    async fn list_jobs_by_project(&self, project: &ProjectName) -> AppResult<Vec<JobId>> {
        self.calls.lock().await.push(format!("jobs:{project}"));
        if self.failing_job_listings.lock().await.contains(project.as_str()) {
            return Err(AppError::Protocol("unexpected body".to_owned()));
        }

        Ok(self
            .jobs
            .lock()
            .await
            .get(project.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn count_executions(
        &self,
        scope: &RetirementScope,
        _older_than: RetentionWindow,
    ) -> AppResult<u64> {
        let key = scope.to_string();
        self.calls.lock().await.push(format!("count:{key}"));
        if self.failing_counts.lock().await.contains(&key) {
            return Err(AppError::Transport("timed out".to_owned()));
        }

        Ok(self.counts.lock().await.get(&key).copied().unwrap_or(0))
    }

    async fn fetch_execution_page(
        &self,
        scope: &RetirementScope,
        _older_than: RetentionWindow,
        page: PageRequest,
    ) -> AppResult<Vec<Execution>> {
        let key = scope.to_string();
        self.calls
            .lock()
            .await
            .push(format!("fetch:{key}:{}", page.index));
        if self
            .failing_fetches
            .lock()
            .await
            .contains(&(key.clone(), page.index))
        {
            return Err(AppError::Transport("timed out".to_owned()));
        }

        Ok(self
            .pages
            .lock()
            .await
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default())
    }

    async fn bulk_delete(&self, ids: &[ExecutionId]) -> AppResult<DeletionOutcome> {
        self.calls.lock().await.push(format!("delete:{}", ids.len()));
        self.deleted.lock().await.push(ids.to_vec());
        self.delete_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(DeletionOutcome::all_deleted(ids.len() as u64)))
    }
}

fn project(name: &str) -> ProjectName {
    ProjectName::new(name).unwrap_or_else(|_| panic!("invalid project name"))
}

fn job(seed: u128) -> JobId {
    custom_job(&Uuid::from_u128(seed).to_string())
}

fn custom_job(id: &str) -> JobId {
    JobId::new(id).unwrap_or_else(|_| panic!("invalid job id"))
}

fn job_scope(project_name: &str, job_id: &JobId) -> String {
    RetirementScope::Job {
        project: project(project_name),
        job_id: job_id.clone(),
    }
    .to_string()
}

fn terminal(ids: std::ops::Range<u64>) -> Vec<Execution> {
    ids.map(|id| Execution::new(ExecutionId::new(id), ExecutionStatus::Succeeded))
        .collect()
}

fn partial_outcome() -> DeletionOutcome {
    DeletionOutcome {
        requested: 5,
        succeeded: 3,
        failed: 2,
        all_successful: false,
        failures: Vec::new(),
    }
}

fn options(mode: FilterMode, page_size: u32) -> RetirementOptions {
    RetirementOptions {
        mode,
        retention: RetentionWindow::parse("30d").unwrap_or_else(|_| panic!("test")),
        page_size: NonZeroU32::new(page_size).unwrap_or_else(|| panic!("test")),
        exclude_running: true,
        filtered_project: None,
        filtered_job: None,
    }
}

fn build_service(api: Arc<FakeExecutionApi>, options: RetirementOptions) -> RetirementService {
    RetirementService::new(api, options)
}

#[test]
fn modes_carry_asymmetric_failure_policies() {
    let api = Arc::new(FakeExecutionApi::default());
    let by_project = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let by_job = build_service(api, options(FilterMode::ByJob, 200));

    assert_eq!(by_project.failure_policy(), ScopeFailurePolicy::AbortRun);
    assert_eq!(by_job.failure_policy(), ScopeFailurePolicy::AbandonScope);
}

#[tokio::test]
async fn count_of_450_with_pages_of_200_fetches_four_pages() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.set_count("[ops]", 450).await;
    api.push_page("[ops]", terminal(0..200)).await;
    api.push_page("[ops]", terminal(200..400)).await;
    api.push_page("[ops]", terminal(400..450)).await;

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(
        api.fetch_calls().await,
        vec![
            "fetch:[ops]:0",
            "fetch:[ops]:1",
            "fetch:[ops]:2",
            "fetch:[ops]:3"
        ]
    );
    assert_eq!(api.deleted.lock().await.len(), 3);
    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.executions_deleted, 450);
    assert!(summary.finished_at.is_some());
}

#[tokio::test]
async fn zero_count_fetches_page_zero_once_without_error() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let summary = service.run().await;

    assert!(summary.is_ok());
    assert_eq!(
        api.calls().await,
        vec!["projects", "count:[ops]", "fetch:[ops]:0"]
    );
    assert!(api.deleted.lock().await.is_empty());
}

#[tokio::test]
async fn running_executions_are_never_submitted_for_deletion() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.set_count("[ops]", 3).await;
    api.push_page(
        "[ops]",
        vec![
            Execution::new(ExecutionId::new(1), ExecutionStatus::Succeeded),
            Execution::new(ExecutionId::new(2), ExecutionStatus::Running),
            Execution::new(ExecutionId::new(3), ExecutionStatus::Failed),
        ],
    )
    .await;

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let summary = service.run().await;

    assert!(summary.is_ok());
    assert_eq!(
        *api.deleted.lock().await,
        vec![vec![ExecutionId::new(1), ExecutionId::new(3)]]
    );
}

#[tokio::test]
async fn partial_deletion_continues_with_next_page_in_project_mode() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.set_count("[ops]", 400).await;
    api.push_page("[ops]", terminal(0..5)).await;
    api.push_page("[ops]", terminal(5..10)).await;
    api.delete_results
        .lock()
        .await
        .push_back(Ok(partial_outcome()));

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(api.fetch_calls().await.len(), 3);
    assert_eq!(api.deleted.lock().await.len(), 2);
    assert_eq!(summary.executions_deleted, 8);
    assert_eq!(summary.executions_not_deleted, 2);
    assert_eq!(summary.scopes_abandoned, 0);
}

#[tokio::test]
async fn failed_delete_request_continues_in_project_mode() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.set_count("[ops]", 400).await;
    api.push_page("[ops]", terminal(0..5)).await;
    api.push_page("[ops]", terminal(5..10)).await;
    api.delete_results
        .lock()
        .await
        .push_back(Err(AppError::Transport("timed out".to_owned())));

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(api.deleted.lock().await.len(), 2);
    assert_eq!(summary.failed_delete_requests, 1);
    assert_eq!(summary.executions_deleted, 5);
}

#[tokio::test]
async fn failed_chunk_keeps_earlier_chunk_deletions_in_summary() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.set_count("[ops]", 2).await;
    api.push_page("[ops]", terminal(0..4)).await;
    {
        let mut results = api.delete_results.lock().await;
        results.push_back(Ok(DeletionOutcome::all_deleted(2)));
        results.push_back(Err(AppError::Transport("timed out".to_owned())));
    }

    let service = build_service(api.clone(), options(FilterMode::ByProject, 2));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(api.deleted.lock().await.len(), 2);
    assert_eq!(summary.failed_delete_requests, 1);
    assert_eq!(summary.executions_deleted, 2);
}

#[tokio::test]
async fn partial_deletion_abandons_remaining_pages_in_job_mode() {
    let first = job(1);
    let second = job(2);
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs
        .lock()
        .await
        .insert("ops".to_owned(), vec![first.clone(), second.clone()]);
    api.set_count(&job_scope("ops", &first), 400).await;
    api.push_page(&job_scope("ops", &first), terminal(0..5)).await;
    api.push_page(&job_scope("ops", &first), terminal(5..10)).await;
    api.set_count(&job_scope("ops", &second), 2).await;
    api.push_page(&job_scope("ops", &second), terminal(10..12)).await;
    api.delete_results
        .lock()
        .await
        .push_back(Ok(partial_outcome()));

    let service = build_service(api.clone(), options(FilterMode::ByJob, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(
        api.fetch_calls().await,
        vec![
            format!("fetch:{}:0", job_scope("ops", &first)),
            format!("fetch:{}:0", job_scope("ops", &second)),
            format!("fetch:{}:1", job_scope("ops", &second)),
        ]
    );
    assert_eq!(summary.scopes_processed, 2);
    assert_eq!(summary.scopes_abandoned, 1);
    assert_eq!(summary.executions_deleted, 5);
}

#[tokio::test]
async fn empty_page_ends_job_scope_early() {
    let job_id = job(7);
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs.lock().await.insert("ops".to_owned(), vec![job_id.clone()]);
    api.set_count(&job_scope("ops", &job_id), 400).await;

    let service = build_service(api.clone(), options(FilterMode::ByJob, 200));
    let summary = service.run().await;

    assert!(summary.is_ok());
    assert_eq!(api.fetch_calls().await.len(), 1);
    assert!(api.deleted.lock().await.is_empty());
}

#[tokio::test]
async fn count_failure_aborts_whole_run_in_project_mode() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["alpha", "beta"]));
    api.failing_counts.lock().await.insert("[alpha]".to_owned());
    api.set_count("[beta]", 10).await;

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let result = service.run().await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert_eq!(api.calls().await, vec!["projects", "count:[alpha]"]);
}

#[tokio::test]
async fn fetch_failure_aborts_whole_run_in_project_mode() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["alpha", "beta"]));
    api.set_count("[alpha]", 400).await;
    api.push_page("[alpha]", terminal(0..200)).await;
    api.failing_fetches
        .lock()
        .await
        .insert(("[alpha]".to_owned(), 1));

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let result = service.run().await;

    assert!(result.is_err());
    assert!(
        !api.calls()
            .await
            .iter()
            .any(|call| call.contains("[beta]"))
    );
}

#[tokio::test]
async fn count_failure_only_skips_the_job_in_job_mode() {
    let broken = job(1);
    let healthy = job(2);
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs
        .lock()
        .await
        .insert("ops".to_owned(), vec![broken.clone(), healthy.clone()]);
    api.failing_counts
        .lock()
        .await
        .insert(job_scope("ops", &broken));
    api.set_count(&job_scope("ops", &healthy), 3).await;
    api.push_page(&job_scope("ops", &healthy), terminal(0..3)).await;

    let service = build_service(api.clone(), options(FilterMode::ByJob, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.scopes_abandoned, 1);
    assert_eq!(summary.executions_deleted, 3);
}

#[tokio::test]
async fn fetch_failure_only_skips_the_job_in_job_mode() {
    let broken = job(1);
    let healthy = job(2);
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs
        .lock()
        .await
        .insert("ops".to_owned(), vec![broken.clone(), healthy.clone()]);
    api.set_count(&job_scope("ops", &broken), 3).await;
    api.failing_fetches
        .lock()
        .await
        .insert((job_scope("ops", &broken), 0));
    api.set_count(&job_scope("ops", &healthy), 3).await;
    api.push_page(&job_scope("ops", &healthy), terminal(0..3)).await;

    let service = build_service(api.clone(), options(FilterMode::ByJob, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.scopes_abandoned, 1);
    assert_eq!(summary.executions_deleted, 3);
}

#[tokio::test]
async fn job_listing_failure_skips_project_in_job_mode() {
    let job_id = job(3);
    let api = Arc::new(FakeExecutionApi::with_projects(&["alpha", "beta"]));
    api.failing_job_listings
        .lock()
        .await
        .insert("alpha".to_owned());
    api.jobs.lock().await.insert("beta".to_owned(), vec![job_id.clone()]);
    api.set_count(&job_scope("beta", &job_id), 1).await;
    api.push_page(&job_scope("beta", &job_id), terminal(0..1)).await;

    let service = build_service(api.clone(), options(FilterMode::ByJob, 200));
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.projects_processed, 2);
    assert_eq!(summary.executions_deleted, 1);
}

#[tokio::test]
async fn abort_policy_override_escalates_job_failures() {
    let job_id = job(4);
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs.lock().await.insert("ops".to_owned(), vec![job_id.clone()]);
    api.failing_counts
        .lock()
        .await
        .insert(job_scope("ops", &job_id));

    let service = build_service(api, options(FilterMode::ByJob, 200))
        .with_failure_policy(ScopeFailurePolicy::AbortRun);

    assert!(service.run().await.is_err());
}

#[tokio::test]
async fn project_listing_failure_aborts_before_any_scope() {
    let api = Arc::new(FakeExecutionApi::default());

    let service = build_service(api.clone(), options(FilterMode::ByProject, 200));
    let result = service.run().await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert_eq!(api.calls().await, vec!["projects"]);
}

#[tokio::test]
async fn filtered_project_restricts_the_run() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["alpha", "beta"]));
    let mut options = options(FilterMode::ByProject, 200);
    options.filtered_project = Some(project("beta"));

    let service = build_service(api.clone(), options);
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.projects_processed, 1);
    assert_eq!(
        api.calls().await,
        vec!["projects", "count:[beta]", "fetch:[beta]:0"]
    );
}

#[tokio::test]
async fn missing_filtered_project_completes_without_work() {
    let api = Arc::new(FakeExecutionApi::with_projects(&["alpha"]));
    let mut options = options(FilterMode::ByProject, 200);
    options.filtered_project = Some(project("gamma"));

    let service = build_service(api.clone(), options);
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.projects_processed, 0);
    assert_eq!(api.calls().await, vec!["projects"]);
}

#[tokio::test]
async fn filtered_job_restricts_job_scopes() {
    let skipped = job(5);
    let selected = custom_job("nightly-backup");
    let api = Arc::new(FakeExecutionApi::with_projects(&["ops"]));
    api.jobs
        .lock()
        .await
        .insert("ops".to_owned(), vec![skipped.clone(), selected.clone()]);
    let mut options = options(FilterMode::ByJob, 200);
    options.filtered_job = Some(selected.clone());

    let service = build_service(api.clone(), options);
    let summary = service
        .run()
        .await
        .unwrap_or_else(|error| panic!("run failed: {error}"));

    assert_eq!(summary.scopes_processed, 1);
    assert!(
        !api.calls()
            .await
            .iter()
            .any(|call| call.contains(&skipped.to_string()))
    );
}
