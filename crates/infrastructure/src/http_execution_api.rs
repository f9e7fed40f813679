use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use sweeper_application::ExecutionApi;
use sweeper_core::{AppError, AppResult};
use sweeper_domain::{
    DeletionOutcome, Execution, ExecutionId, JobId, PageRequest, ProjectName, RetentionWindow,
    RetirementScope,
};
use tracing::{debug, warn};
use url::Url;

mod wire;

use wire::{
    BulkDeleteResponse, ExecutionCountResponse, ExecutionListResponse, JobResponse,
    ProjectResponse,
};

const AUTH_TOKEN_HEADER: &str = "X-Rundeck-Auth-Token";

/// Retry behaviour for transient failures of read requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Base delay, multiplied by the attempt number.
    pub delay: Duration,
}

/// Connection settings for [`HttpExecutionApi`].
#[derive(Debug, Clone)]
pub struct ExecutionApiSettings {
    /// Versioned API root, e.g. `https://host:4440/api/19/`.
    pub base_url: Url,
    /// API token sent with every request.
    pub auth_token: String,
    /// Timeout applied to GET requests.
    pub search_timeout: Duration,
    /// Timeout applied to bulk-delete requests.
    pub delete_timeout: Duration,
    /// Disables TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Retry wiring for GET requests. `None` sends every request once.
    pub retry: Option<RetrySettings>,
}

/// reqwest-based implementation of the execution API port.
pub struct HttpExecutionApi {
    http_client: reqwest::Client,
    settings: ExecutionApiSettings,
}

impl HttpExecutionApi {
    /// Builds the HTTP client with authentication headers baked in.
    pub fn new(settings: ExecutionApiSettings) -> AppResult<Self> {
        let mut auth_token = HeaderValue::from_str(settings.auth_token.as_str()).map_err(|_| {
            AppError::Configuration("auth token contains invalid header characters".to_owned())
        })?;
        auth_token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTH_TOKEN_HEADER, auth_token);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn endpoint<I>(&self, segments: I) -> AppResult<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Configuration(format!(
                    "API base URL '{}' cannot carry a path",
                    self.settings.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn executions_endpoint(&self, scope: &RetirementScope) -> AppResult<Url> {
        match scope {
            RetirementScope::Project(project) => {
                self.endpoint(["project", project.as_str(), "executions"])
            }
            RetirementScope::Job { job_id, .. } => {
                self.endpoint(["job", job_id.as_str(), "executions"])
            }
        }
    }

    async fn get_json<T>(&self, url: Url, operation: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let max_attempts = self
            .settings
            .retry
            .map_or(1, |retry| retry.retries.saturating_add(1));
        let mut attempt = 0_u32;

        loop {
            attempt = attempt.saturating_add(1);
            debug!(url = %url, attempt, "{operation} request");

            let response = self
                .http_client
                .get(url.clone())
                .timeout(self.settings.search_timeout)
                .send()
                .await;

            match decode_response(response, operation).await {
                Ok(body) => return Ok(body),
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let delay = self
                        .settings
                        .retry
                        .map_or(Duration::ZERO, |retry| retry.delay.saturating_mul(attempt));
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "transient request failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

async fn decode_response<T>(
    response: Result<reqwest::Response, reqwest::Error>,
    operation: &str,
) -> AppResult<T>
where
    T: DeserializeOwned,
{
    let response = response.map_err(|error| {
        AppError::Transport(format!("failed to call {operation} endpoint: {error}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        return Err(AppError::Protocol(format!(
            "{operation} endpoint returned status {}: {body}",
            status.as_u16()
        )));
    }

    let body = response.bytes().await.map_err(|error| {
        AppError::Transport(format!("failed to read {operation} response body: {error}"))
    })?;

    serde_json::from_slice::<T>(&body).map_err(|error| {
        AppError::Protocol(format!(
            "failed to parse {operation} response body: {error}"
        ))
    })
}

#[async_trait]
impl ExecutionApi for HttpExecutionApi {
    async fn list_projects(&self) -> AppResult<Vec<ProjectName>> {
        let url = self.endpoint(["projects"])?;
        let projects: Vec<ProjectResponse> = self.get_json(url, "project listing").await?;

        projects
            .into_iter()
            .map(ProjectResponse::into_project_name)
            .collect()
    }

    async fn list_jobs_by_project(&self, project: &ProjectName) -> AppResult<Vec<JobId>> {
        let url = self.endpoint(["project", project.as_str(), "jobs"])?;
        let jobs: Vec<JobResponse> = self.get_json(url, "job listing").await?;

        Ok(jobs
            .into_iter()
            .filter_map(|job| match job.into_job_id() {
                Ok(job_id) => Some(job_id),
                Err(error) => {
                    warn!(project = %project, error = %error, "skipping job with invalid id");
                    None
                }
            })
            .collect())
    }

    async fn count_executions(
        &self,
        scope: &RetirementScope,
        older_than: RetentionWindow,
    ) -> AppResult<u64> {
        let mut url = self.executions_endpoint(scope)?;
        url.query_pairs_mut()
            .append_pair("olderFilter", older_than.older_filter().as_str())
            .append_pair("max", "1");

        let response: ExecutionCountResponse = self.get_json(url, "execution count").await?;
        Ok(response.paging.total)
    }

    async fn fetch_execution_page(
        &self,
        scope: &RetirementScope,
        older_than: RetentionWindow,
        page: PageRequest,
    ) -> AppResult<Vec<Execution>> {
        let mut url = self.executions_endpoint(scope)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("max", page.limit.to_string().as_str())
                .append_pair("olderFilter", older_than.older_filter().as_str());
            // Project scopes drain the head of the window: earlier pages are
            // already deleted, so an offset would skip executions.
            if scope.is_job() {
                query.append_pair("offset", page.offset.to_string().as_str());
            }
        }

        let response: ExecutionListResponse = self.get_json(url, "execution listing").await?;
        Ok(response.into_executions())
    }

    async fn bulk_delete(&self, ids: &[ExecutionId]) -> AppResult<DeletionOutcome> {
        let url = self.endpoint(["executions", "delete"])?;
        debug!(url = %url, requested = ids.len(), "bulk delete request");

        let response = self
            .http_client
            .post(url)
            .timeout(self.settings.delete_timeout)
            .json(ids)
            .send()
            .await;

        let outcome: BulkDeleteResponse = decode_response(response, "bulk delete").await?;
        Ok(outcome.into_outcome())
    }
}
