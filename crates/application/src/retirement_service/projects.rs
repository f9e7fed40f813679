use super::*;

impl RetirementService {
    /// Retires stale executions across every selected project.
    ///
    /// Returns an error when the run aborts: project listing failed, or a scope
    /// failed under [`ScopeFailurePolicy::AbortRun`].
    pub async fn run(&self) -> AppResult<RetirementSummary> {
        let mut summary = RetirementSummary::started(Utc::now());

        info!(
            mode = self.options.mode.as_str(),
            retention = %self.options.retention,
            page_size = self.options.page_size.get(),
            exclude_running = self.options.exclude_running,
            "starting execution retirement"
        );

        let projects = match self.api.list_projects().await {
            Ok(projects) => projects,
            Err(error) => {
                error!(error = %error, "error on reading projects, aborting run");
                return Err(error);
            }
        };

        for project in self.select_projects(projects) {
            summary.projects_processed = summary.projects_processed.saturating_add(1);

            match self.options.mode {
                FilterMode::ByProject => {
                    self.retire_scope(RetirementScope::Project(project), &mut summary)
                        .await?;
                }
                FilterMode::ByJob => self.retire_project_jobs(project, &mut summary).await?,
            }
        }

        summary.finish(Utc::now());
        info!(
            projects = summary.projects_processed,
            scopes = summary.scopes_processed,
            abandoned_scopes = summary.scopes_abandoned,
            pages = summary.pages_fetched,
            deleted = summary.executions_deleted,
            not_deleted = summary.executions_not_deleted,
            failed_requests = summary.failed_delete_requests,
            "execution retirement finished"
        );

        Ok(summary)
    }

    fn select_projects(&self, projects: Vec<ProjectName>) -> Vec<ProjectName> {
        let Some(filtered_project) = &self.options.filtered_project else {
            return projects;
        };

        let selected: Vec<ProjectName> = projects
            .into_iter()
            .filter(|project| project == filtered_project)
            .collect();

        if selected.is_empty() {
            warn!(
                project = %filtered_project,
                "filtered project is not listed by the server"
            );
        }

        selected
    }

    async fn retire_project_jobs(
        &self,
        project: ProjectName,
        summary: &mut RetirementSummary,
    ) -> AppResult<()> {
        let jobs = match self.api.list_jobs_by_project(&project).await {
            Ok(jobs) => jobs,
            Err(error) => match self.failure_policy {
                ScopeFailurePolicy::AbortRun => {
                    error!(project = %project, error = %error, "error on reading jobs, aborting run");
                    return Err(error);
                }
                ScopeFailurePolicy::AbandonScope => {
                    warn!(project = %project, error = %error, "error on reading jobs, skipping project");
                    return Ok(());
                }
            },
        };

        debug!(project = %project, jobs = jobs.len(), "listed project jobs");

        for job_id in jobs {
            if !self
                .options
                .filtered_job
                .as_ref()
                .is_none_or(|filtered_job| *filtered_job == job_id)
            {
                continue;
            }

            let scope = RetirementScope::Job {
                project: project.clone(),
                job_id,
            };
            self.retire_scope(scope, summary).await?;
        }

        Ok(())
    }
}
