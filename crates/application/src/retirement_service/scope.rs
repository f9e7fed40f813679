use super::*;

impl RetirementService {
    /// Counts, pages through and deletes the stale executions of one scope.
    pub(super) async fn retire_scope(
        &self,
        scope: RetirementScope,
        summary: &mut RetirementSummary,
    ) -> AppResult<()> {
        summary.scopes_processed = summary.scopes_processed.saturating_add(1);
        let retention = self.options.retention;

        let total = match self.api.count_executions(&scope, retention).await {
            Ok(total) => total,
            Err(error) => {
                return self.scope_failed(&scope, error, "error on reading execution count", summary);
            }
        };

        let pages = PageSequence::new(total, self.options.page_size);
        if total > 0 {
            info!(scope = %scope, executions = total, "there are old deletable executions");
            info!(
                scope = %scope,
                cycles = pages.page_count(),
                "processing execution deletion in cycles"
            );
        } else {
            info!(scope = %scope, "there are no deletable executions");
        }

        for page in pages {
            let executions = match self
                .api
                .fetch_execution_page(&scope, retention, page)
                .await
            {
                Ok(executions) => executions,
                Err(error) => {
                    return self.scope_failed(&scope, error, "error on reading executions", summary);
                }
            };
            summary.pages_fetched = summary.pages_fetched.saturating_add(1);

            let ids: Vec<ExecutionId> = retain_deletable(executions, self.options.exclude_running)
                .into_iter()
                .map(|execution| execution.id)
                .collect();

            if ids.is_empty() && self.failure_policy == ScopeFailurePolicy::AbandonScope {
                debug!(scope = %scope, page = page.index, "no deletable executions left");
                break;
            }

            let deletion = self.deletion.delete(&ids).await;
            summary.record_deletion(&deletion);

            if !deletion.is_success() && self.failure_policy == ScopeFailurePolicy::AbandonScope {
                warn!(
                    scope = %scope,
                    page = page.index,
                    "deletion failed, skipping remaining pages of scope"
                );
                summary.scopes_abandoned = summary.scopes_abandoned.saturating_add(1);
                break;
            }
        }

        Ok(())
    }

    fn scope_failed(
        &self,
        scope: &RetirementScope,
        error: AppError,
        message: &str,
        summary: &mut RetirementSummary,
    ) -> AppResult<()> {
        match self.failure_policy {
            ScopeFailurePolicy::AbortRun => {
                error!(scope = %scope, error = %error, "{message}, aborting run");
                Err(error)
            }
            ScopeFailurePolicy::AbandonScope => {
                warn!(scope = %scope, error = %error, "{message}, skipping scope");
                summary.scopes_abandoned = summary.scopes_abandoned.saturating_add(1);
                Ok(())
            }
        }
    }
}
