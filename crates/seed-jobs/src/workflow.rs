//! Mapping and matching workflows of one import file.

use std::sync::Arc;

use seed_map::{MappingEngine, MappingSession};
use seed_model::{BuildingQuery, ConfidenceThresholds, FileId, MatchFilter, MatchRow, OrgContext};
use tracing::{debug, info, warn};

use crate::backend::{RemapStatus, SeedBackend};
use crate::error::{JobError, Result};
use crate::progress::{JobHandle, JobRunner, JobRunnerConfig, ProgressTarget};

/// Drives an import file from column mapping to system matching.
pub struct MappingWorkflow<B: ?Sized> {
    backend: Arc<B>,
    ctx: OrgContext,
    runner: JobRunner<B>,
    thresholds: ConfidenceThresholds,
}

impl<B: SeedBackend + ?Sized + 'static> MappingWorkflow<B> {
    pub fn new(backend: Arc<B>, ctx: OrgContext, config: JobRunnerConfig) -> Self {
        let runner = JobRunner::new(Arc::clone(&backend), config);
        Self {
            backend,
            ctx,
            runner,
            thresholds: ConfidenceThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn context(&self) -> &OrgContext {
        &self.ctx
    }

    /// Loads the headers, sample rows and saved suggestions of `file_id`
    /// into a validated, conflict-checked session.
    pub async fn load_session(&self, file_id: FileId) -> Result<MappingSession> {
        let suggested = self
            .backend
            .fetch_suggested_mappings(&self.ctx, file_id)
            .await?;
        let samples = self
            .backend
            .fetch_column_samples(&self.ctx, file_id)
            .await?;

        let engine = MappingEngine::new(suggested.schema());
        let mut session =
            MappingSession::from_samples(&samples.headers, &samples.rows, engine, self.thresholds);
        session.suggest(&suggested.suggestions);
        info!(
            file = %file_id,
            columns = session.columns().len(),
            conflicts = session.has_conflicts(),
            "loaded mapping session"
        );
        Ok(session)
    }

    /// Saves the committed mapping and starts the mapping job.
    ///
    /// Refused while the session has conflicts; nothing is sent then.
    pub async fn start_mapping<F>(
        &self,
        file_id: FileId,
        session: &MappingSession,
        target: Arc<dyn ProgressTarget>,
        on_complete: F,
    ) -> Result<JobHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let mappings = session.commit()?;
        self.backend
            .save_mappings(&self.ctx, file_id, &mappings)
            .await?;
        let key = self.backend.start_mapping(&self.ctx, file_id).await?;
        info!(file = %file_id, job = %key, "mapping started");
        Ok(self.runner.run(key, 0.0, 1.0, on_complete, target))
    }

    /// Saves the committed mapping and re-runs mapping on an already mapped
    /// file. An error or warning reply is returned without polling.
    pub async fn remap<F>(
        &self,
        file_id: FileId,
        session: &MappingSession,
        target: Arc<dyn ProgressTarget>,
        on_complete: F,
    ) -> Result<JobHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let mappings = session.commit()?;
        self.backend
            .save_mappings(&self.ctx, file_id, &mappings)
            .await?;
        let response = self.backend.remap(&self.ctx, file_id).await?;
        let message = response.message.unwrap_or_default();
        match (response.status, response.progress_key) {
            (RemapStatus::Ok, Some(key)) => {
                info!(file = %file_id, job = %key, "remapping started");
                Ok(self.runner.run(key, 0.0, 1.0, on_complete, target))
            }
            (RemapStatus::Ok, None) => {
                warn!(file = %file_id, "remap accepted without a progress key");
                Err(JobError::Rejected {
                    operation: "remap",
                    message: "no progress key returned".to_string(),
                })
            }
            (status, _) => {
                warn!(file = %file_id, ?status, reason = %message, "remap rejected");
                Err(JobError::Rejected {
                    operation: "remap",
                    message,
                })
            }
        }
    }

    /// Raw buildings of `file_id` passing `filter`, fetched page by page.
    ///
    /// Each row comes back with its loaded `matched` flag acknowledged.
    pub async fn load_match_rows(
        &self,
        file_id: FileId,
        filter: MatchFilter,
        page_size: u32,
    ) -> Result<Vec<MatchRow>> {
        let mut query = BuildingQuery::new(page_size);
        query.import_file = Some(file_id);
        query.match_filter = filter;

        let mut rows = Vec::new();
        loop {
            let page = self.backend.fetch_buildings(&self.ctx, &query).await?;
            let pages = page.page_count(page_size);
            let empty = page.buildings.is_empty();
            rows.extend(page.into_rows());
            if empty || u64::from(query.page) >= pages {
                break;
            }
            query.page += 1;
        }
        debug!(
            file = %file_id,
            ?filter,
            rows = rows.len(),
            pages = query.page,
            "loaded match rows"
        );
        Ok(rows)
    }

    /// Starts bulk system matching of the mapped file.
    pub async fn start_matching<F>(
        &self,
        file_id: FileId,
        target: Arc<dyn ProgressTarget>,
        on_complete: F,
    ) -> Result<JobHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let key = self
            .backend
            .start_system_matching(&self.ctx, file_id)
            .await?;
        info!(file = %file_id, job = %key, "system matching started");
        Ok(self.runner.run(key, 0.0, 1.0, on_complete, target))
    }
}
