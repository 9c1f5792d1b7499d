//! Bulk export of buildings with progress feedback.

use std::sync::Arc;

use async_trait::async_trait;
use seed_model::{JobKey, JobProgress, OrgContext, TransportError};
use tracing::info;

use crate::backend::{ExportRequest, SeedBackend};
use crate::error::Result;
use crate::progress::{
    JobHandle, JobRunner, JobRunnerConfig, ProgressDisplay, ProgressSource, ProgressTarget,
};

/// Reads export progress as job progress: buildings written against the
/// total of the ticket.
struct ExportProgress<B: ?Sized> {
    backend: Arc<B>,
    total: u64,
}

#[async_trait]
impl<B: SeedBackend + ?Sized> ProgressSource for ExportProgress<B> {
    async fn fetch_job_progress(
        &self,
        key: &JobKey,
    ) -> std::result::Result<JobProgress, TransportError> {
        let processed = self.backend.fetch_export_progress(key.as_str()).await?;
        Ok(JobProgress::running(key.clone(), processed, self.total))
    }
}

pub struct ExportWorkflow<B: ?Sized> {
    backend: Arc<B>,
    ctx: OrgContext,
    config: JobRunnerConfig,
}

impl<B: SeedBackend + ?Sized + 'static> ExportWorkflow<B> {
    pub fn new(backend: Arc<B>, ctx: OrgContext, config: JobRunnerConfig) -> Self {
        Self {
            backend,
            ctx,
            config,
        }
    }

    /// Starts the export and its progress polling.
    pub async fn start(
        &self,
        request: &ExportRequest,
        target: Arc<dyn ProgressTarget>,
    ) -> Result<ExportJob<B>> {
        let ticket = self.backend.start_export(&self.ctx, request).await?;
        let key = JobKey::new(ticket.export_id.clone()).map_err(|_| {
            TransportError::new("start_export", "empty export id")
        })?;
        info!(
            export = %key,
            total = ticket.total_buildings,
            file = %request.file_name(),
            "export started"
        );

        let handle = if ticket.total_buildings == 0 {
            target.update(ProgressDisplay {
                fraction: 1.0,
                numerator: 0,
                denominator: 0,
            });
            None
        } else {
            let source = Arc::new(ExportProgress {
                backend: Arc::clone(&self.backend),
                total: ticket.total_buildings,
            });
            let runner = JobRunner::new(source, self.config);
            Some(runner.run(key.clone(), 0.0, 1.0, || {}, target))
        };

        Ok(ExportJob {
            backend: Arc::clone(&self.backend),
            key,
            handle,
        })
    }

    /// Runs an export to the end and returns its download location.
    pub async fn export(
        &self,
        request: &ExportRequest,
        target: Arc<dyn ProgressTarget>,
    ) -> Result<String> {
        self.start(request, target).await?.finish().await
    }
}

/// A running export.
pub struct ExportJob<B: ?Sized> {
    backend: Arc<B>,
    key: JobKey,
    handle: Option<JobHandle>,
}

impl<B: SeedBackend + ?Sized> ExportJob<B> {
    pub fn export_id(&self) -> &str {
        self.key.as_str()
    }

    /// Stops polling; the export itself is left to the backend.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.cancel();
        }
    }

    /// Waits until every building is written, then resolves the download.
    pub async fn finish(self) -> Result<String> {
        if let Some(handle) = self.handle {
            handle.wait().await?;
        }
        let url = self
            .backend
            .fetch_export_download(self.key.as_str())
            .await?;
        info!(export = %self.key, "export ready");
        Ok(url)
    }
}
