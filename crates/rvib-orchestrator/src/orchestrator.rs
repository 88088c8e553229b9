use std::sync::Arc;
use std::time::Instant;

use rvib_client::{BuildClient, RemoteBuildRequest};
use rvib_core::{Error, Result, SegmentBuildJob};
use rvib_repository::{engine_artifact_extension, BlobRepository, RepositoryAccessor};
use tokio::io::AsyncWrite;
use tracing::{instrument, warn};

use crate::local::{LocalBuildError, LocalBuildStrategy};
use crate::stats::StatsRegistry;

/// Fixed part of a [`RemoteBuildRequest`] this process always submits,
/// independent of any one job: the storage backend kind and the
/// cluster identity the remote builder attributes the request to.
#[derive(Debug, Clone)]
pub struct OrchestratorIdentity {
    /// `repository_type` on the wire (e.g. `"s3"`).
    pub repository_type: String,
    /// `tenant_id` on the wire — the cluster name.
    pub tenant_id: String,
}

/// How a [`SegmentBuildJob`] was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The remote pipeline ran start to finish; the segment sink holds
    /// the downloaded artifact.
    Remote,
    /// Some phase of the remote pipeline failed and
    /// [`LocalBuildStrategy::build`] produced the segment instead.
    FellBack,
}

/// Errors [`Orchestrator::build`] can return to its caller. Every other
/// failure mode is absorbed internally and turned into a fallback.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The caller misused the API — e.g. went through the entry point
    /// that cannot carry flush/merge attribution. Never triggers
    /// fallback; always a bug to fix at the call site.
    #[error("programming error: {0}")]
    ProgrammingError(String),

    /// The remote pipeline failed and the local fallback build also
    /// failed. Fatal for the segment: there is no further recovery.
    #[error("local build strategy failed after remote fallback: {0}")]
    LocalBuildFailed(#[from] LocalBuildError),
}

/// Drives one [`SegmentBuildJob`] through `INIT → UPLOADING →
/// SUBMITTING → AWAITING → DOWNLOADING → DONE`, falling back to a
/// [`LocalBuildStrategy`] on any recoverable failure.
///
/// One instance is typically built per process and shared across
/// concurrent jobs: the repository, HTTP client, and stats registry are
/// all safe to use from multiple jobs at once, and no lock is held
/// across I/O.
pub struct Orchestrator<Sink> {
    repository: Arc<dyn BlobRepository>,
    client: Arc<BuildClient>,
    stats: Arc<StatsRegistry>,
    local: Arc<dyn LocalBuildStrategy<Sink>>,
    identity: OrchestratorIdentity,
    upload_buffer_bytes: usize,
    force_single_stream: bool,
    container: String,
    timeout: std::time::Duration,
    poll_interval: std::time::Duration,
    initial_delay: std::time::Duration,
}

impl<Sink> Orchestrator<Sink>
where
    Sink: AsyncWrite + Unpin + Send,
{
    /// Builds an orchestrator over the given collaborators.
    ///
    /// `container` and the poll/timeout/buffer parameters come from
    /// [`rvib_core::RemoteBuildSettings`]; callers typically derive them
    /// once from a loaded settings value and keep this instance for the
    /// life of the process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<dyn BlobRepository>,
        client: Arc<BuildClient>,
        stats: Arc<StatsRegistry>,
        local: Arc<dyn LocalBuildStrategy<Sink>>,
        identity: OrchestratorIdentity,
        container: impl Into<String>,
        upload_buffer_bytes: usize,
        force_single_stream: bool,
        timeout: std::time::Duration,
        poll_interval: std::time::Duration,
        initial_delay: std::time::Duration,
    ) -> Self {
        Self {
            repository,
            client,
            stats,
            local,
            identity,
            upload_buffer_bytes,
            force_single_stream,
            container: container.into(),
            timeout,
            poll_interval,
            initial_delay,
        }
    }

    /// Exposes the stats registry this orchestrator updates, for
    /// metrics export.
    pub fn stats(&self) -> &StatsRegistry {
        &self.stats
    }

    /// The flush/merge-tagged entry point: the only one that may
    /// actually attempt a remote build. `is_flush` selects which
    /// "current ops/size" gauge and cumulative-time counter this job's
    /// phases are attributed to — it is mandatory because metrics
    /// attribution must never be guessed.
    #[instrument(skip(self, job), fields(segment_id = job.segment_id(), field_name = job.field_name()))]
    pub async fn build(
        &self,
        mut job: SegmentBuildJob<Sink>,
        is_flush: bool,
    ) -> std::result::Result<BuildOutcome, OrchestratorError> {
        let start = Instant::now();
        let vector_bytes = job.vector_blob_len() as i64;
        self.stats.begin_operation(is_flush, vector_bytes);

        let remote_result = self.run_remote(&mut job).await;

        let elapsed = start.elapsed();
        self.stats.end_operation(is_flush, vector_bytes, elapsed);

        match remote_result {
            Ok(()) => {
                self.stats.record_index_build_success();
                Ok(BuildOutcome::Remote)
            }
            Err(Error::ProgrammingError(msg)) => Err(OrchestratorError::ProgrammingError(msg)),
            Err(err) => {
                warn!(error = %err, "remote vector index build failed, falling back to local builder");
                self.stats.record_index_build_failure();
                self.local
                    .build(&mut job)
                    .await
                    .map_err(OrchestratorError::LocalBuildFailed)?;
                Ok(BuildOutcome::FellBack)
            }
        }
    }

    /// The entry point that cannot carry flush/merge attribution.
    /// Always fails fast with [`OrchestratorError::ProgrammingError`]:
    /// remote build is never attempted without it.
    pub async fn build_without_attribution(
        &self,
        _job: SegmentBuildJob<Sink>,
    ) -> std::result::Result<BuildOutcome, OrchestratorError> {
        Err(OrchestratorError::ProgrammingError(
            "remote vector index build requires explicit flush/merge attribution".to_string(),
        ))
    }

    async fn run_remote(&self, job: &mut SegmentBuildJob<Sink>) -> Result<()> {
        let accessor = RepositoryAccessor::new(
            self.repository.as_ref(),
            self.upload_buffer_bytes,
            self.force_single_stream,
        );

        let write_start = Instant::now();
        let names = match accessor.write_to_repository(&*job).await {
            Ok(names) => {
                self.stats.record_write_success(write_start.elapsed());
                names
            }
            Err(err) => {
                self.stats.record_write_failure(write_start.elapsed());
                return Err(err);
            }
        };

        let request = RemoteBuildRequest::new(
            self.identity.repository_type.clone(),
            self.container.clone(),
            names.vector_path.clone(),
            names.doc_id_path.clone(),
            self.identity.tenant_id.clone(),
            job.dimension(),
            job.total_live_docs(),
            job.data_type(),
            job.engine().clone(),
            job.method_params().clone(),
        );

        let job_id = match self.client.submit(&request).await {
            Ok(job_id) => {
                self.stats.record_submit_success();
                job_id
            }
            Err(err) => {
                self.stats.record_submit_failure();
                return Err(err);
            }
        };

        let wait_start = Instant::now();
        let await_result = self
            .client
            .await_build(&job_id, self.timeout, self.poll_interval, self.initial_delay)
            .await;
        self.stats.add_wait_time(wait_start.elapsed());
        let index_path = await_result?;

        let expected_extension = engine_artifact_extension(job.engine());
        let read_start = Instant::now();
        match accessor
            .read_from_repository(&index_path, expected_extension, job.segment_sink())
            .await
        {
            Ok(_bytes) => {
                self.stats.record_read_success(read_start.elapsed());
                Ok(())
            }
            Err(err) => {
                self.stats.record_read_failure(read_start.elapsed());
                Err(err)
            }
        }
    }
}
