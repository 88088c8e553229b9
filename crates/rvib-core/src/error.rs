use thiserror::Error;

/// Errors surfaced by the remote vector index build orchestrator and its
/// collaborators.
///
/// Every variant but [`Error::ProgrammingError`] and
/// [`Error::EligibilityNotMet`] is recoverable by the orchestrator: it logs
/// a warning, records a failure counter, and falls back to the local build
/// strategy. `ProgrammingError` is always fatal.
#[derive(Debug, Error)]
pub enum Error {
    /// A required piece of configuration (repository name, endpoint list)
    /// was missing when the orchestrator needed it.
    #[error("remote build configuration missing: {0}")]
    ConfigMissing(String),

    /// [`crate::EligibilityPolicy`] said no; this is not a failure, the
    /// caller routes straight to the local strategy and touches no
    /// counters.
    #[error("remote build not eligible for this job")]
    EligibilityNotMet,

    /// The vector or doc-id blob could not be written to the repository.
    #[error("upload to repository failed: {0}")]
    UploadFailed(String),

    /// Every configured endpoint returned 507 (admission control).
    #[error("all endpoints rejected the build submission")]
    SubmitRejectedAllEndpoints,

    /// A non-200, non-507 response was returned from `/_build`.
    #[error("build submission failed: {0}")]
    SubmitHttpError(String),

    /// A non-200 response was returned from `/_status/{job_id}`.
    #[error("build status query failed: {0}")]
    StatusHttpError(String),

    /// The remote builder reported `FAILED_INDEX_BUILD`.
    #[error("remote build reported failure: {0}")]
    BuildReportedFailed(String),

    /// The await loop exceeded its wall-clock timeout.
    #[error("remote build timed out")]
    BuildTimedOut,

    /// The finished artifact could not be downloaded into the segment
    /// sink.
    #[error("download from repository failed: {0}")]
    DownloadFailed(String),

    /// A response violated the wire contract: malformed JSON, or a
    /// required field missing/null where the contract requires it.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The caller misused the API in a way that is always a bug, never a
    /// runtime condition — e.g. calling the non-flush-tagged entry point
    /// for a job that requires remote build attribution. Never triggers
    /// fallback.
    #[error("programming error: {0}")]
    ProgrammingError(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
