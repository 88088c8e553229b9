use async_trait::async_trait;
use rvib_core::SegmentBuildJob;

/// The local in-process ANN build algorithm, consumed as an external
/// collaborator.
///
/// [`crate::Orchestrator`] invokes this with the same [`SegmentBuildJob`]
/// it was handed whenever the remote path fails at any phase after
/// `UPLOADING` starts. Building the index itself is out of scope here —
/// only the seam is specified.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct LocalBuildError(pub String);

impl LocalBuildError {
    /// Wraps any displayable error as a [`LocalBuildError`].
    pub fn from_display(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

#[async_trait]
pub trait LocalBuildStrategy<Sink>: Send + Sync {
    /// Builds the index for `job` in-process, writing the finished
    /// artifact into `job`'s segment sink. A failure here is fatal for
    /// the segment — there is no further fallback.
    async fn build(&self, job: &mut SegmentBuildJob<Sink>) -> Result<(), LocalBuildError>;
}
