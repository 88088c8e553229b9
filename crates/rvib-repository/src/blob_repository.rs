use async_trait::async_trait;
use rvib_core::{Engine, Error, Result};
use tokio::io::AsyncRead;

/// One part of a multi-part upload: the repository driver reads exactly
/// `size` bytes from `reader` and is responsible for placing it at the
/// correct offset of the finished blob.
pub struct BlobPart {
    pub part_no: u32,
    pub size: u64,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

/// What a successful write produced, for diagnostics and counters.
#[derive(Debug, Clone, Copy)]
pub struct WriteOutcome {
    pub bytes_written: u64,
    pub parts: u32,
}

/// The blob container abstraction the orchestrator uploads to and
/// downloads from. A production implementation wraps an object-storage
/// SDK; this crate ships only an in-memory double for tests.
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// Whether this container exposes a parallel multi-part write path.
    /// `false` forces [`BlobRepository::write_single`] for every upload.
    fn supports_multipart(&self) -> bool;

    /// Writes `len` bytes read from `reader` to `path` as one sequential
    /// stream.
    async fn write_single(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        len: u64,
    ) -> Result<WriteOutcome>;

    /// Writes `parts` to `path` in parallel. A part that yields fewer
    /// bytes than its declared `size` is a fatal error for the whole
    /// write — the caller surfaces [`Error::UploadFailed`] with the
    /// earliest captured cause.
    async fn write_multipart(&self, path: &str, parts: Vec<BlobPart>) -> Result<WriteOutcome>;

    /// Opens `path` for sequential reading.
    async fn open_read(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>>;
}

/// Rejects a download path that doesn't carry `expected_extension`,
/// before any network call is issued.
///
/// [`crate::RepositoryAccessor::read_from_repository`] downloads the
/// finished build artifact named in a [`crate::BuildStatus`] — a
/// `FAILED_INDEX_BUILD`/`COMPLETED_INDEX_BUILD` response is attacker- or
/// bug-controlled input from the remote side, so the extension is
/// checked against the engine's own artifact suffix rather than trusted
/// blindly.
pub(crate) fn reject_unless_extension(path: &str, expected_extension: &str) -> Result<()> {
    if path.ends_with(expected_extension) {
        Ok(())
    } else {
        Err(Error::DownloadFailed(format!(
            "refusing to read blob without the expected \"{expected_extension}\" extension: {path}"
        )))
    }
}

/// Maps a target ANN engine to the file extension its build service
/// writes finished index artifacts with. Unrecognized engines fall back
/// to a generic `.index` suffix rather than refusing outright, since the
/// remote service is the source of truth for engines this crate doesn't
/// special-case.
pub fn engine_artifact_extension(engine: &Engine) -> &'static str {
    match engine.as_str() {
        "faiss" => ".faiss",
        "nmslib" | "hnswlib" => ".hnsw",
        "lucene" => ".lucene",
        _ => ".index",
    }
}
