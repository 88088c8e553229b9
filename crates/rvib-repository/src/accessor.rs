use rvib_core::{BlobNames, Error, Result, SegmentBuildJob};
use rvib_io::{BufferedSink, DocIdByteStream, VectorByteStream};
use tokio::io::AsyncWrite;

use crate::blob_repository::{reject_unless_extension, BlobPart, BlobRepository, WriteOutcome};

/// Writes a job's two blobs to a [`BlobRepository`], choosing between
/// a parallel multi-part upload and a single buffered stream, and later
/// pulls a finished artifact back into a segment sink.
pub struct RepositoryAccessor<'a> {
    repository: &'a dyn BlobRepository,
    upload_buffer_bytes: usize,
    force_single_stream: bool,
    part_size_bytes: u64,
}

impl<'a> RepositoryAccessor<'a> {
    /// Size of one multi-part upload part when the container supports
    /// parallel uploads. Not part of the enumerated configuration
    /// surface — every container that accepts multi-part uploads is
    /// assumed to tolerate this part size.
    pub const DEFAULT_PART_SIZE_BYTES: u64 = 64 * 1024 * 1024;

    /// Builds an accessor over `repository`. `upload_buffer_bytes` sizes
    /// both the single-stream upload buffer and the download buffer.
    pub fn new(repository: &'a dyn BlobRepository, upload_buffer_bytes: usize, force_single_stream: bool) -> Self {
        Self {
            repository,
            upload_buffer_bytes,
            force_single_stream,
            part_size_bytes: Self::DEFAULT_PART_SIZE_BYTES,
        }
    }

    /// Overrides the multi-part part size (tests use small values to
    /// exercise several parts without huge fixtures).
    pub fn with_part_size_bytes(mut self, part_size_bytes: u64) -> Self {
        self.part_size_bytes = part_size_bytes;
        self
    }

    /// Publishes the vector and doc-id blobs for `job`, returning the
    /// derived [`BlobNames`] once both uploads are observed complete.
    pub async fn write_to_repository<S>(&self, job: &SegmentBuildJob<S>) -> Result<BlobNames> {
        let names = BlobNames::new(job.field_name(), job.segment_id());

        let vector_write = self.write_vector_blob(&names.vector_path, job, job.vector_blob_len());
        let doc_id_write = self.write_doc_id_blob(&names.doc_id_path, job, job.doc_id_blob_len());

        let (vector_outcome, doc_id_outcome) = tokio::join!(vector_write, doc_id_write);
        vector_outcome?;
        doc_id_outcome?;

        Ok(names)
    }

    async fn write_vector_blob<S>(
        &self,
        path: &str,
        job: &SegmentBuildJob<S>,
        total_len: u64,
    ) -> Result<WriteOutcome> {
        if self.repository.supports_multipart() && !self.force_single_stream {
            self.write_vector_blob_multipart(path, job, total_len).await
        } else {
            let mut stream = VectorByteStream::new(job.new_cursor());
            self.repository
                .write_single(path, &mut stream, total_len)
                .await
                .map_err(wrap_upload_failure)
        }
    }

    async fn write_vector_blob_multipart<S>(
        &self,
        path: &str,
        job: &SegmentBuildJob<S>,
        total_len: u64,
    ) -> Result<WriteOutcome> {
        let part_size = self.part_size_bytes.max(1);
        let num_parts = total_len.div_ceil(part_size);
        let mut parts = Vec::with_capacity(num_parts as usize);

        for part_no in 0..num_parts {
            let position = part_no * part_size;
            let size = part_size.min(total_len - position);

            let mut stream = VectorByteStream::bounded(job.new_cursor(), position + size);
            let skipped = stream.skip(position);
            if skipped != position {
                return Err(Error::UploadFailed(format!(
                    "cursor exhausted while positioning part {part_no} at offset {position}"
                )));
            }

            parts.push(BlobPart {
                part_no: part_no as u32,
                size,
                reader: Box::new(stream),
            });
        }

        self.repository
            .write_multipart(path, parts)
            .await
            .map_err(wrap_upload_failure)
    }

    async fn write_doc_id_blob<S>(
        &self,
        path: &str,
        job: &SegmentBuildJob<S>,
        total_len: u64,
    ) -> Result<WriteOutcome> {
        let mut stream = DocIdByteStream::new(job.new_cursor());
        self.repository
            .write_single(path, &mut stream, total_len)
            .await
            .map_err(wrap_upload_failure)
    }

    /// Streams `path` into `sink` through a reusable [`BufferedSink`]
    /// buffer, rejecting a path that doesn't end with
    /// `expected_extension` (the calling engine's artifact suffix, or
    /// any other recognized extension the caller vouches for).
    pub async fn read_from_repository<W: AsyncWrite + Unpin>(
        &self,
        path: &str,
        expected_extension: &str,
        sink: W,
    ) -> Result<u64> {
        reject_unless_extension(path, expected_extension)?;
        let mut reader = self.repository.open_read(path).await?;
        let mut buffered = BufferedSink::new(sink, self.upload_buffer_bytes);
        buffered
            .copy_from(&mut reader)
            .await
            .map_err(|e| Error::DownloadFailed(e.to_string()))
    }
}

fn wrap_upload_failure(err: Error) -> Error {
    match err {
        Error::UploadFailed(_) => err,
        other => Error::UploadFailed(other.to_string()),
    }
}
