use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rvib_core::{Error, Result};
use tokio::io::{AsyncReadExt, AsyncRead};
use tokio::sync::Mutex;

use crate::blob_repository::{BlobPart, BlobRepository, WriteOutcome};

/// An in-memory [`BlobRepository`] double. Not a production driver —
/// useful for exercising the accessor and orchestrator without a real
/// object store.
pub struct MemoryRepository {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    supports_multipart: bool,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryRepository {
    /// Builds an empty repository. `supports_multipart` controls which
    /// upload path [`crate::RepositoryAccessor`] selects.
    pub fn new(supports_multipart: bool) -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            supports_multipart,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Snapshot of a stored blob's bytes, for assertions.
    pub async fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().await.get(path).cloned()
    }

    /// Makes every subsequent `write_single`/`write_multipart` call fail,
    /// regardless of the bytes offered.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent `open_read` call fail, regardless of
    /// whether the requested blob exists.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobRepository for MemoryRepository {
    fn supports_multipart(&self) -> bool {
        self.supports_multipart
    }

    async fn write_single(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        len: u64,
    ) -> Result<WriteOutcome> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::UploadFailed(format!("{path}: injected write failure")));
        }
        let mut buf = vec![0u8; len as usize];
        reader
            .read_exact(&mut buf)
            .await
            .map_err(|e| Error::UploadFailed(format!("{path}: short read: {e}")))?;
        self.blobs.lock().await.insert(path.to_string(), buf);
        Ok(WriteOutcome {
            bytes_written: len,
            parts: 1,
        })
    }

    async fn write_multipart(&self, path: &str, mut parts: Vec<BlobPart>) -> Result<WriteOutcome> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::UploadFailed(format!("{path}: injected write failure")));
        }
        parts.sort_by_key(|p| p.part_no);
        let total_len: u64 = parts.iter().map(|p| p.size).sum();
        let part_count = parts.len() as u32;

        let mut assembled = vec![0u8; total_len as usize];
        let mut offset = 0usize;
        for part in &mut parts {
            let size = part.size as usize;
            let slice = &mut assembled[offset..offset + size];
            part.reader.read_exact(slice).await.map_err(|e| {
                Error::UploadFailed(format!("{path}: part {} short read: {e}", part.part_no))
            })?;
            offset += size;
        }

        self.blobs.lock().await.insert(path.to_string(), assembled);
        Ok(WriteOutcome {
            bytes_written: total_len,
            parts: part_count,
        })
    }

    async fn open_read(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::DownloadFailed(format!("{path}: injected read failure")));
        }
        let bytes = self
            .blobs
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| Error::DownloadFailed(format!("no such blob: {path}")))?;
        Ok(Box::new(std::io::Cursor::new(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_single_stream_write() {
        let repo = MemoryRepository::new(false);
        let payload = b"hello world".to_vec();
        let mut reader: &[u8] = &payload;
        repo.write_single("a.knnvec", &mut reader, payload.len() as u64)
            .await
            .unwrap();
        assert_eq!(repo.blob("a.knnvec").await, Some(payload));
    }

    #[tokio::test]
    async fn assembles_multipart_writes_in_part_order() {
        let repo = MemoryRepository::new(true);
        let parts = vec![
            BlobPart {
                part_no: 1,
                size: 2,
                reader: Box::new(std::io::Cursor::new(b"BB".to_vec())),
            },
            BlobPart {
                part_no: 0,
                size: 4,
                reader: Box::new(std::io::Cursor::new(b"AAAA".to_vec())),
            },
        ];
        repo.write_multipart("a.knnvec", parts).await.unwrap();
        assert_eq!(repo.blob("a.knnvec").await, Some(b"AAAABB".to_vec()));
    }

    #[tokio::test]
    async fn open_read_streams_stored_bytes() {
        let repo = MemoryRepository::new(false);
        let payload = b"payload".to_vec();
        let mut reader: &[u8] = &payload;
        repo.write_single("a.knndid", &mut reader, payload.len() as u64)
            .await
            .unwrap();

        let mut source = repo.open_read("a.knndid").await.unwrap();
        let mut out = Vec::new();
        tokio::io::copy(&mut source, &mut out).await.unwrap();
        assert_eq!(out, payload);
    }
}
