use std::pin::Pin;
use std::task::{Context, Poll};

use rvib_core::VectorCursor;
use tokio::io::{AsyncRead, ReadBuf};

/// Adapts a [`VectorCursor`] into a sequential stream of little-endian
/// doc ids, 4 bytes each, in cursor order.
///
/// Unlike [`crate::VectorByteStream`] this stream is never split into
/// parts or skipped into the middle — the doc-id blob is always uploaded
/// as a single sequential pass.
pub struct DocIdByteStream {
    cursor: Box<dyn VectorCursor>,
    pending: [u8; 4],
    pending_len: usize,
    pending_pos: usize,
    done: bool,
}

impl DocIdByteStream {
    /// Wraps `cursor`, presenting `total_live_docs() * 4` bytes.
    pub fn new(cursor: Box<dyn VectorCursor>) -> Self {
        Self {
            cursor,
            pending: [0; 4],
            pending_len: 0,
            pending_pos: 0,
            done: false,
        }
    }

    /// Total bytes this stream will yield, derived from the wrapped
    /// cursor's remaining document count at construction time.
    pub fn total_len(&self) -> u64 {
        self.cursor.total_live_docs() * 4
    }

    fn fill(&mut self, buf: &mut ReadBuf<'_>) {
        while buf.remaining() > 0 {
            if self.pending_pos == self.pending_len {
                if self.done {
                    break;
                }
                match self.cursor.next() {
                    Some(doc_id) => {
                        self.pending = doc_id.to_le_bytes();
                        self.pending_len = 4;
                        self.pending_pos = 0;
                    }
                    None => {
                        self.done = true;
                        break;
                    }
                }
            }

            let avail = self.pending_len - self.pending_pos;
            let want = buf.remaining().min(avail);
            buf.put_slice(&self.pending[self.pending_pos..self.pending_pos + want]);
            self.pending_pos += want;
        }
    }
}

impl AsyncRead for DocIdByteStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.fill(buf);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedVectorCursor;
    use tokio::io::AsyncReadExt;

    async fn read_all(stream: &mut DocIdByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn emits_four_little_endian_bytes_per_doc_in_order() {
        let vectors = vec![vec![0u8; 4]; 5];
        let cursor = Box::new(FixedVectorCursor::new(vectors));
        let mut stream = DocIdByteStream::new(cursor);
        assert_eq!(stream.total_len(), 20);

        let bytes = read_all(&mut stream).await;
        let expected: Vec<u8> = (0u32..5).flat_map(|i| i.to_le_bytes()).collect();
        assert_eq!(bytes, expected);
    }

    #[tokio::test]
    async fn empty_cursor_yields_empty_stream() {
        let cursor = Box::new(FixedVectorCursor::new(Vec::new()));
        let mut stream = DocIdByteStream::new(cursor);
        assert_eq!(stream.total_len(), 0);
        assert_eq!(read_all(&mut stream).await, Vec::<u8>::new());
    }
}
