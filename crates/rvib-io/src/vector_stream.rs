use std::pin::Pin;
use std::task::{Context, Poll};

use rvib_core::VectorCursor;
use tokio::io::{AsyncRead, ReadBuf};

/// Adapts a [`VectorCursor`] into a contiguous byte stream of packed
/// vector payloads, in cursor order.
///
/// Supports bounded length (for multi-part upload part suppliers) and
/// forward `skip`, both required because the underlying cursor is
/// forward-only and non-restartable: a stream can only be built once
/// per cursor, so callers that need several passes go back through a
/// `CursorFactory` rather than rewinding a stream.
///
/// All work done per poll is in-memory copying, so reads never actually
/// suspend; this still implements `AsyncRead` rather than the blocking
/// `Read` trait so it composes directly with the repository layer's
/// upload plumbing.
pub struct VectorByteStream {
    cursor: Box<dyn VectorCursor>,
    /// Bytes not yet delivered to a caller, including whatever sits in
    /// `pending`.
    remaining: u64,
    /// Undelivered tail of the most recently fetched vector.
    pending: Vec<u8>,
    pending_pos: usize,
}

impl VectorByteStream {
    /// Wraps `cursor`, presenting its entire vector payload
    /// (`total_live_docs() * bytes_per_vector()` bytes).
    pub fn new(cursor: Box<dyn VectorCursor>) -> Self {
        let remaining = cursor.total_live_docs() * cursor.bytes_per_vector() as u64;
        Self {
            cursor,
            remaining,
            pending: Vec::new(),
            pending_pos: 0,
        }
    }

    /// Wraps `cursor`, but caps the readable length at `limit` bytes —
    /// used when building one multi-part upload part.
    pub fn bounded(cursor: Box<dyn VectorCursor>, limit: u64) -> Self {
        let mut stream = Self::new(cursor);
        stream.remaining = stream.remaining.min(limit);
        stream
    }

    /// Total bytes this stream will still yield.
    pub fn remaining_len(&self) -> u64 {
        self.remaining
    }

    fn pending_slice(&self) -> &[u8] {
        &self.pending[self.pending_pos..]
    }

    /// Advances the stream by `n` bytes without delivering them to a
    /// caller: whole vectors are skipped via `next()`, and any remainder
    /// is carved out of the following vector and held for the next
    /// `read`.
    ///
    /// Returns the number of bytes actually skipped, which is less than
    /// `n` only if the cursor is exhausted first.
    pub fn skip(&mut self, mut n: u64) -> u64 {
        let mut skipped = 0u64;

        if !self.pending_slice().is_empty() {
            let avail = self.pending_slice().len() as u64;
            let take = avail.min(n);
            self.pending_pos += take as usize;
            self.remaining -= take;
            n -= take;
            skipped += take;
        }

        let bpv = self.cursor.bytes_per_vector() as u64;
        if bpv == 0 {
            return skipped;
        }

        let whole_vectors = n / bpv;
        for _ in 0..whole_vectors {
            if self.cursor.next().is_none() {
                return skipped;
            }
            self.remaining = self.remaining.saturating_sub(bpv);
            skipped += bpv;
            n -= bpv;
        }

        if n > 0 {
            if self.cursor.next().is_none() {
                return skipped;
            }
            let full = self.cursor.current_vector();
            let take = (n as usize).min(full.len());
            self.remaining = self.remaining.saturating_sub(take as u64);
            skipped += take as u64;
            self.pending = full[take..].to_vec();
            self.pending_pos = 0;
        }

        skipped
    }

    fn fill(&mut self, buf: &mut ReadBuf<'_>) {
        while buf.remaining() > 0 && self.remaining > 0 {
            if self.pending_slice().is_empty() {
                match self.cursor.next() {
                    Some(_doc_id) => {
                        self.pending = self.cursor.current_vector().to_vec();
                        self.pending_pos = 0;
                    }
                    None => break,
                }
            }

            let avail = self.pending_slice().len();
            let want = buf.remaining().min(avail).min(self.remaining as usize);
            buf.put_slice(&self.pending_slice()[..want]);
            self.pending_pos += want;
            self.remaining -= want as u64;
        }
    }
}

impl AsyncRead for VectorByteStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.fill(buf);
        Poll::Ready(Ok(()))
    }
}
