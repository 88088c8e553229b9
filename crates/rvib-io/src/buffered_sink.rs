use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Wraps a segment output handle with a reusable byte buffer, so that
/// downloading several blobs into the same sink does not reallocate a
/// fresh buffer per blob.
pub struct BufferedSink<W> {
    sink: W,
    buffer: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> BufferedSink<W> {
    /// Wraps `sink`, allocating a reusable buffer of `buffer_size` bytes.
    pub fn new(sink: W, buffer_size: usize) -> Self {
        Self {
            sink,
            buffer: vec![0u8; buffer_size.max(1)],
        }
    }

    /// Copies `source` to the wrapped sink using the reusable buffer,
    /// returning the number of bytes copied.
    pub async fn copy_from<R: AsyncRead + Unpin>(&mut self, source: &mut R) -> io::Result<u64> {
        let mut total = 0u64;
        loop {
            let n = source.read(&mut self.buffer).await?;
            if n == 0 {
                break;
            }
            self.sink.write_all(&self.buffer[..n]).await?;
            total += n as u64;
        }
        self.sink.flush().await?;
        Ok(total)
    }

    /// Unwraps the sink, consuming this adapter.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_source_bytes_into_sink_through_small_buffer() {
        let source_bytes = (0u8..=255).cycle().take(10_000).collect::<Vec<u8>>();
        let mut source = &source_bytes[..];

        let mut sink = BufferedSink::new(Vec::<u8>::new(), 17);
        let copied = sink.copy_from(&mut source).await.unwrap();

        assert_eq!(copied, source_bytes.len() as u64);
        assert_eq!(sink.into_inner(), source_bytes);
    }

    #[tokio::test]
    async fn empty_source_copies_zero_bytes() {
        let mut source: &[u8] = &[];
        let mut sink = BufferedSink::new(Vec::<u8>::new(), 64);
        let copied = sink.copy_from(&mut source).await.unwrap();
        assert_eq!(copied, 0);
        assert!(sink.into_inner().is_empty());
    }
}
