//! Transport abstractions for the agent connection
//!
//! Provides ChunkReader/ReplyWriter traits so the connection loop can run
//! over a TCP socket or a scripted transport in tests, plus the read loop
//! that turns raw chunks into frames.

use crate::frame::FrameAssembler;
use aiwolf_core::{Result, WolfError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Size of a single socket read
pub const READ_BUFFER_SIZE: usize = 8192;

/// Trait for reading raw chunks from a transport
#[async_trait]
pub trait ChunkReader: Send {
    /// Read whatever is available; an empty chunk means nothing arrived
    async fn read_chunk(&mut self) -> Result<Vec<u8>>;
}

/// Trait for writing reply lines to a transport
#[async_trait]
pub trait ReplyWriter: Send {
    /// Write one encoded reply (newline already appended)
    async fn write_reply(&mut self, data: &[u8]) -> Result<()>;

    /// Close the write side
    async fn close(&mut self) -> Result<()>;
}

/// Reader over any async byte stream, with a per-read timeout
pub struct StreamReader<R> {
    inner: R,
    read_timeout: Duration,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> StreamReader<R> {
    pub fn new(inner: R, read_timeout: Duration) -> Self {
        Self {
            inner,
            read_timeout,
            buf: vec![0u8; READ_BUFFER_SIZE],
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ChunkReader for StreamReader<R> {
    async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let n = tokio::time::timeout(self.read_timeout, self.inner.read(&mut self.buf))
            .await
            .map_err(|_| WolfError::Timeout(self.read_timeout))??;
        Ok(self.buf[..n].to_vec())
    }
}

/// Writer over any async byte stream
pub struct StreamWriter<W>(pub W);

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ReplyWriter for StreamWriter<W> {
    async fn write_reply(&mut self, data: &[u8]) -> Result<()> {
        self.0
            .write_all(data)
            .await
            .map_err(|e| WolfError::Io(format!("Reply write failed: {}", e)))?;

        // Flush to ensure the server sees the reply before our next read
        self.0
            .flush()
            .await
            .map_err(|e| WolfError::Io(format!("Reply flush failed: {}", e)))?;

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.0
            .shutdown()
            .await
            .map_err(|e| WolfError::Io(format!("Shutdown failed: {}", e)))
    }
}

/// How long to keep polling a quiet socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive empty reads tolerated before giving up
    pub max_empty_reads: u32,
    /// Wait after the first empty read; doubles after each further one
    pub initial_backoff: Duration,
    /// Upper bound for a single wait
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_empty_reads: 10,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No waiting between empty reads
    pub fn immediate(max_empty_reads: u32) -> Self {
        Self {
            max_empty_reads,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay after the `attempt`-th consecutive empty read (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// Read until the assembler yields a frame
///
/// Returns `Ok(None)` when the retry budget runs out with nothing buffered,
/// which is how a peer that closed between frames looks. Running out in the
/// middle of a frame is a broken connection.
pub async fn read_frame<R>(
    reader: &mut R,
    assembler: &mut dyn FrameAssembler,
    policy: &RetryPolicy,
) -> Result<Option<String>>
where
    R: ChunkReader + ?Sized,
{
    let mut empty_reads = 0u32;

    loop {
        let chunk = reader.read_chunk().await?;

        if chunk.is_empty() {
            empty_reads += 1;
            if empty_reads > policy.max_empty_reads {
                let buffered = assembler.buffered();
                if buffered == 0 {
                    debug!("No data after {} empty reads, treating as end of stream", empty_reads);
                    return Ok(None);
                }
                return Err(WolfError::ConnectionBroken {
                    empty_reads,
                    buffered,
                });
            }

            let delay = policy.backoff(empty_reads);
            warn!(
                "Empty read {}/{}, retrying in {:?}",
                empty_reads, policy.max_empty_reads, delay
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        empty_reads = 0;
        assembler.push(&chunk)?;

        if let Some(frame) = assembler.take_frame() {
            let preview: String = frame.chars().take(200).collect();
            debug!("[Server→Agent] len={} json={}", frame.len(), preview.trim_end());
            return Ok(Some(frame));
        }
    }
}
