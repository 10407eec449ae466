// Bounded capture of runner output
//
// Submitted code can print without limit until the wall-clock timeout.
// stdout keeps its tail (the result line is written last), stderr keeps its
// head (the first error line is reported).

use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Bytes of stdout kept per evaluation
pub const STDOUT_CAPTURE_BYTES: usize = 16 * 1024 * 1024;
/// Bytes of stderr kept per evaluation
pub const STDERR_CAPTURE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    Head,
    Tail,
}

#[derive(Debug)]
pub struct CappedBuffer {
    buf: VecDeque<u8>,
    cap: usize,
    keep: Keep,
    dropped: usize,
}

impl CappedBuffer {
    /// Keep the first `cap` bytes
    pub fn head(cap: usize) -> Self {
        Self::new(cap, Keep::Head)
    }

    /// Keep the last `cap` bytes
    pub fn tail(cap: usize) -> Self {
        Self::new(cap, Keep::Tail)
    }

    fn new(cap: usize, keep: Keep) -> Self {
        Self {
            buf: VecDeque::new(),
            cap,
            keep,
            dropped: 0,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        match self.keep {
            Keep::Head => {
                let room = self.cap.saturating_sub(self.buf.len());
                let taken = room.min(bytes.len());
                self.buf.extend(&bytes[..taken]);
                self.dropped += bytes.len() - taken;
            }
            Keep::Tail => {
                let bytes = if bytes.len() > self.cap {
                    self.dropped += bytes.len() - self.cap;
                    &bytes[bytes.len() - self.cap..]
                } else {
                    bytes
                };
                let overflow = (self.buf.len() + bytes.len()).saturating_sub(self.cap);
                if overflow > 0 {
                    self.buf.drain(..overflow);
                    self.dropped += overflow;
                }
                self.buf.extend(bytes);
            }
        }
    }

    /// Bytes discarded so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        let bytes: Vec<u8> = self.buf.into();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Drain `reader` to EOF, keeping at most the buffer's cap
pub async fn read_capped<R>(mut reader: R, mut buffer: CappedBuffer) -> std::io::Result<CappedBuffer>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(buffer);
        }
        buffer.push(&chunk[..n]);
    }
}
