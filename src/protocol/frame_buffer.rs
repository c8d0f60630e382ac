//! Fixed-capacity accumulation buffer for the in-progress frame.
//!
//! Uses a single `bytes::BytesMut` arena allocated once at construction.
//! The arena is never grown: an append that would cross the capacity is
//! rejected and the buffer is emptied so the scanner can resynchronize.
//!
//! Completed frames are copied out with [`FrameBuffer::snapshot`], so the
//! returned `Bytes` never shares storage with the next frame.

use bytes::{Bytes, BytesMut};

use super::markers::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{MjpegError, Result};

/// Buffer holding the bytes of the frame currently being assembled.
#[derive(Debug)]
pub struct FrameBuffer {
    /// Pre-allocated arena; `len()` is the cursor.
    buffer: BytesMut,
    /// Maximum number of bytes a frame may occupy.
    capacity: usize,
}

impl FrameBuffer {
    /// Create a buffer with the default 4 MiB capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a buffer holding at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append bytes to the frame.
    ///
    /// # Errors
    ///
    /// Returns [`MjpegError::Overflow`] if the frame would exceed the
    /// capacity. All accumulated bytes are discarded in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let attempted = self.buffer.len() + bytes.len();
        if attempted > self.capacity {
            self.buffer.clear();
            return Err(MjpegError::Overflow {
                attempted,
                capacity: self.capacity,
            });
        }

        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Copy the accumulated bytes into an independently owned `Bytes`.
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer)
    }

    /// Get the accumulated bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the number of accumulated bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all accumulated bytes. Idempotent.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
