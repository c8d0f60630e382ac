//! Marker scanner for extracting frames from a byte stream.
//!
//! Implements a two-state machine driven one byte at a time:
//! - `Idle`: the previous byte was not an unresolved `0xFF`
//! - `SawMarkerPrefix`: the previous byte was `0xFF`, waiting for the code
//!
//! Together with the `in_frame` flag this decides whether each byte starts
//! a frame, ends one, or is plain content. Content bytes are copied into the
//! [`FrameBuffer`] unchanged, including every marker other than SOI/EOI.
//! Outside a frame everything is discarded until the next SOI.
//!
//! # Example
//!
//! ```
//! use mjpeg_reader::protocol::{MarkerScanner, ScanEvent};
//!
//! let mut scanner = MarkerScanner::new();
//! let events = scanner.push(&[0xA5, 0xFF, 0xD8, 0x12, 0xFF, 0xD9]);
//!
//! assert_eq!(events.len(), 1);
//! match &events[0] {
//!     ScanEvent::Frame(frame) => assert_eq!(&frame[..], &[0xFF, 0xD8, 0x12, 0xFF, 0xD9]),
//!     ScanEvent::Error(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use bytes::Bytes;

use super::frame_buffer::FrameBuffer;
use super::markers::{Marker, DEFAULT_MAX_FRAME_SIZE, EOI_MARKER, MARKER_PREFIX, SOI_MARKER};
use crate::error::MjpegError;

/// Lookahead state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No pending marker prefix.
    Idle,
    /// Last byte was `0xFF` and has not been classified yet.
    SawMarkerPrefix,
}

/// Outcome of feeding a byte that completed or broke a frame.
#[derive(Debug)]
pub enum ScanEvent {
    /// A complete frame, SOI through EOI inclusive.
    Frame(Bytes),
    /// The current frame was dropped (overflow or invariant violation).
    Error(MjpegError),
}

/// Byte-at-a-time frame extractor.
#[derive(Debug)]
pub struct MarkerScanner {
    /// Accumulated bytes of the current frame.
    buffer: FrameBuffer,
    /// Lookahead state.
    state: ScanState,
    /// Whether an SOI has been seen without its EOI.
    in_frame: bool,
}

impl MarkerScanner {
    /// Create a scanner with the default 4 MiB frame limit.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a scanner with a custom frame limit.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: FrameBuffer::with_capacity(max_frame_size),
            state: ScanState::Idle,
            in_frame: false,
        }
    }

    /// Feed a chunk and collect every event it produces, in order.
    ///
    /// Chunk boundaries carry no meaning: feeding the same bytes in any
    /// split yields the same events.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ScanEvent> {
        chunk
            .iter()
            .filter_map(|&byte| self.consume_byte(byte))
            .collect()
    }

    /// Feed a single byte.
    ///
    /// Returns `Some` when the byte completed a frame or caused the current
    /// frame to be dropped.
    pub fn consume_byte(&mut self, byte: u8) -> Option<ScanEvent> {
        match self.state {
            ScanState::Idle => {
                if byte == MARKER_PREFIX {
                    self.state = ScanState::SawMarkerPrefix;
                    None
                } else if self.in_frame {
                    self.append(&[byte])
                } else {
                    None
                }
            }

            ScanState::SawMarkerPrefix => {
                self.state = ScanState::Idle;
                match Marker::from_code(byte) {
                    Marker::Start => self.on_start(),
                    Marker::End => self.on_end(),
                    other => {
                        if self.in_frame {
                            self.append(&other.to_bytes())
                        } else {
                            None
                        }
                    }
                }
            }
        }
    }

    fn on_start(&mut self) -> Option<ScanEvent> {
        // The buffer only holds data while a frame is open, so a non-empty
        // buffer here means an SOI arrived before the previous frame's EOI.
        let violation = if self.buffer.is_empty() {
            None
        } else {
            let buffered = self.buffer.len();
            tracing::error!(
                "SOI received with {} bytes still buffered, discarding partial frame",
                buffered
            );
            self.buffer.clear();
            Some(ScanEvent::Error(MjpegError::InvariantViolation(format!(
                "start marker received with {} bytes still buffered",
                buffered
            ))))
        };

        self.in_frame = true;
        let overflow = self.append(&SOI_MARKER);
        violation.or(overflow)
    }

    fn on_end(&mut self) -> Option<ScanEvent> {
        if !self.in_frame {
            return None;
        }

        self.in_frame = false;
        if let Some(event) = self.append(&EOI_MARKER) {
            return Some(event);
        }
        if self.buffer.is_empty() {
            return None;
        }

        let frame = self.buffer.snapshot();
        self.buffer.clear();
        Some(ScanEvent::Frame(frame))
    }

    /// Append to the frame, dropping it and resynchronizing on overflow.
    fn append(&mut self, bytes: &[u8]) -> Option<ScanEvent> {
        match self.buffer.append(bytes) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Dropping frame: {}", e);
                self.in_frame = false;
                Some(ScanEvent::Error(e))
            }
        }
    }

    /// Reset to the initial state, discarding any partial frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ScanState::Idle;
        self.in_frame = false;
    }

    /// Get the lookahead state.
    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Check whether a frame is currently open.
    #[inline]
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Get the number of bytes buffered for the open frame.
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Get the configured frame limit.
    #[inline]
    pub fn max_frame_size(&self) -> usize {
        self.buffer.capacity()
    }
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self::new()
    }
}
