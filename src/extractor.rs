//! Session core: turns chunks into reader events.
//!
//! [`FrameExtractor`] owns the marker scanner, the "first frame seen" flag
//! and the last completed frame. It performs no I/O, so it can be driven
//! directly by callers that already have the bytes, or by [`Reader`]'s read
//! task.
//!
//! [`Reader`]: crate::Reader
//!
//! # Example
//!
//! ```
//! use mjpeg_reader::{FrameExtractor, ReaderEvent};
//!
//! let mut extractor = FrameExtractor::new();
//! let events = extractor.push(&[0xFF, 0xD8, 0x12, 0x34, 0x56, 0xFF, 0xD9]);
//!
//! assert!(matches!(events[0], ReaderEvent::Ready));
//! assert!(matches!(events[1], ReaderEvent::Frame(_)));
//! assert!(extractor.last_frame().frame.is_some());
//! ```

use crate::config::ReaderConfig;
use crate::event::ReaderEvent;
use crate::protocol::{Frame, LastFrame, MarkerScanner, ScanEvent, DEFAULT_MAX_FRAME_SIZE};

/// Frame extraction state for one session.
#[derive(Debug)]
pub struct FrameExtractor {
    scanner: MarkerScanner,
    last_frame: LastFrame,
    first_frame_seen: bool,
}

impl FrameExtractor {
    /// Create an extractor with the default 4 MiB frame limit.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create an extractor with a custom frame limit.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            scanner: MarkerScanner::with_max_frame_size(max_frame_size),
            last_frame: LastFrame::default(),
            first_frame_seen: false,
        }
    }

    /// Create an extractor from a configuration.
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::with_max_frame_size(config.max_frame_size)
    }

    /// Feed a chunk and collect the resulting events.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ReaderEvent> {
        let mut events = Vec::new();
        self.push_with(chunk, |event| events.push(event));
        events
    }

    /// Feed a chunk, handing each event to `emit` as soon as it is produced.
    ///
    /// The whole chunk is processed before returning.
    pub fn push_with<F>(&mut self, chunk: &[u8], mut emit: F)
    where
        F: FnMut(ReaderEvent),
    {
        for &byte in chunk {
            match self.scanner.consume_byte(byte) {
                None => {}
                Some(ScanEvent::Frame(data)) => {
                    let frame = Frame::new(data);
                    self.last_frame = LastFrame::from(&frame);
                    tracing::trace!("Frame complete: {} bytes", frame.len());

                    if !self.first_frame_seen {
                        self.first_frame_seen = true;
                        emit(ReaderEvent::Ready);
                    }
                    emit(ReaderEvent::Frame(frame));
                }
                Some(ScanEvent::Error(e)) => emit(ReaderEvent::Error(e)),
            }
        }
    }

    /// Prepare for a new session: forget the last frame, re-arm the ready
    /// signal, and discard any partial frame.
    pub fn begin_session(&mut self) {
        self.last_frame = LastFrame::default();
        self.first_frame_seen = false;
        self.scanner.reset();
    }

    /// Discard any partial frame. The last completed frame is kept.
    pub fn reset_parser(&mut self) {
        self.scanner.reset();
    }

    /// Get a snapshot of the most recently completed frame.
    ///
    /// The returned bytes never change, however much data is fed afterwards.
    pub fn last_frame(&self) -> LastFrame {
        self.last_frame.clone()
    }

    /// Check whether a frame has completed in this session.
    #[inline]
    pub fn first_frame_seen(&self) -> bool {
        self.first_frame_seen
    }

    /// Get the underlying scanner.
    #[inline]
    pub fn scanner(&self) -> &MarkerScanner {
        &self.scanner
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}
