//! Protocol module - JPEG markers, frame scanning, and frame types.
//!
//! This module implements the MJPEG framing layer:
//! - SOI/EOI marker constants
//! - Fixed-capacity accumulation buffer
//! - Byte-at-a-time marker scanner
//! - Frame struct with capture timestamp

mod frame;
mod frame_buffer;
mod markers;
mod scanner;

pub use frame::{Frame, LastFrame};
pub use frame_buffer::FrameBuffer;
pub use markers::{
    Marker, DEFAULT_MAX_FRAME_SIZE, EOI, EOI_MARKER, MARKER_PREFIX, SOI, SOI_MARKER,
};
pub use scanner::{MarkerScanner, ScanEvent, ScanState};
