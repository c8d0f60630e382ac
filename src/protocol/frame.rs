//! Completed frame with its capture time.
//!
//! Uses `bytes::Bytes` so a frame can be handed to several consumers
//! without copying. The bytes are always copied out of the accumulation
//! buffer first, so they stay valid while the next frame is assembled.
//!
//! # Example
//!
//! ```
//! use mjpeg_reader::protocol::Frame;
//! use bytes::Bytes;
//!
//! let frame = Frame::new(Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]));
//!
//! assert_eq!(frame.len(), 4);
//! assert!(frame.is_well_formed());
//! ```

use std::time::SystemTime;

use bytes::Bytes;

use super::markers::{EOI_MARKER, SOI_MARKER};

/// A complete JPEG frame, SOI through EOI inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame bytes.
    pub data: Bytes,
    /// Time the EOI marker was processed.
    pub timestamp: SystemTime,
}

impl Frame {
    /// Create a frame stamped with the current time.
    pub fn new(data: Bytes) -> Self {
        Self::with_timestamp(data, SystemTime::now())
    }

    /// Create a frame with an explicit timestamp.
    pub fn with_timestamp(data: Bytes, timestamp: SystemTime) -> Self {
        Self { data, timestamp }
    }

    /// Get a reference to the frame bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a clone of the frame as Bytes (cheap, no copy).
    #[inline]
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Get the frame length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the frame holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check that the frame starts with SOI and ends with EOI.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() >= SOI_MARKER.len() + EOI_MARKER.len()
            && self.data.starts_with(&SOI_MARKER)
            && self.data.ends_with(&EOI_MARKER)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// The most recently completed frame of a session, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastFrame {
    /// Frame bytes.
    pub frame: Option<Bytes>,
    /// Completion time of `frame`.
    pub timestamp: Option<SystemTime>,
}

impl LastFrame {
    /// Check whether a frame has completed yet.
    #[inline]
    pub fn is_some(&self) -> bool {
        self.frame.is_some()
    }
}

impl From<&Frame> for LastFrame {
    fn from(frame: &Frame) -> Self {
        Self {
            frame: Some(frame.data.clone()),
            timestamp: Some(frame.timestamp),
        }
    }
}
