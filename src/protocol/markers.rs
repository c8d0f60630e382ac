//! JPEG marker constants.
//!
//! Every JPEG marker is two bytes on the wire:
//! ```text
//! ┌────────┬────────┐
//! │ Prefix │ Code   │
//! │ 0xFF   │ 1 byte │
//! └────────┴────────┘
//! ```
//!
//! Only SOI and EOI delimit frames; every other code is frame content.
//!
//! References:
//! - ITU Recommendation T.81, Annex B.1.1.3
//! - W3C JPEG JFIF

/// First byte of every marker.
pub const MARKER_PREFIX: u8 = 0xFF;

/// Start Of Image marker code.
pub const SOI: u8 = 0xD8;

/// End Of Image marker code.
pub const EOI: u8 = 0xD9;

/// Start marker as it appears on the wire.
pub const SOI_MARKER: [u8; 2] = [MARKER_PREFIX, SOI];

/// End marker as it appears on the wire.
pub const EOI_MARKER: [u8; 2] = [MARKER_PREFIX, EOI];

/// Default maximum frame size (4 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Classification of the byte following a marker prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `FF D8`.
    Start,
    /// `FF D9`.
    End,
    /// Any other code, including a second `FF`.
    Other(u8),
}

impl Marker {
    /// Classify a marker code.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match code {
            SOI => Marker::Start,
            EOI => Marker::End,
            other => Marker::Other(other),
        }
    }

    /// The code byte that follows the prefix.
    #[inline]
    pub fn code(&self) -> u8 {
        match self {
            Marker::Start => SOI,
            Marker::End => EOI,
            Marker::Other(code) => *code,
        }
    }

    /// The full two-byte wire form.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 2] {
        [MARKER_PREFIX, self.code()]
    }
}
