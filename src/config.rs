//! Reader configuration.
//!
//! Configuration can be built in code or parsed from JSON. Field names are
//! camelCase; `maxJpegSize` is accepted as an alias for `maxFrameSize`.
//!
//! # Example
//!
//! ```
//! use mjpeg_reader::ReaderConfig;
//!
//! let config = ReaderConfig::from_json(r#"{"maxFrameSize": 1048576}"#).unwrap();
//! assert_eq!(config.max_frame_size, 1024 * 1024);
//!
//! let defaults = ReaderConfig::from_json("{}").unwrap();
//! assert_eq!(defaults.max_frame_size, 4 * 1024 * 1024);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{MjpegError, Result};
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;

/// Options recognized by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderConfig {
    /// Capacity of the accumulation buffer. Frames larger than this are
    /// dropped with an overflow error. Default: 4 MiB
    #[serde(alias = "maxJpegSize")]
    pub max_frame_size: usize,
}

impl ReaderConfig {
    /// Create a configuration with the given frame limit.
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every option is in range.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 {
            return Err(MjpegError::InvalidConfig(
                "maxFrameSize must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
