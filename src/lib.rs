//! # mjpeg-reader
//!
//! Extracts complete JPEG frames from a continuous MJPEG byte stream.
//!
//! Frames are delimited by the JPEG SOI (`FF D8`) and EOI (`FF D9`)
//! markers. Everything between the two is copied verbatim; bytes outside
//! a frame are discarded.
//!
//! ## Architecture
//!
//! - **Protocol** (sans-io): marker scanner over a fixed-capacity buffer
//! - **Extractor**: per-session state (ready signal, last frame)
//! - **Reader**: attaches to a byte source and pushes events in order
//!
//! ## Example
//!
//! ```ignore
//! use mjpeg_reader::{create_reader, ReaderEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut reader, mut events) = create_reader("/tmp/camera.mjpeg")?;
//!     reader.start()?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ReaderEvent::Ready => println!("first frame arrived"),
//!             ReaderEvent::Frame(frame) => println!("{} bytes", frame.len()),
//!             ReaderEvent::Error(e) => eprintln!("{}", e),
//!             ReaderEvent::Closed => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod transport;

mod extractor;
mod reader;

pub use config::ReaderConfig;
pub use error::{ErrorKind, MjpegError};
pub use event::{Events, ReaderEvent};
pub use extractor::FrameExtractor;
pub use protocol::{Frame, LastFrame};
pub use reader::{create_reader, Reader, ReaderBuilder, READ_BUFFER_SIZE};
pub use transport::{ByteSource, FileSource, StreamSource};
