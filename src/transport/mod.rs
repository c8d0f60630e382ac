//! Transport module - byte sources the reader attaches to.
//!
//! Provides abstraction over:
//! - Regular files and named pipes (FIFOs)
//! - Arbitrary async readers (sockets, child process stdout)

mod source;

pub use source::{BoxedByteStream, ByteSource, FileSource, OpenMode, StreamSource};
