//! Byte sources a reader can attach to.
//!
//! - [`FileSource`]: a regular file, or a named pipe (FIFO)
//! - [`StreamSource`]: any `AsyncRead` (sockets, child stdout, duplex pipes)
//!
//! Detaching is dropping the stream returned by [`ByteSource::open`], so it
//! can never happen twice.
//!
//! # Example
//!
//! ```ignore
//! use mjpeg_reader::transport::{ByteSource, FileSource};
//!
//! let mut source = FileSource::fifo("/tmp/camera.mjpeg");
//! let stream = source.open()?;
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::AsyncRead;

/// Readable half of an attached byte source.
pub type BoxedByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Something a reader can attach to.
///
/// `open` is called once per `start()`. Chunks, errors, and end-of-stream
/// are all reported through the returned stream.
pub trait ByteSource: Send + 'static {
    /// Open the source for reading.
    fn open(&mut self) -> io::Result<BoxedByteStream>;
}

/// How a [`FileSource`] opens its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only; end of file closes the session.
    File,
    /// Named pipe opened read+write, so opening never waits for a writer
    /// and the pipe does not report end-of-stream between writers.
    Fifo,
}

/// A byte source backed by a path on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    mode: OpenMode,
}

impl FileSource {
    /// Read a regular file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode: OpenMode::File,
        }
    }

    /// Read a named pipe.
    pub fn fifo(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode: OpenMode::Fifo,
        }
    }

    /// Get the path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the open mode.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }
}

impl ByteSource for FileSource {
    fn open(&mut self) -> io::Result<BoxedByteStream> {
        match self.mode {
            OpenMode::File => {
                let file = std::fs::File::open(&self.path)?;
                Ok(Box::pin(tokio::fs::File::from_std(file)))
            }
            OpenMode::Fifo => open_fifo(&self.path),
        }
    }
}

// ============================================================================
// FIFO opening
// ============================================================================

/// Read+write on every unix: the open returns without a writer, and the
/// pipe never reads as closed while we hold the write end.
#[cfg(unix)]
fn open_fifo(path: &Path) -> io::Result<BoxedByteStream> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)?;
    let receiver = tokio::net::unix::pipe::Receiver::from_file(file)?;
    Ok(Box::pin(receiver))
}

#[cfg(not(unix))]
fn open_fifo(path: &Path) -> io::Result<BoxedByteStream> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)?;
    Ok(Box::pin(tokio::fs::File::from_std(file)))
}

/// A one-shot byte source wrapping an existing reader.
pub struct StreamSource<R> {
    inner: Option<R>,
}

impl<R> StreamSource<R>
where
    R: AsyncRead + Send + 'static,
{
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            inner: Some(reader),
        }
    }

    /// Check whether the reader has already been handed out.
    pub fn is_consumed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<R> ByteSource for StreamSource<R>
where
    R: AsyncRead + Send + 'static,
{
    fn open(&mut self) -> io::Result<BoxedByteStream> {
        self.inner
            .take()
            .map(|reader| Box::pin(reader) as BoxedByteStream)
            .ok_or_else(|| io::Error::other("stream source already consumed"))
    }
}
