//! Reader builder and session lifecycle.
//!
//! The [`ReaderBuilder`] provides a fluent API for configuring the reader.
//! The [`Reader`] manages the lifecycle of one byte source attachment:
//! 1. `start()` opens the source and spawns the read task
//! 2. The read task feeds every chunk through the [`FrameExtractor`]
//! 3. Events are pushed to the [`Events`] stream in order
//! 4. `stop()` (or end of stream) detaches
//!
//! Every entry point, including chunk delivery from the read task, goes
//! through one mutex per reader, so a chunk is always processed in full
//! before `stop()` or `get_last_frame()` observe the state.
//!
//! # Example
//!
//! ```ignore
//! use mjpeg_reader::{FileSource, Reader, ReaderEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut reader, mut events) = Reader::builder()
//!         .max_frame_size(1024 * 1024)
//!         .build(FileSource::fifo("/tmp/camera.mjpeg"))?;
//!
//!     reader.start()?;
//!     while let Some(event) = events.recv().await {
//!         if let ReaderEvent::Frame(frame) = event {
//!             println!("frame: {} bytes", frame.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

use crate::config::ReaderConfig;
use crate::error::{MjpegError, Result};
use crate::event::{EventSender, Events, ReaderEvent};
use crate::extractor::FrameExtractor;
use crate::protocol::LastFrame;
use crate::transport::{BoxedByteStream, ByteSource, FileSource};

/// Size of the buffer each read from the source fills.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Builder for configuring and creating a reader.
#[derive(Debug, Clone, Default)]
pub struct ReaderBuilder {
    config: ReaderConfig,
}

impl ReaderBuilder {
    /// Create a new reader builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum frame size.
    ///
    /// Frames larger than this are dropped with an overflow error.
    /// Default: 4 MiB
    pub fn max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.config.max_frame_size = max_frame_size;
        self
    }

    /// Build a reader for `source`.
    ///
    /// The reader is created detached; call [`Reader::start`] to attach.
    pub fn build<S: ByteSource>(self, source: S) -> Result<(Reader, Events)> {
        Reader::new(source, self.config)
    }
}

/// State shared between the reader and its read task.
#[derive(Debug)]
struct Session {
    extractor: FrameExtractor,
    /// Incremented on every attach and detach; a read task only acts while
    /// its own id is current.
    id: u64,
    attached: bool,
}

/// Extracts JPEG frames from a byte source.
pub struct Reader {
    source: Box<dyn ByteSource>,
    session: Arc<Mutex<Session>>,
    events: EventSender,
    task: Option<JoinHandle<()>>,
    config: ReaderConfig,
}

impl Reader {
    /// Create a new reader builder.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    /// Create a detached reader and its event stream.
    pub fn new<S: ByteSource>(source: S, config: ReaderConfig) -> Result<(Self, Events)> {
        config.validate()?;

        let (events, rx) = Events::channel();
        let session = Session {
            extractor: FrameExtractor::from_config(&config),
            id: 0,
            attached: false,
        };

        let reader = Self {
            source: Box::new(source),
            session: Arc::new(Mutex::new(session)),
            events,
            task: None,
            config,
        };
        Ok((reader, rx))
    }

    /// Attach to the byte source and start extracting frames.
    ///
    /// Clears the last frame and re-arms the `Ready` event. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`MjpegError::AlreadyActive`] if already attached; nothing changes.
    /// - [`MjpegError::Source`] if the source cannot be opened.
    pub fn start(&mut self) -> Result<()> {
        let mut session = lock(&self.session);
        if session.attached {
            return Err(MjpegError::AlreadyActive);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(std::io::Error::other)?;
        let stream = self.source.open()?;

        session.extractor.begin_session();
        session.id += 1;
        session.attached = true;
        let id = session.id;
        drop(session);

        if let Some(stale) = self.task.take() {
            stale.abort();
        }
        self.task = Some(runtime.spawn(read_loop(
            stream,
            self.session.clone(),
            self.events.clone(),
            id,
        )));

        tracing::debug!("Reader attached (session {})", id);
        Ok(())
    }

    /// Detach from the byte source. Safe to call any number of times.
    ///
    /// Any partial frame is discarded. Emits `Closed` if a source was
    /// actually detached.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let mut session = lock(&self.session);
        session.extractor.reset_parser();
        if !session.attached {
            return;
        }

        session.attached = false;
        session.id += 1;
        tracing::debug!("Reader detached");
        let _ = self.events.send(ReaderEvent::Closed);
    }

    /// Get the most recently completed frame and its timestamp.
    ///
    /// The returned bytes are an independent snapshot.
    pub fn get_last_frame(&self) -> LastFrame {
        lock(&self.session).extractor.last_frame()
    }

    /// Check whether a byte source is attached.
    pub fn is_active(&self) -> bool {
        lock(&self.session).attached
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Create a reader for the named pipe at `path` with default configuration.
pub fn create_reader(path: impl AsRef<Path>) -> Result<(Reader, Events)> {
    Reader::new(FileSource::fifo(path), ReaderConfig::default())
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read chunks until end of stream, error, or detach.
async fn read_loop(
    mut stream: BoxedByteStream,
    session: Arc<Mutex<Session>>,
    events: EventSender,
    id: u64,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let result = stream.read(&mut buf).await;

        let mut state = lock(&session);
        if state.id != id || !state.attached {
            tracing::debug!("Discarding read from detached session {}", id);
            return;
        }

        match result {
            Ok(0) => {
                tracing::debug!("Byte source closed (session {})", id);
                state.attached = false;
                let _ = events.send(ReaderEvent::Closed);
                return;
            }
            Ok(n) => {
                state.extractor.push_with(&buf[..n], |event| {
                    let _ = events.send(event);
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::error!("Read loop error: {}", e);
                state.attached = false;
                let _ = events.send(ReaderEvent::Error(MjpegError::Source(e)));
                let _ = events.send(ReaderEvent::Closed);
                return;
            }
        }
    }
}
