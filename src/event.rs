//! Reader notifications.
//!
//! Events are pushed by the read task into an unbounded mpsc channel and
//! consumed by a single receiver, preserving the order in which bytes were
//! processed.
//!
//! ```text
//! Byte source ─► Read task ─► FrameExtractor ─► mpsc::UnboundedSender<ReaderEvent> ─► Events
//! ```

use tokio::sync::mpsc;

use crate::error::MjpegError;
use crate::protocol::Frame;

/// A notification produced by a reader session.
#[derive(Debug)]
pub enum ReaderEvent {
    /// The first frame of the session completed. Fires once per session,
    /// immediately before that frame's `Frame` event.
    Ready,
    /// A frame completed.
    Frame(Frame),
    /// Overflow, invariant violation, or byte source error.
    Error(MjpegError),
    /// The byte source ended or was detached.
    Closed,
}

impl ReaderEvent {
    /// Get the frame carried by this event, if any.
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            ReaderEvent::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// Get the error carried by this event, if any.
    pub fn as_error(&self) -> Option<&MjpegError> {
        match self {
            ReaderEvent::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Sending half, owned by the reader.
pub(crate) type EventSender = mpsc::UnboundedSender<ReaderEvent>;

/// Receiving half of a reader's event stream.
#[derive(Debug)]
pub struct Events {
    rx: mpsc::UnboundedReceiver<ReaderEvent>,
}

impl Events {
    pub(crate) fn channel() -> (EventSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the reader has been dropped and every queued
    /// event has been received.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ReaderEvent> {
        self.rx.try_recv().ok()
    }

    /// Get the underlying receiver.
    pub fn into_inner(self) -> mpsc::UnboundedReceiver<ReaderEvent> {
        self.rx
    }
}
