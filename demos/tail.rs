//! Tail - log every frame arriving on an MJPEG file or named pipe.
//!
//! This example demonstrates:
//! - Building a reader with a custom frame limit
//! - Consuming the event stream
//! - Reading the last frame on demand
//!
//! # Running
//!
//! ```sh
//! mkfifo /tmp/camera.mjpeg
//! ffmpeg -f v4l2 -i /dev/video0 -f mjpeg -y /tmp/camera.mjpeg &
//! RUST_LOG=debug cargo run --example tail -- /tmp/camera.mjpeg
//! ```
//!
//! Pass `--file` before the path to read a regular file instead of a FIFO.

use std::time::UNIX_EPOCH;

use mjpeg_reader::{FileSource, Reader, ReaderConfig, ReaderEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (regular_file, path) = match args.next() {
        Some(flag) if flag == "--file" => (true, args.next()),
        other => (false, other),
    };
    let path = path.ok_or("usage: tail [--file] <path>")?;

    let config = match std::env::var("MJPEG_READER_CONFIG") {
        Ok(json) => ReaderConfig::from_json(&json)?,
        Err(_) => ReaderConfig::default(),
    };

    let source = if regular_file {
        FileSource::new(&path)
    } else {
        FileSource::fifo(&path)
    };
    let (mut reader, mut events) = Reader::builder().config(config).build(source)?;
    reader.start()?;

    let mut count = 0u64;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ReaderEvent::Ready) => tracing::info!("First frame received"),
                Some(ReaderEvent::Frame(frame)) => {
                    count += 1;
                    let millis = frame
                        .timestamp
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_millis())
                        .unwrap_or(0);
                    tracing::info!("Frame {}: {} bytes at {}", count, frame.len(), millis);
                }
                Some(ReaderEvent::Error(e)) => tracing::warn!("{}", e),
                Some(ReaderEvent::Closed) | None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                reader.stop();
            }
        }
    }

    let last = reader.get_last_frame();
    tracing::info!(
        "Done: {} frames, last frame {} bytes",
        count,
        last.frame.map(|f| f.len()).unwrap_or(0)
    );
    Ok(())
}
