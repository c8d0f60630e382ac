//! Integration tests for mjpeg-reader.
//!
//! These tests drive a `Reader` attached to in-memory pipes and files and
//! check the events it publishes.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

use mjpeg_reader::transport::BoxedByteStream;
use mjpeg_reader::{
    ByteSource, ErrorKind, Events, FileSource, MjpegError, Reader, ReaderEvent, StreamSource,
};
use tokio::io::{AsyncRead, AsyncWriteExt, DuplexStream, ReadBuf};

const FRAME_A: &[u8] = &[0xFF, 0xD8, 0x12, 0x34, 0x56, 0xFF, 0xD9];
const FRAME_B: &[u8] = &[0xFF, 0xD8, 0x9E, 0xC5, 0xFF, 0xD9];
const GARBAGE: &[u8] = &[0xA5, 0x3C, 0x96];

/// Wait for the next event, failing the test instead of hanging.
async fn next_event(events: &mut Events) -> ReaderEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream ended")
}

async fn expect_frame(events: &mut Events) -> Vec<u8> {
    match next_event(events).await {
        ReaderEvent::Frame(frame) => frame.data().to_vec(),
        other => panic!("expected frame, got {:?}", other),
    }
}

async fn expect_ready(events: &mut Events) {
    match next_event(events).await {
        ReaderEvent::Ready => {}
        other => panic!("expected ready, got {:?}", other),
    }
}

async fn expect_closed(events: &mut Events) {
    match next_event(events).await {
        ReaderEvent::Closed => {}
        other => panic!("expected closed, got {:?}", other),
    }
}

fn duplex_reader(max_frame_size: usize) -> (Reader, Events, DuplexStream) {
    let (client, server) = tokio::io::duplex(1024);
    let (reader, events) = Reader::builder()
        .max_frame_size(max_frame_size)
        .build(StreamSource::new(client))
        .unwrap();
    (reader, events, server)
}

/// Hands out a fresh pipe on every `open()`.
struct QueueSource {
    streams: VecDeque<DuplexStream>,
}

impl ByteSource for QueueSource {
    fn open(&mut self) -> io::Result<BoxedByteStream> {
        self.streams
            .pop_front()
            .map(|s| Box::pin(s) as BoxedByteStream)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no more streams"))
    }
}

/// Fails every read.
struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::other("fake error")))
    }
}

/// Test a single frame: ready first, then the exact bytes.
#[tokio::test]
async fn test_successful_read() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(FRAME_A).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);

    reader.stop();
    expect_closed(&mut events).await;
}

/// Test that markers other than SOI/EOI are frame content.
#[tokio::test]
async fn test_read_with_other_markers() {
    let input = [0xFF, 0xD8, 0xFF, 0x00, 0xFF, 0xFE, 0xFF, 0xD9];
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(&input).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, input);
    reader.stop();
}

/// Test get_last_frame() once the first frame is ready.
#[tokio::test]
async fn test_get_last_frame() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    let start = SystemTime::now();
    reader.start().unwrap();
    assert!(reader.get_last_frame().frame.is_none());

    writer.write_all(FRAME_A).await.unwrap();
    expect_ready(&mut events).await;
    let end = SystemTime::now();

    let last = reader.get_last_frame();
    assert_eq!(last.frame.as_deref(), Some(FRAME_A));
    let timestamp = last.timestamp.unwrap();
    assert!(timestamp >= start);
    assert!(timestamp <= end);
    reader.stop();
}

/// Test that the snapshot survives later accumulation.
#[tokio::test]
async fn test_last_frame_unaffected_by_next_frame() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(FRAME_A).await.unwrap();
    expect_ready(&mut events).await;
    expect_frame(&mut events).await;
    let snapshot = reader.get_last_frame();

    // Start a longer frame that reuses the accumulation buffer
    writer.write_all(&[0xFF, 0xD8, 0, 0, 0, 0, 0, 0, 0, 0]).await.unwrap();
    writer.write_all(FRAME_B).await.unwrap();
    let invariant = next_event(&mut events).await;
    assert_eq!(
        invariant.as_error().map(MjpegError::kind),
        Some(ErrorKind::InvariantViolation)
    );
    assert_eq!(expect_frame(&mut events).await, FRAME_B);

    assert_eq!(snapshot.frame.as_deref(), Some(FRAME_A));
    assert_eq!(reader.get_last_frame().frame.as_deref(), Some(FRAME_B));
    reader.stop();
}

/// Test that bytes before the first SOI are discarded.
#[tokio::test]
async fn test_ignore_data_before_soi() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(GARBAGE).await.unwrap();
    writer.write_all(FRAME_A).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);
    reader.stop();
    expect_closed(&mut events).await;
    assert!(events.try_recv().is_none());
}

/// Test that bytes between EOI and the next SOI are discarded.
#[tokio::test]
async fn test_ignore_data_between_eoi_and_soi() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(FRAME_A).await.unwrap();
    writer.write_all(GARBAGE).await.unwrap();
    writer.write_all(FRAME_B).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);
    assert_eq!(expect_frame(&mut events).await, FRAME_B);
    reader.stop();
}

/// Test that frames split into single-byte writes are reassembled.
#[tokio::test]
async fn test_byte_at_a_time_writes() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    for byte in FRAME_A {
        writer.write_all(&[*byte]).await.unwrap();
        tokio::task::yield_now().await;
    }

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);
    reader.stop();
}

/// Test that calling start() twice fails and leaves the session running.
#[tokio::test]
async fn test_start_twice_fails() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    let err = reader.start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyActive);
    assert!(reader.is_active());

    // The first session still delivers frames
    writer.write_all(FRAME_A).await.unwrap();
    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);

    reader.stop();
    expect_closed(&mut events).await;
}

/// Test that stop() may be called repeatedly and closes only once.
#[tokio::test]
async fn test_stop_twice() {
    let (mut reader, mut events, _writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    reader.stop();
    expect_closed(&mut events).await;
    reader.stop();

    assert!(!reader.is_active());
    assert!(events.try_recv().is_none());
}

/// Test that an oversized frame is dropped and the next one still arrives.
#[tokio::test]
async fn test_frame_too_large() {
    let too_long = [0xFF, 0xD8, 0x01, 0x02, 0x03, 0x04, 0x05, 0xFF, 0xD9];
    let fits = [0xFF, 0xD8, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xD9];
    let (mut reader, mut events, mut writer) = duplex_reader(8);
    reader.start().unwrap();

    writer.write_all(&too_long).await.unwrap();
    writer.write_all(&fits).await.unwrap();

    match next_event(&mut events).await {
        ReaderEvent::Error(MjpegError::Overflow {
            attempted,
            capacity,
        }) => {
            assert_eq!(attempted, 9);
            assert_eq!(capacity, 8);
        }
        other => panic!("expected overflow, got {:?}", other),
    }
    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, fits);
    reader.stop();
}

/// Test that EOI and other markers outside a frame are ignored.
#[tokio::test]
async fn test_out_of_frame_markers_ignored() {
    let (mut reader, mut events, mut writer) = duplex_reader(4 * 1024 * 1024);
    reader.start().unwrap();

    writer.write_all(&[0xA5, 0xFF, 0xD4, 0xFF, 0xD9]).await.unwrap();
    writer.write_all(FRAME_A).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);
    reader.stop();
}

/// Test that source errors are forwarded as error events.
#[tokio::test]
async fn test_source_error_notified() {
    let (mut reader, mut events) = Reader::builder()
        .build(StreamSource::new(FailingReader))
        .unwrap();
    reader.start().unwrap();

    match next_event(&mut events).await {
        ReaderEvent::Error(err) => {
            assert_eq!(err.kind(), ErrorKind::Source);
            assert!(err.to_string().contains("fake error"));
        }
        other => panic!("expected error, got {:?}", other),
    }
    expect_closed(&mut events).await;
    assert!(!reader.is_active());
}

/// Test end of stream, then a second session over the same file.
#[tokio::test]
async fn test_file_source_end_of_stream_and_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.mjpeg");
    let mut contents = GARBAGE.to_vec();
    contents.extend_from_slice(FRAME_A);
    contents.extend_from_slice(GARBAGE);
    contents.extend_from_slice(FRAME_B);
    std::fs::write(&path, &contents).unwrap();

    let (mut reader, mut events) = Reader::builder().build(FileSource::new(&path)).unwrap();

    for _ in 0..2 {
        reader.start().unwrap();
        expect_ready(&mut events).await;
        assert_eq!(expect_frame(&mut events).await, FRAME_A);
        assert_eq!(expect_frame(&mut events).await, FRAME_B);
        expect_closed(&mut events).await;
        assert!(!reader.is_active());
        assert_eq!(reader.get_last_frame().frame.as_deref(), Some(FRAME_B));
    }

    // Already detached by end of stream
    reader.stop();
    assert!(events.try_recv().is_none());
}

/// Test that a partial frame does not survive stop() into the next session.
#[tokio::test]
async fn test_stop_discards_partial_frame() {
    let (first_client, mut first) = tokio::io::duplex(1024);
    let (second_client, mut second) = tokio::io::duplex(1024);
    let source = QueueSource {
        streams: VecDeque::from(vec![first_client, second_client]),
    };
    let (mut reader, mut events) = Reader::builder().build(source).unwrap();

    reader.start().unwrap();
    let mut chunk = FRAME_A.to_vec();
    chunk.extend_from_slice(&[0xFF, 0xD8, 0x01, 0x02]);
    first.write_all(&chunk).await.unwrap();
    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);

    reader.stop();
    expect_closed(&mut events).await;

    reader.start().unwrap();
    assert!(reader.get_last_frame().frame.is_none());
    second.write_all(&[0x03, 0xFF, 0xD9]).await.unwrap();
    second.write_all(FRAME_B).await.unwrap();

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_B);
    reader.stop();
    expect_closed(&mut events).await;
}

/// Test that a source that cannot be opened fails start() synchronously.
#[tokio::test]
async fn test_start_with_missing_file() {
    let (mut reader, mut events) = Reader::builder()
        .build(FileSource::new("/nonexistent/mjpeg-reader/stream"))
        .unwrap();

    let err = reader.start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Source);
    assert!(!reader.is_active());
    assert!(events.try_recv().is_none());
}

/// Test a named pipe fed by two writers in turn, as a camera restarting would.
#[cfg(unix)]
#[tokio::test]
async fn test_fifo_survives_writer_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera.fifo");
    let status = std::process::Command::new("mkfifo")
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());

    let (mut reader, mut events) = mjpeg_reader::create_reader(&path).unwrap();
    reader.start().unwrap();

    for frame in [FRAME_A, FRAME_B] {
        let path = path.clone();
        tokio::task::spawn_blocking(move || std::fs::write(path, frame))
            .await
            .unwrap()
            .unwrap();
    }

    expect_ready(&mut events).await;
    assert_eq!(expect_frame(&mut events).await, FRAME_A);
    assert_eq!(expect_frame(&mut events).await, FRAME_B);

    // Both writers have gone, but the pipe is still attached
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(events.try_recv().is_none());
    assert!(reader.is_active());

    reader.stop();
    expect_closed(&mut events).await;
    assert!(events.try_recv().is_none());
}
