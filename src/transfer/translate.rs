//! Module `translate`
//!
//! Copies the local source onto the data channel. Binary mode sends the
//! bytes verbatim in chunks; text mode sends one byte at a time and puts a
//! carriage return in front of every line feed.
//!
//! On any failure the data channel is aborted before the error is returned.
//! The transfer counter only ever counts bytes the channel accepted.

use log::{debug, error, info};
use std::io::{BufReader, ErrorKind, Read};

use crate::error::TransferError;
use crate::transfer::context::TransferContext;
use crate::transfer::data_channel::DataChannel;
use crate::transfer::flow::FlowController;
use crate::transfer::modes::ContentMode;

/// Sends `source` in the given content mode.
pub fn send<R: Read>(
    mode: ContentMode,
    source: &mut R,
    channel: &mut dyn DataChannel,
    flow: &FlowController,
    ctx: &mut TransferContext,
    buffer_size: usize,
) -> Result<(), TransferError> {
    let start = ctx.transferred();
    let result = match mode {
        ContentMode::Binary => send_binary(source, channel, flow, ctx, buffer_size),
        ContentMode::Text => send_text(source, channel, flow, ctx),
    };
    match &result {
        Ok(()) => info!(
            "{:?} transfer finished: {} bytes sent",
            mode,
            ctx.transferred() - start
        ),
        Err(e) => error!(
            "{:?} transfer failed after {} bytes: {}",
            mode,
            ctx.transferred() - start,
            e
        ),
    }
    result
}

/// Copies `source` verbatim, one buffer-sized chunk at a time.
pub fn send_binary<R: Read>(
    source: &mut R,
    channel: &mut dyn DataChannel,
    flow: &FlowController,
    ctx: &mut TransferContext,
    buffer_size: usize,
) -> Result<(), TransferError> {
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                channel.abort();
                return Err(TransferError::ReadFailed(e));
            }
        };

        if let Err(e) = flow.wait_writable(channel) {
            channel.abort();
            return Err(e);
        }

        if let Err(e) = write_chunk(channel, &buffer[..n], ctx) {
            channel.abort();
            return Err(e);
        }
    }
}

/// Copies `source` byte by byte, sending each `\n` as `\r\n`.
pub fn send_text<R: Read>(
    source: &mut R,
    channel: &mut dyn DataChannel,
    flow: &FlowController,
    ctx: &mut TransferContext,
) -> Result<(), TransferError> {
    let reader = BufReader::new(source);

    for byte in reader.bytes() {
        let byte = match byte {
            Ok(b) => b,
            Err(e) => {
                channel.abort();
                return Err(TransferError::ReadFailed(e));
            }
        };

        if let Err(e) = flow.wait_writable(channel) {
            channel.abort();
            return Err(e);
        }

        if byte == b'\n' {
            if let Err(e) = write_chunk(channel, b"\r", ctx) {
                channel.abort();
                return Err(e);
            }
        }

        if let Err(e) = write_chunk(channel, &[byte], ctx) {
            channel.abort();
            return Err(e);
        }
    }

    Ok(())
}

/// Writes all of `chunk`, failing if the channel stops accepting bytes.
///
/// Every accepted write is counted as it happens, so a chunk that fails
/// halfway still accounts for the bytes already handed to the channel.
fn write_chunk(
    channel: &mut dyn DataChannel,
    chunk: &[u8],
    ctx: &mut TransferContext,
) -> Result<(), TransferError> {
    let mut written = 0;
    while written < chunk.len() {
        match channel.write(&chunk[written..]) {
            Ok(0) => {
                debug!("Data channel accepted {} of {} bytes", written, chunk.len());
                return Err(TransferError::ShortWrite {
                    expected: chunk.len(),
                    written,
                });
            }
            Ok(n) => {
                written += n;
                ctx.add(n as u64);
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(TransferError::WriteFailed(e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::data_channel::Readiness;
    use crate::transfer::flow::tests::MockChannel;
    use std::io::{self, Cursor};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk error"))
        }
    }

    #[test]
    fn test_binary_copies_exact_bytes() {
        let source: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut channel = MockChannel::default();
        let mut ctx = TransferContext::default();

        send_binary(
            &mut Cursor::new(&source),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            1024,
        )
        .unwrap();

        assert_eq!(channel.written, source);
        assert_eq!(ctx.transferred(), 10_000);
        assert_eq!(channel.aborts, 0);
        // One readiness check per chunk.
        assert_eq!(channel.polls, 10);
    }

    #[test]
    fn test_binary_leaves_line_endings_alone() {
        let mut channel = MockChannel::default();
        let mut ctx = TransferContext::default();

        send(
            ContentMode::Binary,
            &mut Cursor::new(b"a\nb\r\n"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        )
        .unwrap();

        assert_eq!(channel.written, b"a\nb\r\n");
        assert_eq!(ctx.transferred(), 5);
    }

    #[test]
    fn test_text_injects_carriage_returns() {
        let source = b"one\ntwo\n\nthree";
        let mut channel = MockChannel::default();
        let mut ctx = TransferContext::default();

        send(
            ContentMode::Text,
            &mut Cursor::new(source),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        )
        .unwrap();

        assert_eq!(channel.written, b"one\r\ntwo\r\n\r\nthree");
        // m bytes plus k line feeds
        assert_eq!(ctx.transferred(), source.len() as u64 + 3);
        assert_eq!(channel.polls, source.len());
    }

    #[test]
    fn test_counter_continues_from_resume_offset() {
        let mut channel = MockChannel::default();
        let mut ctx = TransferContext::starting_at(100);

        send_binary(
            &mut Cursor::new(b"tail"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        )
        .unwrap();

        assert_eq!(ctx.transferred(), 104);
        assert_eq!(ctx.restart_size(), 100);
    }

    #[test]
    fn test_read_error_aborts() {
        let mut channel = MockChannel::default();
        let mut ctx = TransferContext::default();

        let result = send_binary(
            &mut FailingReader,
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        );

        assert!(matches!(result, Err(TransferError::ReadFailed(_))));
        assert_eq!(channel.aborts, 1);
        assert_eq!(ctx.transferred(), 0);
    }

    #[test]
    fn test_short_write_aborts_without_counting() {
        let mut channel = MockChannel {
            short_write: true,
            ..Default::default()
        };
        let mut ctx = TransferContext::default();

        let result = send_binary(
            &mut Cursor::new(b"payload"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        );

        assert!(matches!(
            result,
            Err(TransferError::ShortWrite {
                expected: 7,
                written: 0
            })
        ));
        assert_eq!(channel.aborts, 1);
        assert_eq!(ctx.transferred(), 0);
    }

    #[test]
    fn test_text_write_failure_counts_only_written_bytes() {
        // Fails on the line feed after the injected carriage return.
        let mut channel = MockChannel {
            fail_write_after: Some(3),
            ..Default::default()
        };
        let mut ctx = TransferContext::default();

        let result = send_text(
            &mut Cursor::new(b"ab\ncd"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
        );

        assert!(matches!(result, Err(TransferError::WriteFailed(_))));
        assert_eq!(channel.written, b"ab\r");
        assert_eq!(ctx.transferred(), 3);
        assert_eq!(channel.aborts, 1);
    }

    #[test]
    fn test_binary_counts_partial_chunk_before_write_failure() {
        let mut channel = MockChannel {
            max_write: Some(5),
            fail_write_after: Some(5),
            ..Default::default()
        };
        let mut ctx = TransferContext::default();

        let result = send_binary(
            &mut Cursor::new(b"0123456789"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        );

        assert!(matches!(result, Err(TransferError::WriteFailed(_))));
        assert_eq!(channel.written, b"01234");
        assert_eq!(ctx.transferred(), 5);
        assert_eq!(channel.aborts, 1);
    }

    #[test]
    fn test_binary_partial_writes_are_resumed() {
        let mut channel = MockChannel {
            max_write: Some(3),
            ..Default::default()
        };
        let mut ctx = TransferContext::starting_at(100);

        send_binary(
            &mut Cursor::new(b"0123456789"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
            8192,
        )
        .unwrap();

        assert_eq!(channel.written, b"0123456789");
        assert_eq!(ctx.transferred(), 110);
        // The chunk is written in pieces but only waited on once.
        assert_eq!(channel.polls, 1);
    }

    #[test]
    fn test_text_wait_failure_aborts() {
        let mut channel = MockChannel::default();
        channel.readiness.push_back(Ok(Readiness::Ready));
        channel
            .readiness
            .push_back(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        let mut ctx = TransferContext::default();

        let result = send_text(
            &mut Cursor::new(b"xyz"),
            &mut channel,
            &FlowController::default(),
            &mut ctx,
        );

        assert!(matches!(result, Err(TransferError::WaitFailed(_))));
        assert_eq!(channel.written, b"x");
        assert_eq!(ctx.transferred(), 1);
        assert_eq!(channel.aborts, 1);
    }
}
