//! Module `data_channel`
//!
//! The data connection an upload writes to. Defines the `DataChannel`
//! seam and its TCP implementation, plus the active-mode accept loop.

use log::{debug, error, info, warn};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crate::error::TransferError;

const INITIAL_SLEEP_MS: u64 = 100;

/// Result of a single write-readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

/// A data connection scoped to one transfer.
///
/// `close` and `abort` leave the channel inert: later writes fail and later
/// `flush`/`close` calls are no-ops.
pub trait DataChannel: Write {
    /// Checks once whether the channel can accept more output.
    fn poll_writable(&mut self) -> io::Result<Readiness>;

    /// Gracefully closes the channel, signalling end of file to the peer.
    fn close(&mut self) -> io::Result<()>;

    /// Drops any buffered output and tears the connection down.
    fn abort(&mut self);
}

/// Buffered TCP data connection.
pub struct TcpDataChannel {
    stream: Option<BufWriter<TcpStream>>,
}

impl TcpDataChannel {
    pub fn new(stream: TcpStream, buffer_size: usize) -> Self {
        Self {
            stream: Some(BufWriter::with_capacity(buffer_size, stream)),
        }
    }

    fn stream_mut(&mut self) -> io::Result<&mut BufWriter<TcpStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::NotConnected, "data channel closed"))
    }
}

impl Write for TcpDataChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

impl DataChannel for TcpDataChannel {
    fn poll_writable(&mut self) -> io::Result<Readiness> {
        // Blocking socket: writes block until there is room, so the only
        // thing left to report is a pending socket error.
        let stream = self.stream_mut()?;
        match stream.get_ref().take_error()? {
            Some(e) => Err(e),
            None => Ok(Readiness::Ready),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(stream) = self.stream.take() {
            let stream = stream.into_inner().map_err(|e| e.into_error())?;
            stream.shutdown(Shutdown::Write)?;
        }
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(stream) = self.stream.take() {
            let (stream, _unsent) = stream.into_parts();
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("Data channel shutdown during abort failed: {}", e);
            }
            warn!("Data channel aborted");
        }
    }
}

/// Waits for the server to connect to an active-mode listener.
///
/// The listener is polled in non-blocking mode with exponential backoff,
/// giving up after `max_attempts`.
pub fn accept_active(
    listener: &TcpListener,
    max_attempts: u32,
) -> Result<TcpStream, TransferError> {
    listener
        .set_nonblocking(true)
        .map_err(TransferError::ListenerConfigurationFailed)?;

    let mut attempt = 0;
    let mut delay = INITIAL_SLEEP_MS;

    while attempt < max_attempts {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!("Data connection accepted from {}", addr);
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!("Failed to set data stream to blocking mode: {}", e);
                }
                return Ok(stream);
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(delay));
                delay *= 2;
                attempt += 1;
            }
            Err(e) => {
                error!("Fatal error accepting data connection: {}", e);
                return Err(TransferError::AcceptFailed(e));
            }
        }
    }

    error!("Timeout waiting for data connection after {} attempts", attempt);
    Err(TransferError::ConnectionTimeout(attempt as usize))
}
