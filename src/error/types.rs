//! Error types
//!
//! Defines domain-specific error types for each stage of an upload.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Local source errors, raised before any protocol interaction
#[derive(Debug)]
pub enum LocalAccessError {
    NotFound(String, io::Error),
    IsADirectory(String),
    OpenFailed(String, io::Error),
    SeekFailed(u64, io::Error),
}

impl fmt::Display for LocalAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalAccessError::NotFound(p, e) => write!(f, "Cannot stat {}: {}", p, e),
            LocalAccessError::IsADirectory(p) => write!(f, "{} is a directory", p),
            LocalAccessError::OpenFailed(p, e) => write!(f, "Cannot open {}: {}", p, e),
            LocalAccessError::SeekFailed(offset, e) => {
                write!(f, "Cannot seek to offset {}: {}", offset, e)
            }
        }
    }
}

impl std::error::Error for LocalAccessError {}

/// Data channel errors
#[derive(Debug)]
pub enum TransferError {
    DataChannelNotInitialized,
    PortBindingFailed(SocketAddr, io::Error),
    ListenerConfigurationFailed(io::Error),
    ConnectFailed(SocketAddr, io::Error),
    AcceptFailed(io::Error),
    ConnectionTimeout(usize),
    WaitFailed(io::Error),
    WaitExhausted(usize),
    ReadFailed(io::Error),
    WriteFailed(io::Error),
    ShortWrite { expected: usize, written: usize },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::DataChannelNotInitialized => write!(f, "Data channel not initialized"),
            TransferError::PortBindingFailed(addr, e) => {
                write!(f, "Failed to bind to {}: {}", addr, e)
            }
            TransferError::ListenerConfigurationFailed(e) => {
                write!(f, "Failed to configure listener: {}", e)
            }
            TransferError::ConnectFailed(addr, e) => {
                write!(f, "Failed to connect data channel to {}: {}", addr, e)
            }
            TransferError::AcceptFailed(e) => write!(f, "Data connection not accepted: {}", e),
            TransferError::ConnectionTimeout(attempts) => {
                write!(f, "Timeout waiting for data connection after {} attempts", attempts)
            }
            TransferError::WaitFailed(e) => write!(f, "Data channel not writable: {}", e),
            TransferError::WaitExhausted(polls) => {
                write!(f, "Data channel still not writable after {} polls", polls)
            }
            TransferError::ReadFailed(e) => write!(f, "Local read failed: {}", e),
            TransferError::WriteFailed(e) => write!(f, "Data channel write failed: {}", e),
            TransferError::ShortWrite { expected, written } => {
                write!(f, "Short write: {} of {} bytes", written, expected)
            }
        }
    }
}

impl std::error::Error for TransferError {}

/// Control connection errors
#[derive(Debug)]
pub enum ControlError {
    Io(io::Error),
    ConnectionClosed,
    MalformedReply(String),
    InvalidPassiveReply(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Io(e) => write!(f, "Control connection I/O error: {}", e),
            ControlError::ConnectionClosed => write!(f, "Control connection closed by server"),
            ControlError::MalformedReply(line) => write!(f, "Malformed reply: {:?}", line),
            ControlError::InvalidPassiveReply(text) => {
                write!(f, "Cannot parse passive address from: {}", text)
            }
        }
    }
}

impl std::error::Error for ControlError {}

impl From<io::Error> for ControlError {
    fn from(error: io::Error) -> Self {
        ControlError::Io(error)
    }
}

/// Error returned by upload operations
#[derive(Debug)]
pub enum UploadError {
    InvalidArgument(String),
    LocalAccess(LocalAccessError),
    Capability(String),
    ProtocolReply { code: u16, text: String },
    DataChannel(TransferError),
    Control(ControlError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::InvalidArgument(arg) => write!(f, "Invalid command argument: {:?}", arg),
            UploadError::LocalAccess(e) => write!(f, "Local access error: {}", e),
            UploadError::Capability(msg) => write!(f, "Capability error: {}", msg),
            UploadError::ProtocolReply { code, text } => {
                write!(f, "Unexpected reply: {} {}", code, text)
            }
            UploadError::DataChannel(e) => write!(f, "Data channel error: {}", e),
            UploadError::Control(e) => write!(f, "Control error: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<LocalAccessError> for UploadError {
    fn from(error: LocalAccessError) -> Self {
        UploadError::LocalAccess(error)
    }
}

impl From<TransferError> for UploadError {
    fn from(error: TransferError) -> Self {
        UploadError::DataChannel(error)
    }
}

impl From<ControlError> for UploadError {
    fn from(error: ControlError) -> Self {
        UploadError::Control(error)
    }
}
