//! RAX FTP client
//!
//! The upload side of an FTP client: store command selection (`STOR`,
//! `APPE`, `STOU`), resume via `REST`, flow-controlled binary and text
//! transfers, and the blocking TCP plumbing needed to drive them.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transfer;
pub mod utils;

pub use client::{FtpConnection, TcpConnection, TransferSession};
pub use config::ClientConfig;
pub use error::UploadError;
pub use transfer::{ContentMode, StoreVariant, TransferMode, UploadRequest, UploadSummary, put_file};
