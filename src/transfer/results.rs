//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

use crate::protocol::Reply;

/// Outcome of a successful upload
#[derive(Debug, Clone)]
pub struct UploadSummary {
    /// Counter after the transfer, restart offset included
    pub bytes_transferred: u64,
    pub restart_offset: u64,
    pub file_size: u64,
    /// Remote name; server-assigned for unique stores
    pub remote_path: String,
    /// Terminal reply to the store command
    pub reply: Reply,
}
