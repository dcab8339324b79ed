//! Upload orchestration
//!
//! Drives one upload from local file checks through the store command,
//! the data transfer, and the final reply.

use log::{debug, error, info, warn};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::client::{FtpConnection, TransferSession, abort_transfer, query_remote_size};
use crate::config::ClientConfig;
use crate::error::{LocalAccessError, TransferError, UploadError};
use crate::protocol::Command;
use crate::transfer::flow::FlowController;
use crate::transfer::modes::{ContentMode, StoreRequest, StoreVariant};
use crate::transfer::results::UploadSummary;
use crate::transfer::{store, translate};
use crate::utils::validation::is_valid_argument;

/// What to upload and how.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub local_path: PathBuf,
    pub remote_path: String,
    pub variant: StoreVariant,
    /// Continue after the bytes the server already has.
    pub resume: bool,
    pub content: ContentMode,
}

impl UploadRequest {
    pub fn new(local_path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            variant: StoreVariant::Normal,
            resume: false,
            content: ContentMode::Binary,
        }
    }

    pub fn variant(mut self, variant: StoreVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }
}

/// Uploads a local file.
///
/// Local checks happen before anything is sent. The local file is released
/// on every path; the data channel, once accepted, is flushed and closed
/// exactly once whether or not the transfer succeeded.
pub fn put_file<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
    config: &ClientConfig,
    request: &UploadRequest,
) -> Result<UploadSummary, UploadError> {
    if !is_valid_argument(&request.remote_path) {
        return Err(UploadError::InvalidArgument(request.remote_path.clone()));
    }

    let local = request.local_path.display().to_string();

    let metadata = fs::metadata(&request.local_path).map_err(|e| {
        error!("stat() failed for {}: {}", local, e);
        LocalAccessError::NotFound(local.clone(), e)
    })?;
    if metadata.is_dir() {
        error!("{} is a directory", local);
        return Err(LocalAccessError::IsADirectory(local).into());
    }

    let mut file = File::open(&request.local_path).map_err(|e| {
        error!("open() failed for {}: {}", local, e);
        LocalAccessError::OpenFailed(local.clone(), e)
    })?;

    session.set_file_size(metadata.len());
    session.set_paths(local, request.remote_path.clone());

    session.set_offset(0);
    if request.resume {
        match query_remote_size(conn, session, &request.remote_path) {
            Some(offset) => {
                file.seek(SeekFrom::Start(offset)).map_err(|e| {
                    error!("seek to {} failed: {}", offset, e);
                    LocalAccessError::SeekFailed(offset, e)
                })?;
                session.set_offset(offset);
            }
            None => warn!(
                "Failed to get size of remote file {}; sending from the start",
                request.remote_path
            ),
        }
    }

    send_file(conn, session, config, &mut file, request)
}

/// Runs the protocol side of an upload from an already positioned source.
fn send_file<C: FtpConnection + ?Sized, R: Read>(
    conn: &mut C,
    session: &mut TransferSession,
    config: &ClientConfig,
    source: &mut R,
    request: &UploadRequest,
) -> Result<UploadSummary, UploadError> {
    let offset = session.take_offset();
    // Nothing, not even PASV or TYPE, goes out for an unsupported variant.
    store::ensure_supported(session, request.variant)?;

    let reply = conn.prepare_data(session.mode())?;
    session.record_reply(&reply);

    let reply = session.command(conn, &Command::Type(request.content.representation()))?;
    if !reply.is_completion() {
        return Err(UploadError::ProtocolReply {
            code: reply.code,
            text: reply.text,
        });
    }

    let store_request = StoreRequest {
        variant: request.variant,
        remote_path: request.remote_path.clone(),
        offset,
        content: request.content,
    };
    let mut ctx = store::issue_store(conn, session, &store_request)?;

    // The server still owes a reply to the store command (425/426).
    let mut channel = match conn.accept_data(session.mode()) {
        Ok(channel) => channel,
        Err(e) => {
            error!("Data connection not accepted: {}", e);
            match session.read_reply(conn) {
                Ok(reply) => debug!("Store command ended with {}", reply),
                Err(drain_err) => warn!("No reply after failed data connection: {}", drain_err),
            }
            return Err(e.into());
        }
    };

    let flow = FlowController::from_config(config);
    let mut result = translate::send(
        request.content,
        source,
        channel.as_mut(),
        &flow,
        &mut ctx,
        config.buffer_size,
    );

    if let Err(e) = channel.flush() {
        warn!("Flushing data channel failed: {}", e);
        if result.is_ok() {
            result = Err(TransferError::WriteFailed(e));
        }
    }
    if let Err(e) = channel.close() {
        warn!("Closing data channel failed: {}", e);
    }
    drop(channel);
    session.merge(&ctx);

    if let Err(e) = result {
        match abort_transfer(conn, session) {
            Ok(reply) => debug!("ABOR -> {}", reply),
            Err(abort_err) => warn!("ABOR failed: {}", abort_err),
        }
        return Err(e.into());
    }

    let reply = session.read_reply(conn)?;
    if !reply.is_completion() {
        error!("Transfer rejected: {}", reply);
        return Err(UploadError::ProtocolReply {
            code: reply.code,
            text: reply.text,
        });
    }

    let summary = UploadSummary {
        bytes_transferred: ctx.transferred(),
        restart_offset: ctx.restart_size(),
        file_size: session.file_size(),
        remote_path: session.remote_path().unwrap_or_default().to_string(),
        reply,
    };
    info!(
        "Uploaded {} bytes to {}",
        summary.bytes_transferred, summary.remote_path
    );
    Ok(summary)
}
