//! Transfer session state
//!
//! Caller-owned state that survives across uploads: counters, the last
//! control reply, the paths last used, and server capabilities.

use log::debug;

use crate::client::FtpConnection;
use crate::error::UploadError;
use crate::protocol::{Command, Reply};
use crate::transfer::TransferMode;
use crate::transfer::context::TransferContext;

/// Per-connection transfer state.
///
/// One upload at a time may run against a session; `put_file` takes it by
/// `&mut`, so concurrent uploads on the same session do not compile.
#[derive(Debug)]
pub struct TransferSession {
    transferred: u64,
    offset: u64,
    restart_size: u64,
    file_size: u64,
    last_reply: Option<Reply>,
    local_path: Option<String>,
    remote_path: Option<String>,
    stou_supported: bool,
    mode: TransferMode,
}

impl Default for TransferSession {
    fn default() -> Self {
        Self::new(TransferMode::Passive)
    }
}

impl TransferSession {
    pub fn new(mode: TransferMode) -> Self {
        Self {
            transferred: 0,
            offset: 0,
            restart_size: 0,
            file_size: 0,
            last_reply: None,
            local_path: None,
            remote_path: None,
            stou_supported: true,
            mode,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Bytes written to the data channel by the last transfer, including
    /// the restart offset when resuming.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Offset given to the last `REST`, zero if none was sent.
    pub fn restart_size(&self) -> u64 {
        self.restart_size
    }

    /// Size of the local file being uploaded.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn last_reply(&self) -> Option<&Reply> {
        self.last_reply.as_ref()
    }

    /// Status code of the last reply, 0 if none was received yet.
    pub fn last_code(&self) -> u16 {
        self.last_reply.as_ref().map_or(0, |r| r.code)
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    /// Remote name of the last upload. After a unique store this is the
    /// name the server assigned.
    pub fn remote_path(&self) -> Option<&str> {
        self.remote_path.as_deref()
    }

    pub fn stou_supported(&self) -> bool {
        self.stou_supported
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_stou_supported(&mut self, supported: bool) {
        self.stou_supported = supported;
    }

    pub(crate) fn set_file_size(&mut self, size: u64) {
        self.file_size = size;
    }

    /// Replaces both stored paths; the previous strings are dropped.
    pub(crate) fn set_paths(&mut self, local: String, remote: String) {
        self.local_path = Some(local);
        self.remote_path = Some(remote);
    }

    pub(crate) fn set_remote_path(&mut self, remote: String) {
        self.remote_path = Some(remote);
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Returns the pending resume offset and resets it to zero.
    pub(crate) fn take_offset(&mut self) -> u64 {
        std::mem::take(&mut self.offset)
    }

    pub(crate) fn record_reply(&mut self, reply: &Reply) {
        self.last_reply = Some(reply.clone());
    }

    /// Folds a transfer context back into the session.
    pub(crate) fn merge(&mut self, ctx: &TransferContext) {
        self.transferred = ctx.transferred();
        self.restart_size = ctx.restart_size();
    }

    // --------------------
    // Control channel helpers
    // --------------------

    /// Sends a command and records its reply.
    pub fn command<C: FtpConnection + ?Sized>(
        &mut self,
        conn: &mut C,
        command: &Command,
    ) -> Result<Reply, UploadError> {
        let reply = conn.send_command(command)?;
        debug!("{} -> {}", command.verb(), reply);
        self.record_reply(&reply);
        Ok(reply)
    }

    /// Reads the next reply without sending anything and records it.
    pub fn read_reply<C: FtpConnection + ?Sized>(
        &mut self,
        conn: &mut C,
    ) -> Result<Reply, UploadError> {
        let reply = conn.read_reply()?;
        debug!("<- {}", reply);
        self.record_reply(&reply);
        Ok(reply)
    }
}
