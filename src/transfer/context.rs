//! Per-transfer counters
//!
//! Threaded through command selection and content translation, then merged
//! into the session.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferContext {
    transferred: u64,
    restart_size: u64,
}

impl TransferContext {
    /// A context for a transfer resuming at `offset` (0 for a fresh one).
    pub fn starting_at(offset: u64) -> Self {
        Self {
            transferred: offset,
            restart_size: offset,
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn restart_size(&self) -> u64 {
        self.restart_size
    }

    /// Counts bytes that reached the data channel.
    pub fn add(&mut self, bytes: u64) {
        self.transferred += bytes;
    }
}
