//! FTP Transfer modes
//!
//! Data connection modes, store command variants, and content modes.

use crate::protocol::RepresentationType;

/// FTP data connection modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Active,
    Passive,
}

/// Which store command carries the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreVariant {
    /// `STOR`: create or replace
    Normal,
    /// `APPE`: append to an existing file
    Append,
    /// `STOU`: the server picks the remote name
    Unique,
}

/// How file content is written to the data channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Bytes are sent verbatim (`TYPE I`)
    Binary,
    /// Every line feed is sent as CR LF (`TYPE A`)
    Text,
}

impl ContentMode {
    /// The `TYPE` argument announced to the server for this mode.
    pub fn representation(self) -> RepresentationType {
        match self {
            ContentMode::Binary => RepresentationType::Image,
            ContentMode::Text => RepresentationType::Ascii,
        }
    }
}

/// Ephemeral description of one store command.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub variant: StoreVariant,
    pub remote_path: String,
    pub offset: u64,
    pub content: ContentMode,
}
