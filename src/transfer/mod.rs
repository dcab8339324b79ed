//! Transfer module for the FTP client
//!
//! Handles store command selection, content translation, flow control,
//! and the upload sequence that ties them together.

pub mod context;
pub mod data_channel;
pub mod flow;
pub mod modes;
pub mod results;
pub mod store;
pub mod translate;
pub mod upload;

// Re-export key types and functions
pub use data_channel::{DataChannel, Readiness, TcpDataChannel};
pub use flow::FlowController;
pub use modes::{ContentMode, StoreRequest, StoreVariant, TransferMode};
pub use results::UploadSummary;
pub use upload::{UploadRequest, put_file};
