//! FTP client side of an upload
//!
//! Session state, the connection seam, and session-level operations.

pub mod connection;
pub mod operations;
pub mod session;

pub use connection::{FtpConnection, TcpConnection};
pub use operations::{abort_transfer, login, query_remote_size, quit};
pub use session::TransferSession;
