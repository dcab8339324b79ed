//! FTP Protocol implementation
//!
//! Handles command rendering, reply parsing, and reply codes.

pub mod commands;
pub mod parser;
pub mod responses;

pub use commands::{Command, RepresentationType};
pub use parser::{parse_passive_address, parse_size, read_reply};
pub use responses::Reply;
