//! Error handling
//!
//! Defines error types and handling for the upload engine.

pub mod handlers;
pub mod types;

pub use types::*;
