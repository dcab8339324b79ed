//! Input validation utilities
//!
//! Checks on values substituted into control commands.

/// Maximum length of a command argument
pub const MAX_ARGUMENT_LENGTH: usize = 512;

/// A command argument must be non-empty and free of line breaks and NULs,
/// which would let it inject further commands.
pub fn is_valid_argument(arg: &str) -> bool {
    !arg.trim().is_empty()
        && arg.len() <= MAX_ARGUMENT_LENGTH
        && !arg.contains('\0')
        && !arg.contains('\r')
        && !arg.contains('\n')
}
