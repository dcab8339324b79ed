//! Error handlers
//!
//! Provides error reporting and exit status mapping.

use crate::error::types::UploadError;
use log::error;

/// Log an upload error
pub fn handle_error(err: &UploadError) {
    error!("Upload failed: {}", err);
}

/// Convert error to a process exit code
pub fn error_to_exit_code(err: &UploadError) -> i32 {
    match err {
        UploadError::LocalAccess(_) => 2,
        UploadError::InvalidArgument(_) => 7,
        UploadError::Capability(_) => 3,
        UploadError::ProtocolReply { .. } => 4,
        UploadError::DataChannel(_) => 5,
        UploadError::Control(_) => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::TransferError;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let reply = UploadError::ProtocolReply {
            code: 553,
            text: "Not allowed".into(),
        };
        let channel = UploadError::DataChannel(TransferError::WaitExhausted(3));
        assert_eq!(error_to_exit_code(&reply), 4);
        assert_eq!(error_to_exit_code(&channel), 5);
        assert_eq!(
            error_to_exit_code(&UploadError::Capability("no STOU".into())),
            3
        );
    }

    #[test]
    fn test_display_includes_reply() {
        let err = UploadError::ProtocolReply {
            code: 550,
            text: "Permission denied".into(),
        };
        assert_eq!(err.to_string(), "Unexpected reply: 550 Permission denied");
    }
}
