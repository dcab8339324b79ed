//! FTP Response handling
//!
//! Defines FTP reply codes and the reply model read from the control
//! connection.

pub const FILE_STATUS_OK: u16 = 150;
pub const FILE_STATUS: u16 = 213;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ENTERING_PASSIVE: u16 = 227;
pub const LOGIN_SUCCESS: u16 = 230;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const PENDING_FURTHER_INFO: u16 = 350;
pub const NOT_IMPLEMENTED: u16 = 502;

/// A complete reply from the server.
///
/// `text` holds the message without the status code; lines of a multi-line
/// reply are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// 1xx: the server will send another reply when the action completes.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// 2xx
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_classes() {
        assert!(Reply::new(FILE_STATUS_OK, "ok").is_preliminary());
        assert!(Reply::new(TRANSFER_COMPLETE, "done").is_completion());
        assert!(!Reply::new(PENDING_FURTHER_INFO, "restarting").is_completion());
        assert!(!Reply::new(NOT_IMPLEMENTED, "no").is_completion());
    }
}
