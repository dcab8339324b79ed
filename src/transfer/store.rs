//! Store command selection
//!
//! Issues `REST` and then `STOR`, `APPE` or `STOU` for an upload, and reads
//! the server-assigned name out of a `STOU` reply.

use log::{debug, info, warn};

use crate::client::{FtpConnection, TransferSession};
use crate::error::UploadError;
use crate::protocol::Command;
use crate::protocol::responses::{NOT_IMPLEMENTED, PENDING_FURTHER_INFO, Reply};
use crate::transfer::context::TransferContext;
use crate::transfer::modes::{StoreRequest, StoreVariant};

/// Punctuation a server may put after the name in a `STOU` reply.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Fails if the session cannot serve `variant`. Sends nothing.
pub fn ensure_supported(
    session: &TransferSession,
    variant: StoreVariant,
) -> Result<(), UploadError> {
    if variant == StoreVariant::Unique && !session.stou_supported() {
        warn!("Unique store requested but the server does not support STOU");
        return Err(UploadError::Capability("STOU not supported by server".into()));
    }
    Ok(())
}

/// Sends the command sequence for `request` and returns the context the
/// transfer starts from.
///
/// The store reply must be a positive preliminary (1xx) reply; anything
/// else means the server will not open the data channel.
pub fn issue_store<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
    request: &StoreRequest,
) -> Result<TransferContext, UploadError> {
    // `put_file` runs the same check before data connection setup; this one
    // covers callers that drive `issue_store` on their own.
    ensure_supported(session, request.variant)?;

    let ctx = TransferContext::starting_at(request.offset);

    if request.offset > 0 {
        let reply = session.command(conn, &Command::Rest(request.offset))?;
        if reply.code != PENDING_FURTHER_INFO {
            return Err(reply_error(reply));
        }
        info!("Resuming upload at offset {}", request.offset);
    }
    session.merge(&ctx);

    let path = request.remote_path.clone();
    let reply = match request.variant {
        StoreVariant::Normal => session.command(conn, &Command::Stor(path))?,
        StoreVariant::Append => session.command(conn, &Command::Appe(path))?,
        StoreVariant::Unique => {
            let reply = session.command(conn, &Command::Stou(path))?;
            if reply.code == NOT_IMPLEMENTED {
                warn!("Server rejected STOU; disabling unique stores");
                session.set_stou_supported(false);
                return Err(UploadError::Capability(format!(
                    "STOU rejected: {}",
                    reply
                )));
            }
            if reply.is_preliminary() {
                if let Some(name) = parse_unique_name(&reply.text) {
                    debug!("Unique filename is: {}", name);
                    session.set_remote_path(name);
                }
            }
            reply
        }
    };

    if !reply.is_preliminary() {
        return Err(reply_error(reply));
    }
    Ok(ctx)
}

/// Extracts the file name following `" for "` in a `STOU` reply.
///
/// Accepts `for 'name'` and `for name`, with or without trailing
/// punctuation. Returns `None` when no name is present.
pub fn parse_unique_name(text: &str) -> Option<String> {
    let start = text.find(" for ")? + " for ".len();
    let rest = text[start..].trim();

    let name = match rest.strip_prefix('\'') {
        Some(quoted) => match quoted.find('\'') {
            Some(end) => &quoted[..end],
            None => quoted.trim_end_matches(TRAILING_PUNCTUATION),
        },
        None => rest
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches(TRAILING_PUNCTUATION),
    };

    (!name.is_empty()).then(|| name.to_string())
}

fn reply_error(reply: Reply) -> UploadError {
    UploadError::ProtocolReply {
        code: reply.code,
        text: reply.text,
    }
}
