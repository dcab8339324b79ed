//! Client operations
//!
//! Session-level exchanges built on `FtpConnection`: login, remote size
//! queries, transfer abort, and logout.

use log::{debug, info, warn};

use crate::client::{FtpConnection, TransferSession};
use crate::error::UploadError;
use crate::protocol::responses::{LOGIN_SUCCESS, PASSWORD_REQUIRED};
use crate::protocol::{Command, Reply, parse_size};

/// Logs in with `USER`/`PASS`.
pub fn login<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
    username: &str,
    password: &str,
) -> Result<Reply, UploadError> {
    let reply = session.command(conn, &Command::User(username.to_string()))?;
    let reply = match reply.code {
        LOGIN_SUCCESS => reply,
        PASSWORD_REQUIRED => session.command(conn, &Command::Pass(password.to_string()))?,
        _ => {
            return Err(UploadError::ProtocolReply {
                code: reply.code,
                text: reply.text,
            });
        }
    };

    if reply.code != LOGIN_SUCCESS {
        return Err(UploadError::ProtocolReply {
            code: reply.code,
            text: reply.text,
        });
    }
    info!("Logged in as {}", username);
    Ok(reply)
}

/// Asks the server for the size of `path` with `SIZE`.
///
/// Returns `None` when the server cannot or will not answer, which callers
/// treat as "nothing uploaded yet".
pub fn query_remote_size<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
    path: &str,
) -> Option<u64> {
    match session.command(conn, &Command::Size(path.to_string())) {
        Ok(reply) => {
            let size = parse_size(&reply);
            if size.is_none() {
                debug!("SIZE {} not answered: {}", path, reply);
            }
            size
        }
        Err(e) => {
            warn!("SIZE {} failed: {}", path, e);
            None
        }
    }
}

/// Sends `ABOR` after a failed transfer and drains the replies it causes.
///
/// A server that was still receiving answers 426 and then 226; one that
/// already finished answers once.
pub fn abort_transfer<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
) -> Result<Reply, UploadError> {
    let reply = session.command(conn, &Command::Abor)?;
    if matches!(reply.code, 426 | 451) {
        return session.read_reply(conn);
    }
    Ok(reply)
}

/// Ends the session with `QUIT`.
pub fn quit<C: FtpConnection + ?Sized>(
    conn: &mut C,
    session: &mut TransferSession,
) -> Result<Reply, UploadError> {
    let reply = session.command(conn, &Command::Quit)?;
    info!("Disconnected: {}", reply);
    Ok(reply)
}
