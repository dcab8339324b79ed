//! Module `command`
//!
//! Defines the FTP commands issued on the control connection and their
//! wire rendering.

use std::fmt;
use std::net::SocketAddrV4;

/// Representation type selected with `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationType {
    Ascii,
    Image,
}

/// Represents an FTP command sent by the client.
///
/// Commands that take an argument carry it in the variant; rendering performs
/// argument substitution only.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    User(String),
    Pass(String),
    Type(RepresentationType),
    Pasv,
    Port(SocketAddrV4),
    Size(String),
    Rest(u64),
    Stor(String), // Store
    Appe(String), // Append, creating the file if needed
    Stou(String), // Store under a server-chosen unique name
    Abor,
    Quit,
}

impl Command {
    /// Renders the command with its `\r\n` terminator.
    pub fn to_wire(&self) -> String {
        format!("{}\r\n", self)
    }

    /// Returns the command verb.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::User(_) => "USER",
            Command::Pass(_) => "PASS",
            Command::Type(_) => "TYPE",
            Command::Pasv => "PASV",
            Command::Port(_) => "PORT",
            Command::Size(_) => "SIZE",
            Command::Rest(_) => "REST",
            Command::Stor(_) => "STOR",
            Command::Appe(_) => "APPE",
            Command::Stou(_) => "STOU",
            Command::Abor => "ABOR",
            Command::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Command::User(arg)
            | Command::Pass(arg)
            | Command::Size(arg)
            | Command::Stor(arg)
            | Command::Appe(arg)
            | Command::Stou(arg) => write!(f, "{} {}", verb, arg),
            Command::Type(RepresentationType::Ascii) => write!(f, "{} A", verb),
            Command::Type(RepresentationType::Image) => write!(f, "{} I", verb),
            Command::Port(addr) => {
                let [h1, h2, h3, h4] = addr.ip().octets();
                let port = addr.port();
                write!(
                    f,
                    "{} {},{},{},{},{},{}",
                    verb,
                    h1,
                    h2,
                    h3,
                    h4,
                    port >> 8,
                    port & 0xff
                )
            }
            Command::Rest(offset) => write!(f, "{} {}", verb, offset),
            Command::Pasv | Command::Abor | Command::Quit => write!(f, "{}", verb),
        }
    }
}

/// Returns a loggable form of the command, masking the password.
pub fn redacted(command: &Command) -> String {
    match command {
        Command::Pass(_) => "PASS ****".to_string(),
        other => other.to_string(),
    }
}
