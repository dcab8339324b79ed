//! Reply parsing
//!
//! Reads replies off the control connection and decodes the payloads of
//! `PASV` and `SIZE` replies.

use std::io::BufRead;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::ControlError;
use crate::protocol::responses::{ENTERING_PASSIVE, FILE_STATUS, Reply};

/// Splits a reply line into its code, continuation flag and text.
fn split_line(line: &str) -> Result<(u16, bool, &str), ControlError> {
    let code = line
        .get(..3)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| ControlError::MalformedReply(line.to_string()))?;
    match line.as_bytes().get(3) {
        None => Ok((code, false, "")),
        Some(b' ') => Ok((code, false, &line[4..])),
        Some(b'-') => Ok((code, true, &line[4..])),
        Some(_) => Err(ControlError::MalformedReply(line.to_string())),
    }
}

/// Reads one complete reply, following multi-line `ddd-` continuations
/// until the closing `ddd ` line.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply, ControlError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ControlError::ConnectionClosed);
    }
    let first = line.trim_end_matches(['\r', '\n']);
    let (code, mut continues, text) = split_line(first)?;
    let mut lines = vec![text.to_string()];

    while continues {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(ControlError::ConnectionClosed);
        }
        let current = line.trim_end_matches(['\r', '\n']);
        match split_line(current) {
            Ok((c, false, text)) if c == code => {
                lines.push(text.to_string());
                continues = false;
            }
            _ => lines.push(current.to_string()),
        }
    }

    Ok(Reply::new(code, lines.join("\n")))
}

/// Extracts the data address from a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply.
pub fn parse_passive_address(reply: &Reply) -> Result<SocketAddrV4, ControlError> {
    let invalid = || ControlError::InvalidPassiveReply(reply.text.clone());
    if reply.code != ENTERING_PASSIVE {
        return Err(invalid());
    }
    let start = reply
        .text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let fields: Vec<u8> = reply.text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .take(6)
        .map(|s| s.parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    if fields.len() != 6 {
        return Err(invalid());
    }
    let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
    let port = (u16::from(fields[4]) << 8) | u16::from(fields[5]);
    Ok(SocketAddrV4::new(ip, port))
}

/// Extracts the byte count from a `213` reply to `SIZE`.
pub fn parse_size(reply: &Reply) -> Option<u64> {
    if reply.code != FILE_STATUS {
        return None;
    }
    reply.text.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_single_line_reply() {
        let mut input = Cursor::new("150 FILE: store.txt for 'abc.txt'\r\n");
        let reply = read_reply(&mut input).unwrap();
        assert_eq!(reply.code, 150);
        assert_eq!(reply.text, "FILE: store.txt for 'abc.txt'");
    }

    #[test]
    fn test_read_multi_line_reply() {
        let mut input = Cursor::new("220-Welcome\r\n banner line\r\n220 Ready\r\n226 next\r\n");
        let reply = read_reply(&mut input).unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.text, "Welcome\n banner line\nReady");
        assert_eq!(read_reply(&mut input).unwrap().code, 226);
    }

    #[test]
    fn test_malformed_and_closed() {
        let mut input = Cursor::new("hello\r\n");
        assert!(matches!(
            read_reply(&mut input),
            Err(ControlError::MalformedReply(_))
        ));
        let mut empty = Cursor::new("");
        assert!(matches!(
            read_reply(&mut empty),
            Err(ControlError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_parse_passive_address() {
        let reply = Reply::new(227, "Entering Passive Mode (127,0,0,1,19,137).");
        let addr = parse_passive_address(&reply).unwrap();
        assert_eq!(addr, SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5001));

        let bad = Reply::new(227, "Entering Passive Mode (127,0,0,1)");
        assert!(parse_passive_address(&bad).is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size(&Reply::new(213, "4096")), Some(4096));
        assert_eq!(parse_size(&Reply::new(550, "No such file")), None);
    }
}
