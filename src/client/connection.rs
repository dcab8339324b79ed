//! Control connection
//!
//! `FtpConnection` is the seam between the upload engine and the network:
//! command/reply exchange on the control connection plus data connection
//! setup. `TcpConnection` implements it over blocking std sockets.

use log::{debug, info};
use std::io::{BufReader, Write};
use std::net::{
    IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream, ToSocketAddrs,
};

use crate::config::ClientConfig;
use crate::error::{ControlError, TransferError, UploadError};
use crate::protocol::commands::redacted;
use crate::protocol::responses::Reply;
use crate::protocol::{Command, parse_passive_address, read_reply};
use crate::transfer::TransferMode;
use crate::transfer::data_channel::{DataChannel, TcpDataChannel, accept_active};

/// Control and data connection primitives used by the upload engine.
pub trait FtpConnection {
    /// Sends `command` and returns the first reply to it.
    fn send_command(&mut self, command: &Command) -> Result<Reply, ControlError>;

    /// Reads the next reply without sending anything.
    fn read_reply(&mut self) -> Result<Reply, ControlError>;

    /// Negotiates the data connection (`PASV` or `PORT`) ahead of a
    /// transfer command and returns the negotiation reply.
    fn prepare_data(&mut self, mode: TransferMode) -> Result<Reply, UploadError>;

    /// Produces the data channel negotiated by `prepare_data`, once the
    /// transfer command has been accepted.
    fn accept_data(&mut self, mode: TransferMode) -> Result<Box<dyn DataChannel>, TransferError>;
}

enum PendingData {
    Passive(TcpStream),
    Active(TcpListener),
}

/// Blocking TCP control connection.
pub struct TcpConnection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    config: ClientConfig,
    pending: Option<PendingData>,
}

impl TcpConnection {
    /// Connects to `addr` and reads the server greeting.
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        config: &ClientConfig,
    ) -> Result<(Self, Reply), ControlError> {
        let mut last_error = None;
        for socket in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&socket, config.connect_timeout()) {
                Ok(stream) => {
                    info!("Control connection established to {}", socket);
                    let writer = stream.try_clone()?;
                    let mut conn = Self {
                        reader: BufReader::new(stream),
                        writer,
                        config: config.clone(),
                        pending: None,
                    };
                    let greeting = conn.read_reply()?;
                    debug!("Greeting: {}", greeting);
                    return Ok((conn, greeting));
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", socket, e);
                    last_error = Some(e);
                }
            }
        }
        Err(ControlError::Io(last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no address to connect to")
        })))
    }

    fn local_ipv4(&self) -> Result<Ipv4Addr, ControlError> {
        match self.writer.local_addr()?.ip() {
            IpAddr::V4(ip) => Ok(ip),
            IpAddr::V6(ip) => ip.to_ipv4_mapped().ok_or_else(|| {
                ControlError::Io(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "PORT requires an IPv4 control connection",
                ))
            }),
        }
    }
}

impl FtpConnection for TcpConnection {
    fn send_command(&mut self, command: &Command) -> Result<Reply, ControlError> {
        debug!("-> {}", redacted(command));
        self.writer.write_all(command.to_wire().as_bytes())?;
        self.writer.flush()?;
        self.read_reply()
    }

    fn read_reply(&mut self) -> Result<Reply, ControlError> {
        read_reply(&mut self.reader)
    }

    fn prepare_data(&mut self, mode: TransferMode) -> Result<Reply, UploadError> {
        self.pending = None;
        match mode {
            TransferMode::Passive => {
                let reply = self.send_command(&Command::Pasv)?;
                let addr = parse_passive_address(&reply)?;
                let socket = SocketAddr::V4(addr);
                let stream = TcpStream::connect_timeout(&socket, self.config.connect_timeout())
                    .map_err(|e| TransferError::ConnectFailed(socket, e))?;
                info!("Passive data connection established to {}", socket);
                self.pending = Some(PendingData::Passive(stream));
                Ok(reply)
            }
            TransferMode::Active => {
                let bind_addr = SocketAddrV4::new(self.local_ipv4()?, 0);
                let listener = TcpListener::bind(bind_addr)
                    .map_err(|e| TransferError::PortBindingFailed(SocketAddr::V4(bind_addr), e))?;
                let local = match listener
                    .local_addr()
                    .map_err(TransferError::ListenerConfigurationFailed)?
                {
                    SocketAddr::V4(addr) => addr,
                    SocketAddr::V6(_) => return Err(TransferError::DataChannelNotInitialized.into()),
                };
                let reply = self.send_command(&Command::Port(local))?;
                if !reply.is_completion() {
                    return Err(UploadError::ProtocolReply {
                        code: reply.code,
                        text: reply.text,
                    });
                }
                info!("Listening for active data connection on {}", local);
                self.pending = Some(PendingData::Active(listener));
                Ok(reply)
            }
        }
    }

    fn accept_data(&mut self, mode: TransferMode) -> Result<Box<dyn DataChannel>, TransferError> {
        let stream = match (mode, self.pending.take()) {
            (TransferMode::Passive, Some(PendingData::Passive(stream))) => stream,
            (TransferMode::Active, Some(PendingData::Active(listener))) => {
                accept_active(&listener, self.config.accept_attempts)?
            }
            _ => return Err(TransferError::DataChannelNotInitialized),
        };
        Ok(Box::new(TcpDataChannel::new(stream, self.config.buffer_size)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transfer::flow::tests::MockChannel;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    /// Data channel handle that stays inspectable after the upload has
    /// consumed the boxed channel.
    #[derive(Clone, Default)]
    pub(crate) struct SharedChannel(pub Rc<RefCell<MockChannel>>);

    impl Write for SharedChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.borrow_mut().flush()
        }
    }

    impl DataChannel for SharedChannel {
        fn poll_writable(&mut self) -> io::Result<crate::transfer::data_channel::Readiness> {
            self.0.borrow_mut().poll_writable()
        }

        fn close(&mut self) -> io::Result<()> {
            self.0.borrow_mut().close()
        }

        fn abort(&mut self) {
            self.0.borrow_mut().abort()
        }
    }

    /// Scripted connection: replies are served in order, commands are
    /// recorded as rendered (without the terminator).
    #[derive(Default)]
    pub(crate) struct MockConnection {
        pub replies: VecDeque<Reply>,
        pub sent: Vec<String>,
        pub channel: SharedChannel,
        pub prepared: usize,
        pub accept_fails: bool,
    }

    impl MockConnection {
        pub fn with_replies(replies: &[(u16, &str)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(code, text)| Reply::new(*code, *text))
                    .collect(),
                ..Default::default()
            }
        }

        pub fn data(&self) -> std::cell::Ref<'_, MockChannel> {
            self.channel.0.borrow()
        }
    }

    impl FtpConnection for MockConnection {
        fn send_command(&mut self, command: &Command) -> Result<Reply, ControlError> {
            self.sent.push(command.to_string());
            self.read_reply()
        }

        fn read_reply(&mut self) -> Result<Reply, ControlError> {
            self.replies.pop_front().ok_or(ControlError::ConnectionClosed)
        }

        fn prepare_data(&mut self, _mode: TransferMode) -> Result<Reply, UploadError> {
            self.prepared += 1;
            Ok(Reply::new(227, "Entering Passive Mode (127,0,0,1,4,0)"))
        }

        fn accept_data(
            &mut self,
            _mode: TransferMode,
        ) -> Result<Box<dyn DataChannel>, TransferError> {
            if self.accept_fails {
                return Err(TransferError::DataChannelNotInitialized);
            }
            Ok(Box::new(self.channel.clone()))
        }
    }
}
