//! Output flow control
//!
//! Blocks until the data channel can take more output. This is the only
//! place an upload waits.

use log::{debug, error};
use std::thread;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::TransferError;
use crate::transfer::data_channel::{DataChannel, Readiness};

#[derive(Debug, Clone, Default)]
pub struct FlowController {
    max_polls: Option<usize>,
    interval: Duration,
}

impl FlowController {
    /// `max_polls` of `None` polls until a definitive answer arrives.
    pub fn new(max_polls: Option<usize>, interval: Duration) -> Self {
        Self {
            max_polls,
            interval,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.wait_poll_limit(), config.wait_poll_interval())
    }

    /// Returns once the channel is ready, or fails on the first error.
    ///
    /// Not-ready results are absorbed here and never reach the caller. When
    /// a poll bound is configured, running out of polls is a failure.
    pub fn wait_writable(&self, channel: &mut dyn DataChannel) -> Result<(), TransferError> {
        let mut polls = 0;
        loop {
            polls += 1;
            match channel.poll_writable() {
                Ok(Readiness::Ready) => return Ok(()),
                Ok(Readiness::NotReady) => {
                    if self.max_polls.is_some_and(|max| polls >= max) {
                        error!("Data channel not writable after {} polls", polls);
                        return Err(TransferError::WaitExhausted(polls));
                    }
                    debug!("Data channel not writable yet (poll {})", polls);
                    if !self.interval.is_zero() {
                        thread::sleep(self.interval);
                    }
                }
                Err(e) => {
                    error!("Waiting for data channel failed: {}", e);
                    return Err(TransferError::WaitFailed(e));
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Write};

    /// In-memory data channel with scripted readiness and write failures.
    #[derive(Default)]
    pub(crate) struct MockChannel {
        pub readiness: VecDeque<io::Result<Readiness>>,
        pub polls: usize,
        pub written: Vec<u8>,
        pub fail_write_after: Option<usize>,
        pub short_write: bool,
        /// Most bytes accepted by a single `write` call.
        pub max_write: Option<usize>,
        pub flushes: usize,
        pub closes: usize,
        pub aborts: usize,
    }

    impl Write for MockChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(limit) = self.fail_write_after {
                if self.written.len() >= limit {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
                }
            }
            if self.short_write {
                return Ok(0);
            }
            let n = self.max_write.map_or(buf.len(), |max| buf.len().min(max));
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    impl DataChannel for MockChannel {
        fn poll_writable(&mut self) -> io::Result<Readiness> {
            self.polls += 1;
            self.readiness.pop_front().unwrap_or(Ok(Readiness::Ready))
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes += 1;
            Ok(())
        }

        fn abort(&mut self) {
            self.aborts += 1;
        }
    }

    #[test]
    fn test_not_ready_is_absorbed() {
        let mut channel = MockChannel::default();
        channel.readiness.push_back(Ok(Readiness::NotReady));
        channel.readiness.push_back(Ok(Readiness::NotReady));
        channel.readiness.push_back(Ok(Readiness::Ready));

        FlowController::default().wait_writable(&mut channel).unwrap();
        assert_eq!(channel.polls, 3);
    }

    #[test]
    fn test_error_fails_without_retry() {
        let mut channel = MockChannel::default();
        channel
            .readiness
            .push_back(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));

        let result = FlowController::default().wait_writable(&mut channel);
        assert!(matches!(result, Err(TransferError::WaitFailed(_))));
        assert_eq!(channel.polls, 1);
    }

    #[test]
    fn test_poll_bound_is_a_failure() {
        let mut channel = MockChannel::default();
        for _ in 0..5 {
            channel.readiness.push_back(Ok(Readiness::NotReady));
        }

        let flow = FlowController::new(Some(3), Duration::ZERO);
        let result = flow.wait_writable(&mut channel);
        assert!(matches!(result, Err(TransferError::WaitExhausted(3))));
        assert_eq!(channel.polls, 3);
    }
}
