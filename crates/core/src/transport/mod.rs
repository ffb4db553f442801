//! Control-channel transport.
//!
//! RTSP signaling runs over one byte-stream connection per session. This
//! layer owns that connection and offers exactly one operation to the
//! session layer: send a request and block for the reply, both bounded by a
//! single deadline.
//!
//! - **TCP** ([`tcp`]): the real network connection.
//! - **Memory** ([`memory`]): a scripted connection for running the client
//!   without sockets.
//!
//! A reply is whatever one read returns, capped at
//! [`DEFAULT_MAX_RESPONSE_BYTES`] unless configured otherwise. Responses
//! larger than the cap arrive truncated; see
//! [`Response::is_truncated`](crate::protocol::Response::is_truncated).

pub mod memory;
pub mod tcp;

use std::io;
use std::time::{Duration, Instant};

use crate::error::{Result, RtspError};

pub use memory::MemoryConnection;
pub use tcp::TcpConnection;

/// Upper bound on bytes taken from one read.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 3000;

/// A bidirectional byte stream to an RTSP server.
///
/// Implementations report an expired deadline as an I/O error of kind
/// [`TimedOut`](io::ErrorKind::TimedOut) or
/// [`WouldBlock`](io::ErrorKind::WouldBlock); [`Transport`] maps both to
/// [`RtspError::Timeout`].
pub trait Connection: Send {
    /// Write all of `bytes`, giving up after `timeout`.
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> io::Result<()>;

    /// Block until data arrives or `timeout` elapses and return at most
    /// `max_bytes` of it from a single read.
    fn receive(&mut self, max_bytes: usize, timeout: Duration) -> io::Result<Vec<u8>>;
}

/// Owns the connection and runs one send-then-receive under one deadline.
pub struct Transport {
    connection: Box<dyn Connection>,
    max_response_bytes: usize,
}

impl Transport {
    pub fn new(connection: Box<dyn Connection>, max_response_bytes: usize) -> Self {
        Transport {
            connection,
            max_response_bytes,
        }
    }

    /// Send `request` and wait for the reply. The whole exchange must finish
    /// within `timeout`.
    pub fn exchange(&mut self, request: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let expired = || RtspError::Timeout { timeout };

        self.connection
            .send(request, timeout)
            .map_err(|e| classify(e, timeout))?;

        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
            .ok_or_else(expired)?;

        let reply = self
            .connection
            .receive(self.max_response_bytes, remaining)
            .map_err(|e| classify(e, timeout))?;

        if reply.is_empty() {
            return Err(RtspError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }

        if reply.len() >= self.max_response_bytes {
            tracing::debug!(
                max_bytes = self.max_response_bytes,
                "reply filled the receive buffer and may be truncated"
            );
        }

        Ok(reply)
    }
}

fn classify(error: io::Error, timeout: Duration) -> RtspError {
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => RtspError::Timeout { timeout },
        _ => RtspError::Io(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_returns_reply() {
        let conn = MemoryConnection::new();
        conn.push_reply("RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\n");
        let mut transport = Transport::new(Box::new(conn.clone()), DEFAULT_MAX_RESPONSE_BYTES);

        let reply = transport
            .exchange(b"OPTIONS * RTSP/1.0\r\nCSeq: 1\r\n\r\n", Duration::from_secs(1))
            .unwrap();
        assert!(reply.starts_with(b"RTSP/1.0 200 OK"));
        assert_eq!(conn.sent().len(), 1);
    }

    #[test]
    fn timeout_is_classified() {
        let conn = MemoryConnection::new();
        conn.push_timeout();
        let mut transport = Transport::new(Box::new(conn), DEFAULT_MAX_RESPONSE_BYTES);

        let err = transport
            .exchange(b"OPTIONS * RTSP/1.0\r\n\r\n", Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, RtspError::Timeout { timeout } if timeout == Duration::from_secs(2)));
    }

    #[test]
    fn io_failure_is_classified() {
        let conn = MemoryConnection::new();
        conn.fail_sends(io::ErrorKind::BrokenPipe);
        let mut transport = Transport::new(Box::new(conn), DEFAULT_MAX_RESPONSE_BYTES);

        let err = transport
            .exchange(b"OPTIONS * RTSP/1.0\r\n\r\n", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, RtspError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn reply_is_capped_at_max_bytes() {
        let conn = MemoryConnection::new();
        conn.push_reply(&"x".repeat(5000));
        let mut transport = Transport::new(Box::new(conn), 3000);

        let reply = transport
            .exchange(b"DESCRIBE * RTSP/1.0\r\n\r\n", Duration::from_secs(1))
            .unwrap();
        assert_eq!(reply.len(), 3000);
    }

    #[test]
    fn closed_connection_is_an_io_error() {
        let conn = MemoryConnection::new();
        let mut transport = Transport::new(Box::new(conn), DEFAULT_MAX_RESPONSE_BYTES);

        let err = transport
            .exchange(b"OPTIONS * RTSP/1.0\r\n\r\n", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, RtspError::Io(_)));
    }
}
