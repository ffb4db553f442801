use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::Connection;

/// Blocking TCP control connection.
///
/// Each call re-arms the socket's read or write timeout so that
/// [`Transport::exchange`](super::Transport::exchange) can spread one
/// deadline over both phases.
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Resolve `authority` (`host:port`) and connect to the first address
    /// that accepts within `timeout`.
    pub fn connect(authority: &str, timeout: Duration) -> io::Result<Self> {
        let mut last_error = None;

        for addr in authority.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    tracing::info!(%addr, "connected to RTSP server");
                    return Ok(Self::from_stream(stream));
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no addresses for {authority}"),
            )
        }))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not disable Nagle");
        }
        TcpConnection { stream }
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> io::Result<()> {
        self.stream.set_write_timeout(Some(timeout))?;
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn receive(&mut self, max_bytes: usize, timeout: Duration) -> io::Result<Vec<u8>> {
        self.stream.set_read_timeout(Some(timeout))?;
        let mut buffer = vec![0u8; max_bytes];
        let read = self.stream.read(&mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }
}
