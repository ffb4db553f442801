use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::Connection;

/// One scripted outcome of a `receive` call.
#[derive(Debug, Clone)]
enum Reply {
    Data(Vec<u8>),
    Timeout,
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    sent: Vec<Vec<u8>>,
    send_error: Option<io::ErrorKind>,
}

/// In-memory connection that answers from a script.
///
/// Clones share the same script, so a test can keep one handle, give the
/// other to the client, then queue replies and inspect what was sent.
/// When the script runs dry `receive` returns no bytes, as a closed socket
/// would.
///
/// ```
/// use rtsp::transport::MemoryConnection;
///
/// let conn = MemoryConnection::new();
/// conn.push_reply("RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\n");
/// assert!(conn.sent().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    script: Arc<Mutex<Script>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw response text for the next `receive`.
    pub fn push_reply(&self, reply: &str) {
        self.script
            .lock()
            .replies
            .push_back(Reply::Data(reply.as_bytes().to_vec()));
    }

    /// Make the next `receive` time out.
    pub fn push_timeout(&self) {
        self.script.lock().replies.push_back(Reply::Timeout);
    }

    /// Make the next `receive` fail with an I/O error.
    pub fn push_error(&self, kind: io::ErrorKind) {
        self.script.lock().replies.push_back(Reply::Error(kind));
    }

    /// Fail every `send` from now on.
    pub fn fail_sends(&self, kind: io::ErrorKind) {
        self.script.lock().send_error = Some(kind);
    }

    /// Every request written so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.script
            .lock()
            .sent
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// The most recent request written.
    pub fn last_sent(&self) -> Option<String> {
        self.script
            .lock()
            .sent
            .last()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Connection for MemoryConnection {
    fn send(&mut self, bytes: &[u8], _timeout: Duration) -> io::Result<()> {
        let mut script = self.script.lock();
        if let Some(kind) = script.send_error {
            return Err(io::Error::new(kind, "scripted send failure"));
        }
        script.sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, max_bytes: usize, _timeout: Duration) -> io::Result<Vec<u8>> {
        match self.script.lock().replies.pop_front() {
            Some(Reply::Data(mut data)) => {
                data.truncate(max_bytes);
                Ok(data)
            }
            Some(Reply::Timeout) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "scripted timeout",
            )),
            Some(Reply::Error(kind)) => Err(io::Error::new(kind, "scripted receive failure")),
            None => Ok(Vec::new()),
        }
    }
}
