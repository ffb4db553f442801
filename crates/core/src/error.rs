//! Error types for the RTSP client library.

use std::fmt;
use std::time::Duration;

use crate::protocol::Response;

/// Errors that can occur while driving an RTSP control session.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Transport**: [`Io`](Self::Io), [`Timeout`](Self::Timeout): the
///   request never produced a response.
/// - **Validation**: [`SequenceMismatch`](Self::SequenceMismatch),
///   [`SessionMismatch`](Self::SessionMismatch): the response belongs to
///   some other request or session.
/// - **Protocol**: [`Protocol`](Self::Protocol),
///   [`UnrecognizedStatus`](Self::UnrecognizedStatus): the server refused
///   the request.
/// - **Session**: [`Session`](Self::Session): the operation needs state
///   that an earlier SETUP or DESCRIBE would have established.
/// - **Decoding**: [`Parse`](Self::Parse): malformed text on the wire.
/// - **Setup**: [`InvalidConfig`](Self::InvalidConfig): the client was
///   configured with values no exchange could succeed under.
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The send-then-receive exchange did not finish before the deadline.
    #[error("request took more than {} seconds", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// The response CSeq does not echo the request CSeq (RFC 2326 §12.17).
    #[error("sequence number mismatch (client: {client}, server: {})", display_opt(.server))]
    SequenceMismatch { client: u32, server: Option<u32> },

    /// The response Session header does not match the client's session.
    #[error(
        "session number mismatch (client: {}, server: {})",
        display_opt(.client),
        display_opt(.server)
    )]
    SessionMismatch {
        client: Option<String>,
        server: Option<String>,
    },

    /// The server answered with a 4xx or 5xx status.
    #[error("{code}: {reason}")]
    Protocol { code: u16, reason: String },

    /// The status code is outside the 2xx/4xx/5xx classes.
    #[error("unrecognized response status: {code}")]
    UnrecognizedStatus { code: u16 },

    /// The operation needs session state that has not been established.
    #[error("{kind}")]
    Session { kind: SessionErrorKind },

    /// A client configuration value cannot be used.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(&'static str),

    /// Failed to parse text received from the server or supplied by the caller.
    #[error("RTSP parse error: {kind}")]
    Parse { kind: ParseErrorKind },
}

impl RtspError {
    pub(crate) fn parse(kind: ParseErrorKind) -> Self {
        RtspError::Parse { kind }
    }

    pub(crate) fn session(kind: SessionErrorKind) -> Self {
        RtspError::Session { kind }
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// State a control operation required but did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// No session identifier yet.
    NoSession,
    /// No session description yet.
    NoSessionDescription,
    /// No transport negotiated yet.
    NoTransport,
}

impl fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => {
                write!(f, "session number not retrieved from server yet; run SETUP first")
            }
            Self::NoSessionDescription => {
                write!(f, "no session description retrieved yet; run DESCRIBE first")
            }
            Self::NoTransport => write!(f, "no transport negotiated yet; run SETUP first"),
        }
    }
}

/// Specific kind of parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input was empty (no status line).
    EmptyResponse,
    /// Status line did not have the expected `Version Code Reason` format.
    InvalidStatusLine,
    /// A header line did not contain a colon separator.
    InvalidHeader,
    /// An SDP line was not of the `<type>=<value>` form.
    InvalidSdpLine(String),
    /// A resource locator could not be split into host, port and path.
    InvalidLocator(String),
    /// A Transport header had no transport specifier.
    EmptyTransport,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResponse => write!(f, "empty response"),
            Self::InvalidStatusLine => write!(f, "invalid status line"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidSdpLine(line) => write!(f, "invalid SDP line: {line}"),
            Self::InvalidLocator(url) => write!(f, "invalid resource locator: {url}"),
            Self::EmptyTransport => write!(f, "empty transport specifier"),
        }
    }
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;

/// Failure of one control operation.
///
/// Carries the classified [`RtspError`] together with whatever response was
/// received before the failure. `response` is `None` when the request never
/// got an answer (I/O error or timeout).
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct CallError {
    #[source]
    pub error: RtspError,
    pub response: Option<Response>,
}

impl CallError {
    pub fn new(error: RtspError, response: Option<Response>) -> Self {
        CallError { error, response }
    }

    /// Status code of the partial response, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status_code)
    }
}

/// Outcome of a control operation: the server's response or a [`CallError`].
pub type CallResult = std::result::Result<Response, CallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_mismatch_message() {
        let err = RtspError::SequenceMismatch {
            client: 3,
            server: Some(8),
        };
        assert_eq!(
            err.to_string(),
            "sequence number mismatch (client: 3, server: 8)"
        );

        let missing = RtspError::SequenceMismatch {
            client: 3,
            server: None,
        };
        assert!(missing.to_string().ends_with("server: none)"));
    }

    #[test]
    fn protocol_error_carries_code_and_reason() {
        let err = RtspError::Protocol {
            code: 454,
            reason: "Session Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "454: Session Not Found");
    }

    #[test]
    fn no_session_message_mentions_setup() {
        let err = RtspError::session(SessionErrorKind::NoSession);
        assert!(err.to_string().contains("SETUP"));
    }
}
