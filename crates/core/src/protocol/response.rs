use crate::error::{ParseErrorKind, Result, RtspError};

use super::sdp::{self, SessionDescription};

/// Body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Body that is not SDP, or SDP that failed to parse.
    Text(String),
    /// `application/sdp` body.
    Sdp(SessionDescription),
}

/// A decoded RTSP response (RFC 2326 §7).
///
/// Parsed from the text format:
///
/// ```text
/// RTSP/1.0 200 OK\r\n
/// CSeq: 1\r\n
/// Content-Type: application/sdp\r\n
/// Content-Length: 142\r\n
/// \r\n
/// v=0\r\n...
/// ```
///
/// Header lookup is case-insensitive per RFC 2326 §4.2. The body is bounded
/// by `Content-Length` when the header is present.
///
/// A response is decoded from whatever a single read returned. When the
/// declared `Content-Length` exceeds what arrived, the body is kept as
/// received and [`is_truncated`](Self::is_truncated) reports it; nothing
/// is reassembled from later reads.
#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status_code: u16,
    pub status_text: String,
    /// Headers as ordered (name, value) pairs, names stored as received.
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    truncated: bool,
}

impl Response {
    /// Decode a response from the bytes of one read.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(raw);
        let text = text.trim_start();

        if text.is_empty() {
            return Err(RtspError::parse(ParseErrorKind::EmptyResponse));
        }

        let (head, rest) = split_head(text);
        let mut lines = head.lines();

        let status_line = lines
            .next()
            .ok_or(RtspError::parse(ParseErrorKind::EmptyResponse))?;
        let mut parts = status_line.trim().splitn(3, ' ');
        let version = parts.next().unwrap_or_default();
        if !version.starts_with("RTSP/") {
            return Err(RtspError::parse(ParseErrorKind::InvalidStatusLine));
        }
        let status_code: u16 = parts
            .next()
            .and_then(|code| code.parse().ok())
            .ok_or(RtspError::parse(ParseErrorKind::InvalidStatusLine))?;
        let status_text = parts.next().unwrap_or_default().trim().to_string();

        let mut headers = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or(RtspError::parse(ParseErrorKind::InvalidHeader))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let mut response = Response {
            version: version.to_string(),
            status_code,
            status_text,
            headers,
            body: None,
            truncated: false,
        };

        let content_length = response
            .header("Content-Length")
            .and_then(|len| len.parse::<usize>().ok());

        let body = match content_length {
            Some(len) if rest.len() < len => {
                tracing::warn!(
                    declared = len,
                    received = rest.len(),
                    "response body truncated by single read"
                );
                response.truncated = true;
                rest
            }
            Some(len) => rest.get(..len).unwrap_or(rest),
            None => rest,
        };

        if !body.trim().is_empty() {
            response.body = Some(response.decode_body(body));
        }

        Ok(response)
    }

    fn decode_body(&self, body: &str) -> Body {
        let is_sdp = self
            .content_type()
            .is_some_and(|ct| ct.eq_ignore_ascii_case(sdp::CONTENT_TYPE));
        if !is_sdp {
            return Body::Text(body.to_string());
        }
        match SessionDescription::parse(body) {
            Ok(description) => Body::Sdp(description),
            Err(e) => {
                tracing::warn!(error = %e, "SDP body did not parse, keeping raw text");
                Body::Text(body.to_string())
            }
        }
    }

    /// Look up a header value by name (case-insensitive, per RFC 2326 §4.2).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The CSeq echoed by the server (RFC 2326 §12.17).
    pub fn cseq(&self) -> Option<u32> {
        self.header("CSeq").and_then(|v| v.trim().parse().ok())
    }

    /// Session identifier without the `;timeout=` suffix (RFC 2326 §12.37).
    pub fn session(&self) -> Option<&str> {
        self.header("Session")
            .map(|s| s.split(';').next().unwrap_or(s).trim())
            .filter(|s| !s.is_empty())
    }

    /// Session timeout in seconds from `Session: <id>;timeout=<secs>`.
    pub fn session_timeout(&self) -> Option<u64> {
        self.header("Session")?
            .split(';')
            .skip(1)
            .filter_map(|param| param.trim().split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("timeout"))
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    pub fn transport(&self) -> Option<&str> {
        self.header("Transport")
    }

    pub fn content_base(&self) -> Option<&str> {
        self.header("Content-Base")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// `Connection` header; `close` means the server dropped the connection.
    pub fn connection(&self) -> Option<&str> {
        self.header("Connection")
    }

    /// Whether the server announced it closed the connection.
    pub fn connection_closed(&self) -> bool {
        self.connection()
            .is_some_and(|c| c.eq_ignore_ascii_case("close") || c.eq_ignore_ascii_case("closed"))
    }

    /// `Public` header listing the methods the server supports (RFC 2326 §12.28).
    pub fn public(&self) -> Option<&str> {
        self.header("Public")
    }

    pub fn session_description(&self) -> Option<&SessionDescription> {
        match &self.body {
            Some(Body::Sdp(description)) => Some(description),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The declared `Content-Length` exceeded the bytes received.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Split at the first blank line into (status line + headers, body).
fn split_head(text: &str) -> (&str, &str) {
    match (text.find("\r\n\r\n"), text.find("\n\n")) {
        (Some(crlf), Some(lf)) if lf < crlf => (&text[..lf], &text[lf + 2..]),
        (Some(crlf), _) => (&text[..crlf], &text[crlf + 4..]),
        (None, Some(lf)) => (&text[..lf], &text[lf + 2..]),
        (None, None) => (text, ""),
    }
}
