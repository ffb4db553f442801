use super::{Method, RTSP_VERSION};

/// Client identification string seeded into every request
/// per RFC 2326 §12.41.
pub const USER_AGENT: &str = "rtsp-client/0.1";

/// An outbound RTSP request (RFC 2326 §6).
///
/// Serializes to the standard text format:
///
/// ```text
/// Method SP Request-URI SP RTSP-Version CRLF
/// *(Header: Value CRLF)
/// CRLF
/// [body]
/// ```
///
/// Uses a builder pattern: chain [`with_headers`](Self::with_headers),
/// [`add_headers`](Self::add_headers) and [`with_body`](Self::with_body),
/// then call [`serialize`](Self::serialize). Headers keep insertion order and
/// duplicates are written as-is. `Content-Length` is computed automatically
/// when a body is present.
#[derive(Debug, Clone)]
#[must_use]
pub struct Request {
    pub method: Method,
    /// Request-URI (e.g. `rtsp://host:554/stream/trackID=1`).
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, uri: &str) -> Self {
        Self::with_user_agent(method, uri, USER_AGENT)
    }

    pub fn with_user_agent(method: Method, uri: &str, user_agent: &str) -> Self {
        Request {
            method,
            uri: uri.to_string(),
            headers: vec![("User-Agent".to_string(), user_agent.to_string())],
            body: None,
        }
    }

    /// Append the standard headers the session layer owns (CSeq, Session).
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extend(headers);
        self
    }

    /// Append caller-supplied headers after the standard ones.
    pub fn add_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extend(headers);
        self
    }

    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    fn extend<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// First header with the given name (case-insensitive, RFC 2326 §4.2).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize to the RTSP text wire format.
    ///
    /// If a body is present, `Content-Length` is appended automatically
    /// (RFC 2326 §12.14).
    pub fn serialize(&self) -> String {
        let mut request = format!("{} {} {}\r\n", self.method, self.uri, RTSP_VERSION);

        for (name, value) in &self.headers {
            request.push_str(&format!("{}: {}\r\n", name, value));
        }

        match &self.body {
            Some(body) if !body.is_empty() => {
                request.push_str(&format!("Content-Length: {}\r\n", body.len()));
                request.push_str("\r\n");
                request.push_str(body);
            }
            _ => request.push_str("\r\n"),
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_options() {
        let req = Request::new(Method::Options, "rtsp://localhost:554/test")
            .with_headers([("CSeq", "1")]);
        let s = req.serialize();
        assert!(s.starts_with("OPTIONS rtsp://localhost:554/test RTSP/1.0\r\n"));
        assert!(s.contains("User-Agent: rtsp-client/0.1\r\n"));
        assert!(s.contains("CSeq: 1\r\n"));
        assert!(s.ends_with("\r\n\r\n"));
        assert!(!s.contains("Content-Length"));
    }

    #[test]
    fn caller_headers_follow_standard_headers() {
        let req = Request::new(Method::Play, "rtsp://cam/live")
            .with_headers([("CSeq", "4"), ("Session", "12345")])
            .add_headers([("Range", "npt=0-"), ("CSeq", "99")]);
        let s = req.serialize();
        let cseq = s.find("CSeq: 4").unwrap();
        let session = s.find("Session: 12345").unwrap();
        let range = s.find("Range: npt=0-").unwrap();
        let dup = s.find("CSeq: 99").unwrap();
        assert!(cseq < session && session < range && range < dup);
        assert_eq!(req.get_header("cseq"), Some("4"));
    }

    #[test]
    fn serialize_with_body() {
        let req = Request::new(Method::SetParameter, "rtsp://cam/live")
            .with_headers([("CSeq", "7")])
            .with_body("barparam: barstuff\r\n".to_string());
        let s = req.serialize();
        assert!(s.contains("Content-Length: 20\r\n\r\nbarparam: barstuff\r\n"));
    }

    #[test]
    fn empty_body_writes_no_length() {
        let req = Request::new(Method::GetParameter, "rtsp://cam/live").with_body(String::new());
        assert!(!req.serialize().contains("Content-Length"));
    }
}
