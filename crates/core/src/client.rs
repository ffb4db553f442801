use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{CallError, CallResult, Result, RtspError, SessionErrorKind};
use crate::locator::ServerLocator;
use crate::protocol::request::USER_AGENT;
use crate::protocol::{Method, Request, Response, SessionDescription, sdp};
use crate::session::{ControlTracks, SessionState, TransportDescriptor};
use crate::transport::{Connection, DEFAULT_MAX_RESPONSE_BYTES, TcpConnection, Transport};

/// Deadline for one request/response exchange unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Log target for request and response wire text.
pub const WIRE_TARGET: &str = "rtsp::wire";

/// Client-level configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline covering send and receive of one request.
    pub timeout: Duration,
    /// Upper bound on bytes read for one response.
    pub max_response_bytes: usize,
    /// Emit every request and response line by line at `debug` level
    /// under the [`WIRE_TARGET`] target.
    pub log_messages: bool,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Reject values that would make every exchange fail.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(RtspError::InvalidConfig("timeout must be greater than zero"));
        }
        if self.max_response_bytes == 0 {
            return Err(RtspError::InvalidConfig("max_response_bytes must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            log_messages: false,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// RTSP control-session client.
///
/// One `Client` drives one session over one connection. Each control method
/// is a blocking call that builds the request, waits for the reply, checks
/// the echoed CSeq and the status class, and on success updates the cached
/// session state before bumping the sequence number.
///
/// Calls return [`CallResult`]: the response on 2xx, otherwise a
/// [`CallError`] holding the classified error and whatever response arrived.
/// Failures are also logged where they happen. A 4xx/5xx response carrying
/// `Connection: close` resets the session to [`SessionState::Init`] before
/// the error is returned.
///
/// The client is not meant to be shared between threads; open one client
/// per connection.
pub struct Client {
    server: ServerLocator,
    config: ClientConfig,
    transport: Transport,
    cseq: u32,
    session: Option<String>,
    session_timeout: Option<u64>,
    state: SessionState,
    supported_methods: BTreeSet<Method>,
    transport_descriptor: Option<TransportDescriptor>,
    description: Option<SessionDescription>,
    content_base: Option<String>,
    tracks: Option<ControlTracks>,
}

impl Client {
    /// Connect over TCP to the server named by `url`.
    ///
    /// A missing scheme means `rtsp`; a missing port means 554.
    pub fn connect(url: &str, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let server = ServerLocator::parse(url)?;
        let connection = TcpConnection::connect(&server.authority(), config.timeout)?;
        Ok(Self::from_parts(server, config, Box::new(connection)))
    }

    /// Build a client over an already established connection.
    pub fn with_connection(
        url: &str,
        config: ClientConfig,
        connection: Box<dyn Connection>,
    ) -> Result<Self> {
        config.validate()?;
        let server = ServerLocator::parse(url)?;
        Ok(Self::from_parts(server, config, connection))
    }

    fn from_parts(
        server: ServerLocator,
        config: ClientConfig,
        connection: Box<dyn Connection>,
    ) -> Self {
        tracing::debug!(server = %server, timeout = ?config.timeout, "RTSP client created");
        Self {
            transport: Transport::new(connection, config.max_response_bytes),
            server,
            config,
            cseq: 1,
            session: None,
            session_timeout: None,
            state: SessionState::Init,
            supported_methods: BTreeSet::new(),
            transport_descriptor: None,
            description: None,
            content_base: None,
            tracks: None,
        }
    }

    /// Point the client at another server URL. The connection is kept.
    pub fn set_server_url(&mut self, url: &str) -> Result<()> {
        self.server = ServerLocator::parse(url)?;
        tracing::debug!(server = %self.server, "server URL replaced");
        Ok(())
    }

    pub fn server(&self) -> &ServerLocator {
        &self.server
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sequence number the next request will carry.
    pub fn cseq(&self) -> u32 {
        self.cseq
    }

    /// Session identifier from the last successful SETUP.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Session timeout in seconds advertised by the server, if any.
    pub fn session_timeout(&self) -> Option<u64> {
        self.session_timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Methods from the last successful OPTIONS `Public` header.
    pub fn supported_methods(&self) -> &BTreeSet<Method> {
        &self.supported_methods
    }

    /// Transport confirmed by the last successful SETUP.
    pub fn transport(&self) -> Result<&TransportDescriptor> {
        self.transport_descriptor
            .as_ref()
            .ok_or(RtspError::session(SessionErrorKind::NoTransport))
    }

    /// Session description from the last successful DESCRIBE.
    pub fn session_description(&self) -> Result<&SessionDescription> {
        self.description
            .as_ref()
            .ok_or(RtspError::session(SessionErrorKind::NoSessionDescription))
    }

    /// Base URL that control attributes are resolved against.
    pub fn content_base(&self) -> Result<&str> {
        self.content_base
            .as_deref()
            .ok_or(RtspError::session(SessionErrorKind::NoSessionDescription))
    }

    /// URL controlling every track of the presentation together.
    pub fn aggregate_control_track(&self) -> Result<&str> {
        Ok(self.control_tracks()?.aggregate.as_str())
    }

    /// One control URL per media `control` attribute, in SDP order.
    pub fn media_control_tracks(&self) -> Result<&[String]> {
        Ok(&self.control_tracks()?.media)
    }

    fn control_tracks(&self) -> Result<&ControlTracks> {
        self.tracks
            .as_ref()
            .ok_or(RtspError::session(SessionErrorKind::NoSessionDescription))
    }

    /// OPTIONS (RFC 2326 §10.1). Records the server's `Public` methods.
    pub fn options(&mut self, headers: &[(&str, &str)]) -> CallResult {
        let uri = self.server.to_string();
        self.request(Method::Options, &uri, headers, None)
    }

    /// DESCRIBE (RFC 2326 §10.2). Caches the SDP and derives control tracks.
    pub fn describe(&mut self, headers: &[(&str, &str)]) -> CallResult {
        let uri = self.server.to_string();
        self.request(Method::Describe, &uri, headers, None)
    }

    /// ANNOUNCE (RFC 2326 §10.3). Posts `description` to `url`.
    pub fn announce(
        &mut self,
        url: &str,
        description: &SessionDescription,
        headers: &[(&str, &str)],
    ) -> CallResult {
        let body = Body::new(sdp::CONTENT_TYPE, description.to_string());
        self.request(Method::Announce, url, headers, Some(body))
    }

    /// SETUP (RFC 2326 §10.4). Stores the session identifier and transport.
    pub fn setup(&mut self, track: &str, headers: &[(&str, &str)]) -> CallResult {
        self.request(Method::Setup, track, headers, None)
    }

    /// PLAY (RFC 2326 §10.5).
    pub fn play(&mut self, track: &str, headers: &[(&str, &str)]) -> CallResult {
        self.request(Method::Play, track, headers, None)
    }

    /// PAUSE (RFC 2326 §10.6).
    pub fn pause(&mut self, track: &str, headers: &[(&str, &str)]) -> CallResult {
        self.request(Method::Pause, track, headers, None)
    }

    /// TEARDOWN (RFC 2326 §10.7). Clears the session identifier.
    pub fn teardown(&mut self, track: &str, headers: &[(&str, &str)]) -> CallResult {
        self.request(Method::Teardown, track, headers, None)
    }

    /// GET_PARAMETER (RFC 2326 §10.8). An empty `body` makes it a keepalive.
    pub fn get_parameter(
        &mut self,
        track: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> CallResult {
        let body = Body::parameters(body);
        self.request(Method::GetParameter, track, headers, body)
    }

    /// SET_PARAMETER (RFC 2326 §10.9).
    pub fn set_parameter(
        &mut self,
        track: &str,
        parameters: &str,
        headers: &[(&str, &str)],
    ) -> CallResult {
        let body = Body::parameters(parameters);
        self.request(Method::SetParameter, track, headers, body)
    }

    /// RECORD (RFC 2326 §10.11).
    pub fn record(&mut self, track: &str, headers: &[(&str, &str)]) -> CallResult {
        self.request(Method::Record, track, headers, None)
    }

    /// Run `op` only once SETUP has produced a session identifier.
    pub fn ensure_session<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> T,
    {
        if self.session.is_none() {
            return Err(RtspError::session(SessionErrorKind::NoSession));
        }
        Ok(op(self))
    }

    /// Check a response CSeq against the sequence number just sent.
    pub fn compare_sequence_number(&self, server: Option<u32>) -> Result<()> {
        if server != Some(self.cseq) {
            return Err(RtspError::SequenceMismatch {
                client: self.cseq,
                server,
            });
        }
        Ok(())
    }

    /// Check a response session identifier against the client's session.
    pub fn compare_session_number(&self, server: Option<&str>) -> Result<()> {
        if self.session.as_deref() != server {
            return Err(RtspError::SessionMismatch {
                client: self.session.clone(),
                server: server.map(str::to_string),
            });
        }
        Ok(())
    }

    fn build(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Body>,
    ) -> Request {
        let cseq = self.cseq.to_string();
        let mut standard = vec![("CSeq", cseq.as_str())];
        if let Some(session) = &self.session {
            standard.push(("Session", session.as_str()));
        }

        let mut request = Request::with_user_agent(method, uri, &self.config.user_agent)
            .with_headers(standard);

        if let Some(body) = body {
            request = request
                .add_header("Content-Type", body.content_type)
                .with_body(body.text);
        }

        request.add_headers(headers.iter().copied())
    }

    /// Build, dispatch, validate and classify one request.
    fn request(
        &mut self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Body>,
    ) -> CallResult {
        let request = self.build(method, uri, headers, body);
        let wire = request.serialize();

        tracing::debug!(
            method = %request.method,
            uri = %request.uri,
            cseq = self.cseq,
            "sending request"
        );
        self.log_wire("C->S", &wire);

        let raw = match self.transport.exchange(wire.as_bytes(), self.config.timeout) {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(&request, e, None)),
        };
        self.log_wire("S->C", &String::from_utf8_lossy(&raw));

        let response = match Response::parse(&raw) {
            Ok(response) => response,
            Err(e) => return Err(self.fail(&request, e, None)),
        };

        tracing::debug!(
            status = response.status_code,
            cseq = ?response.cseq(),
            "received response"
        );

        if let Err(e) = self.compare_sequence_number(response.cseq()) {
            return Err(self.fail(&request, e, Some(response)));
        }

        if response.is_success() {
            if let Err(e) = self.complete(&request.method, &response) {
                return Err(self.fail(&request, e, Some(response)));
            }
            self.cseq += 1;
            return Ok(response);
        }

        match response.status_code {
            400..=599 => {
                if response.connection_closed() {
                    tracing::info!(
                        status = response.status_code,
                        "server closed the connection, resetting session"
                    );
                    self.reset_state();
                }
                let error = RtspError::Protocol {
                    code: response.status_code,
                    reason: response.status_text.clone(),
                };
                Err(self.fail(&request, error, Some(response)))
            }
            code => Err(self.fail(
                &request,
                RtspError::UnrecognizedStatus { code },
                Some(response),
            )),
        }
    }

    /// Apply the effects of a 2xx response.
    fn complete(&mut self, method: &Method, response: &Response) -> Result<()> {
        match method {
            Method::Options => {
                self.supported_methods = response
                    .public()
                    .map(Method::parse_list)
                    .unwrap_or_default();
            }
            Method::Describe => self.store_description(response),
            Method::Setup => {
                let transport = response
                    .transport()
                    .map(TransportDescriptor::parse)
                    .transpose()?;
                if transport.is_none() {
                    tracing::warn!("SETUP response has no Transport header");
                }
                self.session = response.session().map(str::to_string);
                self.session_timeout = response.session_timeout();
                self.transport_descriptor = transport;
                tracing::info!(session = ?self.session, "session established");
            }
            Method::Teardown => {
                self.session = None;
                self.session_timeout = None;
            }
            _ => {}
        }

        let next = self.state.next(method);
        if next != self.state {
            tracing::debug!(
                old_state = %self.state,
                new_state = %next,
                %method,
                "state transition"
            );
            self.state = next;
        }
        Ok(())
    }

    fn store_description(&mut self, response: &Response) {
        let content_base = response
            .content_base()
            .map(str::to_string)
            .unwrap_or_else(|| self.server.base_url());

        self.description = response.session_description().cloned();
        self.tracks = self
            .description
            .as_ref()
            .map(|description| ControlTracks::derive(&content_base, description));
        self.content_base = Some(content_base);

        match &self.tracks {
            Some(tracks) => tracing::debug!(
                aggregate = %tracks.aggregate,
                media_tracks = tracks.media.len(),
                "control tracks derived"
            ),
            None => tracing::warn!("DESCRIBE response carried no SDP body"),
        }
    }

    fn reset_state(&mut self) {
        self.state = SessionState::Init;
        self.session = None;
        self.session_timeout = None;
    }

    fn fail(&self, request: &Request, error: RtspError, response: Option<Response>) -> CallError {
        tracing::warn!(
            method = %request.method,
            uri = %request.uri,
            cseq = self.cseq,
            error = %error,
            "request failed"
        );
        CallError::new(error, response)
    }

    fn log_wire(&self, direction: &str, text: &str) {
        if !self.config.log_messages {
            return;
        }
        for line in text.lines() {
            tracing::debug!(target: WIRE_TARGET, "{direction} {line}");
        }
    }
}

/// Request body with its media type.
struct Body {
    content_type: &'static str,
    text: String,
}

impl Body {
    fn new(content_type: &'static str, text: String) -> Self {
        Body { content_type, text }
    }

    /// `text/parameters` body for GET_PARAMETER / SET_PARAMETER, if any.
    fn parameters(text: &str) -> Option<Self> {
        (!text.is_empty()).then(|| Body::new("text/parameters", text.to_string()))
    }
}
