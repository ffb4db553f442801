//! RTSP protocol messages (RFC 2326), client side.
//!
//! This module handles the text-based RTSP signaling protocol: building
//! requests, decoding responses, and reading SDP session descriptions.
//!
//! ## RTSP message format (RFC 2326 §4)
//!
//! RTSP messages follow HTTP/1.1 syntax with a different method set:
//!
//! ```text
//! DESCRIBE rtsp://server/stream RTSP/1.0\r\n
//! CSeq: 2\r\n
//! Accept: application/sdp\r\n
//! \r\n
//! ```
//!
//! ## Methods
//!
//! | Method | RFC section | Purpose |
//! |--------|-------------|---------|
//! | OPTIONS | §10.1 | Capability discovery |
//! | DESCRIBE | §10.2 | Retrieve SDP session description |
//! | ANNOUNCE | §10.3 | Post a session description to the server |
//! | SETUP | §10.4 | Negotiate transport |
//! | PLAY | §10.5 | Start media delivery |
//! | PAUSE | §10.6 | Suspend media delivery |
//! | TEARDOWN | §10.7 | Destroy session |
//! | GET_PARAMETER | §10.8 | Keepalive / parameter query |
//! | SET_PARAMETER | §10.9 | Set a session parameter |
//! | REDIRECT | §10.10 | Server tells client to go elsewhere |
//! | RECORD | §10.11 | Start recording |

pub mod request;
pub mod response;
pub mod sdp;

use std::fmt;
use std::str::FromStr;

pub use request::Request;
pub use response::Response;
pub use sdp::{Attribute, MediaSection, SessionDescription};

/// Protocol version written on every request line.
pub const RTSP_VERSION: &str = "RTSP/1.0";

/// An RTSP request method.
///
/// Unknown names, for example from a server's `Public` header, are kept as
/// [`Method::Extension`] in upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Options,
    Describe,
    Announce,
    Setup,
    Play,
    Pause,
    Teardown,
    GetParameter,
    SetParameter,
    Redirect,
    Record,
    Extension(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Options => "OPTIONS",
            Method::Describe => "DESCRIBE",
            Method::Announce => "ANNOUNCE",
            Method::Setup => "SETUP",
            Method::Play => "PLAY",
            Method::Pause => "PAUSE",
            Method::Teardown => "TEARDOWN",
            Method::GetParameter => "GET_PARAMETER",
            Method::SetParameter => "SET_PARAMETER",
            Method::Redirect => "REDIRECT",
            Method::Record => "RECORD",
            Method::Extension(name) => name,
        }
    }

    /// Parse a `Public` header value (`"OPTIONS, DESCRIBE, SETUP"`) into methods.
    ///
    /// Empty items are skipped; order and duplicates are not preserved.
    pub fn parse_list(list: &str) -> std::collections::BTreeSet<Method> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "OPTIONS" => Method::Options,
            "DESCRIBE" => Method::Describe,
            "ANNOUNCE" => Method::Announce,
            "SETUP" => Method::Setup,
            "PLAY" => Method::Play,
            "PAUSE" => Method::Pause,
            "TEARDOWN" => Method::Teardown,
            "GET_PARAMETER" => Method::GetParameter,
            "SET_PARAMETER" => Method::SetParameter,
            "REDIRECT" => Method::Redirect,
            "RECORD" => Method::Record,
            _ => Method::Extension(upper),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_public_header() {
        let methods = Method::parse_list("OPTIONS, DESCRIBE, SETUP,PLAY, teardown, FLUSH");
        assert!(methods.contains(&Method::Options));
        assert!(methods.contains(&Method::Describe));
        assert!(methods.contains(&Method::Play));
        assert!(methods.contains(&Method::Teardown));
        assert!(methods.contains(&Method::Extension("FLUSH".to_string())));
        assert_eq!(methods.len(), 6);
    }

    #[test]
    fn wire_names() {
        assert_eq!(Method::GetParameter.to_string(), "GET_PARAMETER");
        assert_eq!("set_parameter".parse::<Method>().unwrap(), Method::SetParameter);
    }

    #[test]
    fn empty_public_header() {
        assert!(Method::parse_list("").is_empty());
        assert!(Method::parse_list(" , ").is_empty());
    }
}
