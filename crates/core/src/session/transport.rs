use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ParseErrorKind, Result, RtspError};

/// Delivery mode named in the second field of a Transport header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Unicast,
    /// Default when the server does not say (RFC 2326 §12.39).
    Multicast,
}

impl NetworkType {
    fn parse(field: &str) -> Option<Self> {
        if field.eq_ignore_ascii_case("unicast") {
            Some(NetworkType::Unicast)
        } else if field.eq_ignore_ascii_case("multicast") {
            Some(NetworkType::Multicast)
        } else {
            None
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Unicast => f.write_str("unicast"),
            NetworkType::Multicast => f.write_str("multicast"),
        }
    }
}

/// Transport parameters the server confirmed in a SETUP response
/// (RFC 2326 §12.39).
///
/// ## Wire format example
///
/// ```text
/// Transport: RTP/AVP;unicast;client_port=8000-8001;server_port=5000-5001
/// ```
///
/// The specifier `RTP/AVP[/lower]` gives protocol, profile and optional
/// lower transport. The network type follows when present. Every remaining
/// `key=value` parameter lands in [`extras`](Self::extras); flag parameters
/// such as `append` map to an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDescriptor {
    pub protocol: String,
    pub profile: Option<String>,
    /// `TCP` or `UDP` when the specifier names one. Not acted on.
    pub lower_transport: Option<String>,
    pub network_type: NetworkType,
    pub extras: BTreeMap<String, String>,
}

impl TransportDescriptor {
    /// Parse the `Transport` header value.
    ///
    /// The network type defaults to multicast only when the second field is
    /// absent or is not `unicast`/`multicast`; in the latter case that field
    /// is read as an ordinary parameter.
    ///
    /// ## Examples
    ///
    /// ```
    /// use rtsp::session::{NetworkType, TransportDescriptor};
    ///
    /// let t = TransportDescriptor::parse("RTP/AVP;unicast;client_port=8000-8001").unwrap();
    /// assert_eq!(t.protocol, "RTP");
    /// assert_eq!(t.network_type, NetworkType::Unicast);
    /// assert_eq!(t.port_range("client_port"), Some((8000, 8001)));
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let mut fields = header
            .split(';')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .peekable();

        let specifier = fields
            .next()
            .ok_or(RtspError::parse(ParseErrorKind::EmptyTransport))?;
        let mut parts = specifier.split('/');
        let protocol = parts.next().unwrap_or_default().to_string();
        let profile = parts.next().map(str::to_string);
        let lower_transport = parts.next().map(str::to_ascii_uppercase);

        let network_type = match fields.peek().and_then(|field| NetworkType::parse(field)) {
            Some(network_type) => {
                fields.next();
                network_type
            }
            None => NetworkType::Multicast,
        };

        let extras = fields
            .map(|field| match field.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (field.to_string(), String::new()),
            })
            .collect();

        Ok(TransportDescriptor {
            protocol,
            profile,
            lower_transport,
            network_type,
            extras,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    /// Parse an `a-b` port pair such as `client_port` or `server_port`.
    /// A single port `a` yields `(a, a + 1)`.
    pub fn port_range(&self, key: &str) -> Option<(u16, u16)> {
        let ports = self.get(key)?;
        match ports.split_once('-') {
            Some((rtp, rtcp)) => Some((rtp.trim().parse().ok()?, rtcp.trim().parse().ok()?)),
            None => {
                let rtp: u16 = ports.trim().parse().ok()?;
                Some((rtp, rtp.checked_add(1)?))
            }
        }
    }
}

impl fmt::Display for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.protocol)?;
        if let Some(profile) = &self.profile {
            write!(f, "/{}", profile)?;
        }
        if let Some(lower) = &self.lower_transport {
            write!(f, "/{}", lower)?;
        }
        write!(f, ";{}", self.network_type)?;
        for (key, value) in &self.extras {
            if value.is_empty() {
                write!(f, ";{}", key)?;
            } else {
                write!(f, ";{}={}", key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unicast_with_client_port() {
        let t = TransportDescriptor::parse("RTP/AVP;unicast;client_port=8000-8001").unwrap();
        assert_eq!(t.protocol, "RTP");
        assert_eq!(t.profile.as_deref(), Some("AVP"));
        assert_eq!(t.lower_transport, None);
        assert_eq!(t.network_type, NetworkType::Unicast);
        assert_eq!(t.get("client_port"), Some("8000-8001"));
        assert_eq!(t.extras.len(), 1);
    }

    #[test]
    fn explicit_multicast_and_lower_transport() {
        let t = TransportDescriptor::parse("RTP/AVP/udp;multicast;destination=224.2.0.1;ttl=16")
            .unwrap();
        assert_eq!(t.lower_transport.as_deref(), Some("UDP"));
        assert_eq!(t.network_type, NetworkType::Multicast);
        assert_eq!(t.get("destination"), Some("224.2.0.1"));
        assert_eq!(t.get("ttl"), Some("16"));
    }

    #[test]
    fn missing_network_type_defaults_to_multicast() {
        let t = TransportDescriptor::parse("RTP/AVP").unwrap();
        assert_eq!(t.network_type, NetworkType::Multicast);

        let t = TransportDescriptor::parse("RTP/AVP/TCP;interleaved=0-1").unwrap();
        assert_eq!(t.network_type, NetworkType::Multicast);
        assert_eq!(t.port_range("interleaved"), Some((0, 1)));
    }

    #[test]
    fn server_port_and_flags() {
        let t = TransportDescriptor::parse(
            "RTP/AVP;unicast;client_port=5000-5001;server_port=6970-6971;ssrc=1A2B3C4D;append",
        )
        .unwrap();
        assert_eq!(t.port_range("server_port"), Some((6970, 6971)));
        assert_eq!(t.get("ssrc"), Some("1A2B3C4D"));
        assert_eq!(t.get("append"), Some(""));
    }

    #[test]
    fn single_port_implies_rtcp_neighbour() {
        let t = TransportDescriptor::parse("RTP/AVP;unicast;client_port=7000").unwrap();
        assert_eq!(t.port_range("client_port"), Some((7000, 7001)));
        assert_eq!(t.port_range("server_port"), None);
    }

    #[test]
    fn empty_header_is_an_error() {
        assert!(TransportDescriptor::parse("").is_err());
        assert!(TransportDescriptor::parse(" ; ").is_err());
    }

    #[test]
    fn display_writes_header_value() {
        let t = TransportDescriptor::parse("RTP/AVP;unicast;client_port=8000-8001").unwrap();
        assert_eq!(t.to_string(), "RTP/AVP;unicast;client_port=8000-8001");
    }
}
