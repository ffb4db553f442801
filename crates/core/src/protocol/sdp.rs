//! SDP (Session Description Protocol) reading and writing (RFC 4566 / RFC 8866).
//!
//! DESCRIBE responses carry the presentation as SDP text:
//!
//! ```text
//! v=0                                          ← protocol version
//! o=<user> <sess-id> <sess-ver> IN IP4 <addr>  ← origin
//! s=<session-name>                              ← session name
//! c=IN IP4 <addr>                               ← connection address
//! t=0 0                                         ← timing (live stream)
//! a=control:*                                   ← aggregate control URL
//! m=audio 0 RTP/AVP 96                          ← media description
//! a=rtpmap:96 MP4A-LATM/44100/2                 ← codec/clock rate
//! a=control:trackID=1                           ← track control URL
//! ```
//!
//! Only the pieces the client acts on are broken out: the `a=` attributes at
//! session level and under each `m=` section. Other lines are kept as text so
//! the description can be written back out for ANNOUNCE.

use std::fmt;

use crate::error::{ParseErrorKind, Result, RtspError};

/// Media type the client can ask a server for.
pub const CONTENT_TYPE: &str = "application/sdp";

/// One `a=<name>[:<value>]` line. Flag attributes carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((name, value)) => Attribute::new(name.trim(), value.trim()),
            None => Attribute::new(text.trim(), ""),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "a={}", self.name)
        } else {
            write!(f, "a={}:{}", self.name, self.value)
        }
    }
}

/// One `m=` section and everything under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSection {
    /// Media type (`audio`, `video`, `application`).
    pub kind: String,
    /// Port field as written (`0`, `49170/2`).
    pub port: String,
    /// Transport protocol (`RTP/AVP`).
    pub protocol: String,
    /// Format list (payload types for RTP).
    pub formats: Vec<String>,
    /// Non-attribute lines (`b=`, `c=`, `i=`, `k=`) in input order.
    pub lines: Vec<(char, String)>,
    pub attributes: Vec<Attribute>,
}

impl MediaSection {
    fn parse(value: &str) -> Self {
        let mut fields = value.split_whitespace();
        MediaSection {
            kind: fields.next().unwrap_or_default().to_string(),
            port: fields.next().unwrap_or_default().to_string(),
            protocol: fields.next().unwrap_or_default().to_string(),
            formats: fields.map(str::to_string).collect(),
            ..Default::default()
        }
    }

    /// Value of the first attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        find_attribute(&self.attributes, name)
    }
}

/// A parsed SDP session description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDescription {
    /// `v=` protocol version.
    pub version: String,
    /// `o=` origin line.
    pub origin: Option<String>,
    /// `s=` session name.
    pub name: Option<String>,
    /// `i=` session information.
    pub information: Option<String>,
    /// `c=` session-level connection data.
    pub connection: Option<String>,
    /// `t=` timing lines.
    pub timing: Vec<String>,
    /// Other session-level lines (`u=`, `e=`, `p=`, `b=`, `r=`, `z=`, `k=`).
    pub lines: Vec<(char, String)>,
    pub attributes: Vec<Attribute>,
    pub media: Vec<MediaSection>,
}

impl SessionDescription {
    /// Parse SDP text. Blank lines are skipped; any other line must be of the
    /// `<type>=<value>` form.
    pub fn parse(text: &str) -> Result<Self> {
        let mut desc = SessionDescription::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (kind, value) = split_line(line)?;

            if kind == 'm' {
                desc.media.push(MediaSection::parse(value));
                continue;
            }

            if let Some(media) = desc.media.last_mut() {
                match kind {
                    'a' => media.attributes.push(Attribute::parse(value)),
                    _ => media.lines.push((kind, value.to_string())),
                }
                continue;
            }

            match kind {
                'v' => desc.version = value.to_string(),
                'o' => desc.origin = Some(value.to_string()),
                's' => desc.name = Some(value.to_string()),
                'i' => desc.information = Some(value.to_string()),
                'c' => desc.connection = Some(value.to_string()),
                't' => desc.timing.push(value.to_string()),
                'a' => desc.attributes.push(Attribute::parse(value)),
                _ => desc.lines.push((kind, value.to_string())),
            }
        }

        tracing::trace!(
            attributes = desc.attributes.len(),
            media = desc.media.len(),
            "parsed SDP"
        );
        Ok(desc)
    }

    /// Value of the first session-level attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        find_attribute(&self.attributes, name)
    }
}

fn split_line(line: &str) -> Result<(char, &str)> {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(kind), Some('=')) if kind.is_ascii_alphabetic() => Ok((kind, &line[2..])),
        _ => Err(RtspError::parse(ParseErrorKind::InvalidSdpLine(
            line.to_string(),
        ))),
    }
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = if self.version.is_empty() { "0" } else { &self.version };
        write!(f, "v={}\r\n", version)?;
        if let Some(origin) = &self.origin {
            write!(f, "o={}\r\n", origin)?;
        }
        write!(f, "s={}\r\n", self.name.as_deref().unwrap_or(" "))?;
        if let Some(info) = &self.information {
            write!(f, "i={}\r\n", info)?;
        }
        if let Some(connection) = &self.connection {
            write!(f, "c={}\r\n", connection)?;
        }
        for (kind, value) in self.lines.iter().filter(|(k, _)| *k != 'r' && *k != 'z') {
            write!(f, "{}={}\r\n", kind, value)?;
        }
        if self.timing.is_empty() {
            write!(f, "t=0 0\r\n")?;
        }
        for timing in &self.timing {
            write!(f, "t={}\r\n", timing)?;
        }
        for (kind, value) in self.lines.iter().filter(|(k, _)| *k == 'r' || *k == 'z') {
            write!(f, "{}={}\r\n", kind, value)?;
        }
        for attribute in &self.attributes {
            write!(f, "{}\r\n", attribute)?;
        }
        for media in &self.media {
            write!(f, "m={} {} {}", media.kind, media.port, media.protocol)?;
            for format in &media.formats {
                write!(f, " {}", format)?;
            }
            write!(f, "\r\n")?;
            for (kind, value) in &media.lines {
                write!(f, "{}={}\r\n", kind, value)?;
            }
            for attribute in &media.attributes {
                write!(f, "{}\r\n", attribute)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROOVE_SALAD: &str = "v=0\r\n\
        o=- 545877020 467920391 IN IP4 127.0.0.1\r\n\
        s=Groove Salad from SomaFM [aacPlus]\r\n\
        i=Downtempo Ambient Groove\r\n\
        c=IN IP4 0.0.0.0\r\n\
        t=0 0\r\n\
        a=x-qt-text-nam:Groove Salad from SomaFM [aacPlus]\r\n\
        a=control:*\r\n\
        m=audio 0 RTP/AVP 96\r\n\
        b=AS:48\r\n\
        a=rtpmap:96 MP4A-LATM/44100/2\r\n\
        a=fmtp:96 cpresent=0;config=400027200000\r\n\
        a=control:trackID=1\r\n";

    #[test]
    fn parses_session_and_media_attributes() {
        let sdp = SessionDescription::parse(GROOVE_SALAD).unwrap();
        assert_eq!(sdp.version, "0");
        assert_eq!(sdp.name.as_deref(), Some("Groove Salad from SomaFM [aacPlus]"));
        assert_eq!(sdp.attribute("control"), Some("*"));
        assert_eq!(sdp.media.len(), 1);

        let audio = &sdp.media[0];
        assert_eq!(audio.kind, "audio");
        assert_eq!(audio.protocol, "RTP/AVP");
        assert_eq!(audio.formats, vec!["96".to_string()]);
        assert_eq!(audio.attribute("control"), Some("trackID=1"));
        assert_eq!(audio.attribute("rtpmap"), Some("96 MP4A-LATM/44100/2"));
        assert_eq!(audio.lines, vec![('b', "AS:48".to_string())]);
    }

    #[test]
    fn attribute_value_keeps_inner_colons() {
        let sdp = SessionDescription::parse("v=0\na=control:rtsp://cam:554/live\na=recvonly\n")
            .unwrap();
        assert_eq!(sdp.attribute("control"), Some("rtsp://cam:554/live"));
        assert_eq!(sdp.attribute("recvonly"), Some(""));
    }

    #[test]
    fn rejects_garbage_line() {
        assert!(SessionDescription::parse("v=0\r\nnot sdp\r\n").is_err());
    }

    #[test]
    fn writes_back_parseable_text() {
        let sdp = SessionDescription::parse(GROOVE_SALAD).unwrap();
        let text = sdp.to_string();
        assert!(text.starts_with("v=0\r\n"));

        // Session-level attrs must come before the media section
        let control_idx = text.find("a=control:*").expect("aggregate control");
        let m_idx = text.find("m=audio 0 RTP/AVP 96").expect("media section");
        assert!(control_idx < m_idx);

        assert_eq!(SessionDescription::parse(&text).unwrap(), sdp);
    }
}
