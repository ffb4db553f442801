use crate::protocol::SessionDescription;

/// Name of the SDP attribute carrying a control URL (RFC 2326 §C.1.1).
const CONTROL: &str = "control";

/// Control URLs derived from a DESCRIBE response.
///
/// Each URL is the content base followed by a `control` attribute value.
/// The aggregate URL drives every track at once; `media` holds one URL per
/// `control` attribute under each `m=` section, in section order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTracks {
    pub aggregate: String,
    pub media: Vec<String>,
}

impl ControlTracks {
    /// Derive control URLs for `description` against `content_base`.
    ///
    /// The aggregate URL uses the first session-level `control` attribute
    /// with every `*` removed, so `a=control:*` yields the content base
    /// itself. With no session-level `control` attribute the aggregate URL
    /// is the content base. Media-level values are appended verbatim.
    pub fn derive(content_base: &str, description: &SessionDescription) -> Self {
        let aggregate_control = description.attribute(CONTROL).unwrap_or_default();
        let aggregate = format!("{}{}", content_base, aggregate_control.replace('*', ""));

        let media = description
            .media
            .iter()
            .flat_map(|section| section.attributes.iter())
            .filter(|a| a.name == CONTROL)
            .map(|a| format!("{}{}", content_base, a.value))
            .collect();

        ControlTracks { aggregate, media }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(sdp: &str) -> SessionDescription {
        SessionDescription::parse(sdp).unwrap()
    }

    #[test]
    fn wildcard_aggregate_and_single_track() {
        let sdp = describe("v=0\r\na=control:*\r\nm=audio 0 RTP/AVP 96\r\na=control:trackID=1\r\n");
        let tracks = ControlTracks::derive("rtsp://host/gs.sdp/", &sdp);
        assert_eq!(tracks.aggregate, "rtsp://host/gs.sdp/");
        assert_eq!(tracks.media, vec!["rtsp://host/gs.sdp/trackID=1".to_string()]);
    }

    #[test]
    fn media_tracks_follow_section_order() {
        let sdp = describe(
            "v=0\r\n\
             a=control:*\r\n\
             m=video 0 RTP/AVP 96\r\n\
             a=rtpmap:96 H264/90000\r\n\
             a=control:track1\r\n\
             m=audio 0 RTP/AVP 97\r\n\
             a=control:track2\r\n",
        );
        let tracks = ControlTracks::derive("rtsp://cam:554/live/", &sdp);
        assert_eq!(
            tracks.media,
            vec![
                "rtsp://cam:554/live/track1".to_string(),
                "rtsp://cam:554/live/track2".to_string()
            ]
        );
    }

    #[test]
    fn missing_session_control_uses_content_base() {
        let sdp = describe("v=0\r\nm=video 0 RTP/AVP 96\r\n");
        let tracks = ControlTracks::derive("rtsp://cam/live/", &sdp);
        assert_eq!(tracks.aggregate, "rtsp://cam/live/");
        assert!(tracks.media.is_empty());
    }

    #[test]
    fn media_values_are_not_stripped() {
        let sdp = describe("v=0\r\na=control:agg*\r\nm=video 0 RTP/AVP 96\r\na=control:v*\r\n");
        let tracks = ControlTracks::derive("rtsp://cam/", &sdp);
        assert_eq!(tracks.aggregate, "rtsp://cam/agg");
        assert_eq!(tracks.media, vec!["rtsp://cam/v*".to_string()]);
    }
}
