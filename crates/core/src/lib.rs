//! Synchronous RTSP (RFC 2326) control-channel client.
//!
//! Drives one control session against a media server: OPTIONS, DESCRIBE,
//! ANNOUNCE, SETUP, PLAY, PAUSE, TEARDOWN, GET_PARAMETER, SET_PARAMETER and
//! RECORD. Only signaling is handled; no RTP is received or sent.
//!
//! ```no_run
//! use rtsp::{Client, ClientConfig};
//!
//! let mut client = Client::connect("camera.local/live", ClientConfig::default())?;
//! client.options(&[]).ok();
//! client.describe(&[("Accept", "application/sdp")]).ok();
//! let track = client.media_control_tracks()?[0].clone();
//! client.setup(&track, &[("Transport", "RTP/AVP;unicast;client_port=8000-8001")]).ok();
//! let aggregate = client.aggregate_control_track()?.to_string();
//! client.play(&aggregate, &[]).ok();
//! client.teardown(&aggregate, &[]).ok();
//! # Ok::<(), rtsp::RtspError>(())
//! ```

pub mod client;
pub mod error;
pub mod locator;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{Client, ClientConfig};
pub use error::{CallError, CallResult, Result, RtspError};
pub use locator::ServerLocator;
pub use protocol::{Method, Request, Response, SessionDescription};
pub use session::{ControlTracks, SessionState, TransportDescriptor};
