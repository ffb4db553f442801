//! Client-side RTSP session state (RFC 2326 §A.1).
//!
//! The client tracks one presentation through a small state machine. Only a
//! successful (2xx) response moves it; the transition is a pure function of
//! the current state and the method that completed:
//!
//! ```text
//! Init      --SETUP-->     Ready
//! *         --PLAY-->      Playing
//! *         --RECORD-->    Recording
//! Playing   --PAUSE-->     Ready
//! Recording --PAUSE-->     Ready
//! *         --TEARDOWN-->  Init
//! ```
//!
//! Every other pair leaves the state unchanged. There is no terminal state:
//! TEARDOWN returns to Init and a new SETUP can follow.

pub mod tracks;
pub mod transport;

use std::fmt;

use crate::protocol::Method;
pub use tracks::ControlTracks;
pub use transport::{NetworkType, TransportDescriptor};

/// RTSP client state machine (RFC 2326 §A.1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session established.
    #[default]
    Init,
    /// SETUP done; not delivering media.
    Ready,
    /// PLAY acknowledged.
    Playing,
    /// RECORD acknowledged.
    Recording,
}

impl SessionState {
    /// State after `method` completed successfully in this state.
    pub fn next(self, method: &Method) -> SessionState {
        use SessionState::*;

        match (self, method) {
            (Init, Method::Setup) => Ready,
            (_, Method::Play) => Playing,
            (_, Method::Record) => Recording,
            (Playing | Recording, Method::Pause) => Ready,
            (_, Method::Teardown) => Init,
            (state, _) => state,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Ready => "ready",
            SessionState::Playing => "playing",
            SessionState::Recording => "recording",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn setup_only_moves_init() {
        assert_eq!(Init.next(&Method::Setup), Ready);
        assert_eq!(Ready.next(&Method::Setup), Ready);
        assert_eq!(Playing.next(&Method::Setup), Playing);
        assert_eq!(Recording.next(&Method::Setup), Recording);
    }

    #[test]
    fn play_and_record_are_unconditional() {
        for state in [Init, Ready, Playing, Recording] {
            assert_eq!(state.next(&Method::Play), Playing);
            assert_eq!(state.next(&Method::Record), Recording);
            assert_eq!(state.next(&Method::Teardown), Init);
        }
    }

    #[test]
    fn pause_only_from_active_states() {
        assert_eq!(Playing.next(&Method::Pause), Ready);
        assert_eq!(Recording.next(&Method::Pause), Ready);
        assert_eq!(Ready.next(&Method::Pause), Ready);
        assert_eq!(Init.next(&Method::Pause), Init);
    }

    #[test]
    fn informational_methods_keep_state() {
        let methods = [
            Method::Options,
            Method::Describe,
            Method::Announce,
            Method::GetParameter,
            Method::SetParameter,
        ];
        for state in [Init, Ready, Playing, Recording] {
            for method in &methods {
                assert_eq!(state.next(method), state, "{method} from {state}");
            }
        }
    }

    #[test]
    fn play_pause_teardown_cycle() {
        let mut state = Init.next(&Method::Setup);
        assert_eq!(state, Ready);
        state = state.next(&Method::Play);
        assert_eq!(state, Playing);
        state = state.next(&Method::Pause);
        assert_eq!(state, Ready);
        state = state.next(&Method::Teardown);
        assert_eq!(state, Init);
    }
}
