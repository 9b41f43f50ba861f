//! Playback selection state machine.
//!
//! Each transition is a pure function of (playback kind, state, event) plus
//! the session's one-shot media-recovery budget, returning the next state and
//! the side effect the embedder must perform. Nothing here touches a real
//! media engine, so the whole table is testable in isolation.

use serde::{Deserialize, Serialize};

use cinelink_core::models::PlaybackType;

/// Per-source playback lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No source selected
    Idle,
    /// Source selected, surface mounting or stream attaching
    Loading,
    /// Playback in progress (synthetic for embed/external kinds)
    Playing,
    /// Recoverable error being retried
    Recovering,
    /// Unrecoverable; terminal for this source
    Failed,
}

impl PlayerState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Events observed from the playback surface or streaming engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Playback surface mounted and ready
    Mounted,
    /// The engine (or native surface) reached a playable state
    Playing,
    /// Recoverable transport failure (manifest or segment fetch)
    NetworkError(String),
    /// Decode or buffer failure; recoverable at most once
    MediaError(String),
    /// Anything the engine reports as unrecoverable
    FatalError(String),
}

impl StreamEvent {
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::NetworkError(msg) | Self::MediaError(msg) | Self::FatalError(msg) => Some(msg),
            Self::Mounted | Self::Playing => None,
        }
    }
}

/// Side effect the embedder must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Attach the stream to the surface (native or engine-backed)
    Attach,
    /// Re-issue the current manifest/segment load
    StartLoad,
    /// Ask the engine for its one-shot media recovery
    RecoverMedia,
    /// Release the session's engine and surface resources
    Teardown,
    /// Render the call-to-action that opens the external locator
    OpenExternal,
}

/// Pure transition function. `media_recovery_used` is owned by the session
/// and set once the `RecoverMedia` effect has been spent.
#[must_use]
pub fn transition(
    playback_type: PlaybackType,
    state: PlayerState,
    event: &StreamEvent,
    media_recovery_used: bool,
) -> (PlayerState, Effect) {
    // Failed is terminal per source; only selecting another source leaves it
    if state.is_terminal() {
        return (state, Effect::None);
    }

    match playback_type {
        // No error is observable from inside a third-party iframe, so the
        // mount is the entire lifecycle for this kind.
        PlaybackType::Embed => match (state, event) {
            (PlayerState::Loading, StreamEvent::Mounted) => (PlayerState::Playing, Effect::None),
            _ => (state, Effect::None),
        },

        // There is no in-page playback; "Playing" renders the handoff CTA.
        PlaybackType::External => match (state, event) {
            (PlayerState::Loading, StreamEvent::Mounted) => {
                (PlayerState::Playing, Effect::OpenExternal)
            }
            _ => (state, Effect::None),
        },

        PlaybackType::Hls => match (state, event) {
            (PlayerState::Loading, StreamEvent::Mounted) => (PlayerState::Loading, Effect::Attach),
            (PlayerState::Loading | PlayerState::Recovering, StreamEvent::Playing) => {
                (PlayerState::Playing, Effect::None)
            }
            // Network errors retry without tearing the session down, without
            // limit, while the source stays selected
            (_, StreamEvent::NetworkError(_)) => (PlayerState::Recovering, Effect::StartLoad),
            (_, StreamEvent::MediaError(_)) if !media_recovery_used => {
                (PlayerState::Recovering, Effect::RecoverMedia)
            }
            (_, StreamEvent::MediaError(_) | StreamEvent::FatalError(_)) => {
                (PlayerState::Failed, Effect::Teardown)
            }
            _ => (state, Effect::None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_mount_is_the_whole_lifecycle() {
        let (state, effect) = transition(
            PlaybackType::Embed,
            PlayerState::Loading,
            &StreamEvent::Mounted,
            false,
        );
        assert_eq!(state, PlayerState::Playing);
        assert_eq!(effect, Effect::None);

        // Failed is unreachable for embeds: even a fatal event is ignored
        let (state, effect) = transition(
            PlaybackType::Embed,
            PlayerState::Playing,
            &StreamEvent::FatalError("x".to_string()),
            false,
        );
        assert_eq!(state, PlayerState::Playing);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_external_mount_renders_handoff() {
        let (state, effect) = transition(
            PlaybackType::External,
            PlayerState::Loading,
            &StreamEvent::Mounted,
            false,
        );
        assert_eq!(state, PlayerState::Playing);
        assert_eq!(effect, Effect::OpenExternal);
    }

    #[test]
    fn test_hls_network_error_retries_without_failing() {
        let (state, effect) = transition(
            PlaybackType::Hls,
            PlayerState::Playing,
            &StreamEvent::NetworkError("segment fetch".to_string()),
            false,
        );
        assert_eq!(state, PlayerState::Recovering);
        assert_eq!(effect, Effect::StartLoad);

        // Repeated network errors keep retrying; no recovery budget consumed
        let (state, effect) = transition(
            PlaybackType::Hls,
            state,
            &StreamEvent::NetworkError("again".to_string()),
            false,
        );
        assert_eq!(state, PlayerState::Recovering);
        assert_eq!(effect, Effect::StartLoad);

        let (state, effect) = transition(PlaybackType::Hls, state, &StreamEvent::Playing, false);
        assert_eq!(state, PlayerState::Playing);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_hls_media_error_recovers_exactly_once() {
        let (state, effect) = transition(
            PlaybackType::Hls,
            PlayerState::Playing,
            &StreamEvent::MediaError("decode stall".to_string()),
            false,
        );
        assert_eq!(state, PlayerState::Recovering);
        assert_eq!(effect, Effect::RecoverMedia);

        // Budget spent: the second media error is terminal
        let (state, effect) = transition(
            PlaybackType::Hls,
            state,
            &StreamEvent::MediaError("decode stall".to_string()),
            true,
        );
        assert_eq!(state, PlayerState::Failed);
        assert_eq!(effect, Effect::Teardown);
    }

    #[test]
    fn test_hls_fatal_error_fails_immediately() {
        let (state, effect) = transition(
            PlaybackType::Hls,
            PlayerState::Loading,
            &StreamEvent::FatalError("engine broke".to_string()),
            false,
        );
        assert_eq!(state, PlayerState::Failed);
        assert_eq!(effect, Effect::Teardown);
    }

    #[test]
    fn test_failed_is_terminal() {
        for event in [
            StreamEvent::Mounted,
            StreamEvent::Playing,
            StreamEvent::NetworkError("x".to_string()),
            StreamEvent::MediaError("x".to_string()),
        ] {
            let (state, effect) = transition(PlaybackType::Hls, PlayerState::Failed, &event, true);
            assert_eq!(state, PlayerState::Failed);
            assert_eq!(effect, Effect::None);
        }
    }
}
