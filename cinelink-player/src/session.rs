//! Playback sessions and the single-active-session controller.

use cinelink_core::models::{PlaybackType, Source};

use crate::state::{transition, Effect, PlayerState, StreamEvent};

/// Abstraction over the adaptive-streaming engine (or the glue around a
/// natively capable surface). The embedder supplies the real implementation.
pub trait StreamEngine {
    /// Begin loading the manifest at `url` against the playback surface
    fn attach(&mut self, url: &str);
    /// Restart the current manifest/segment load after a network failure
    fn start_load(&mut self);
    /// One-shot media-error recovery
    fn recover_media(&mut self);
    /// Release decoder and surface resources
    fn destroy(&mut self);
}

/// Builds engines for adaptive sources
pub trait EngineFactory {
    fn create(&self) -> Box<dyn StreamEngine>;

    /// Whether the platform surface plays HLS natively. When it does, no
    /// engine is created and the surface drives the stream directly.
    fn native_hls(&self) -> bool {
        false
    }
}

/// Ephemeral per-source playback session. Exactly one exists per mounted
/// player; it is destroyed when the user switches sources or leaves the view.
pub struct PlaybackSession {
    source_id: String,
    playback_type: PlaybackType,
    locator: String,
    state: PlayerState,
    last_error: Option<String>,
    media_recovery_used: bool,
    engine: Option<Box<dyn StreamEngine>>,
}

impl PlaybackSession {
    fn new(source: &Source, engine: Option<Box<dyn StreamEngine>>) -> Self {
        Self {
            source_id: source.id.clone(),
            playback_type: source.playback_type,
            locator: source.locator.clone(),
            state: PlayerState::Loading,
            last_error: None,
            media_recovery_used: false,
            engine,
        }
    }

    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    #[must_use]
    pub const fn playback_type(&self) -> PlaybackType {
        self.playback_type
    }

    #[must_use]
    pub const fn state(&self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Feed an event through the transition table and perform its effect
    pub fn handle(&mut self, event: &StreamEvent) {
        let (next, effect) = transition(
            self.playback_type,
            self.state,
            event,
            self.media_recovery_used,
        );

        if let Some(message) = event.error_message() {
            self.last_error = Some(message.to_string());
        }

        match effect {
            Effect::Attach => {
                if let Some(engine) = &mut self.engine {
                    engine.attach(&self.locator);
                }
            }
            Effect::StartLoad => {
                if let Some(engine) = &mut self.engine {
                    engine.start_load();
                }
            }
            Effect::RecoverMedia => {
                self.media_recovery_used = true;
                if let Some(engine) = &mut self.engine {
                    engine.recover_media();
                }
            }
            Effect::Teardown => self.release(),
            Effect::OpenExternal | Effect::None => {}
        }

        self.state = next;
    }

    /// Release engine resources. Idempotent.
    fn release(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Player controller: owns at most one live session. Switching sources
/// releases the previous session's resources before the next session exists,
/// so the underlying media surface is never contended.
pub struct Player<F: EngineFactory> {
    factory: F,
    active: Option<PlaybackSession>,
}

impl<F: EngineFactory> Player<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            active: None,
        }
    }

    /// Select a source for playback. Re-selecting the already-selected source
    /// is a no-op; selection is permitted regardless of the current state.
    pub fn select(&mut self, source: &Source) {
        if self
            .active
            .as_ref()
            .is_some_and(|session| session.source_id == source.id)
        {
            return;
        }

        // Teardown strictly before the next session is created
        if let Some(mut previous) = self.active.take() {
            previous.release();
        }

        let engine = match source.playback_type {
            PlaybackType::Hls if !self.factory.native_hls() => Some(self.factory.create()),
            _ => None,
        };

        let mut session = PlaybackSession::new(source, engine);
        session.handle(&StreamEvent::Mounted);
        self.active = Some(session);
    }

    /// Leave the view: drop the active session and its resources
    pub fn clear(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.release();
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&PlaybackSession> {
        self.active.as_ref()
    }

    /// Current state; `Idle` when no source is selected
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.active
            .as_ref()
            .map_or(PlayerState::Idle, PlaybackSession::state)
    }

    /// Route a stream event to the active session, if any
    pub fn handle_event(&mut self, event: &StreamEvent) {
        if let Some(session) = &mut self.active {
            session.handle(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinelink_core::models::OriginKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    #[derive(Default)]
    struct EngineLog {
        live: AtomicUsize,
        created: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    struct RecordingEngine {
        log: Arc<EngineLog>,
        destroyed: bool,
    }

    impl StreamEngine for RecordingEngine {
        fn attach(&mut self, url: &str) {
            self.log.calls.lock().push(format!("attach:{url}"));
        }

        fn start_load(&mut self) {
            self.log.calls.lock().push("start_load".to_string());
        }

        fn recover_media(&mut self) {
            self.log.calls.lock().push("recover_media".to_string());
        }

        fn destroy(&mut self) {
            if !self.destroyed {
                self.destroyed = true;
                self.log.live.fetch_sub(1, Ordering::SeqCst);
                self.log.calls.lock().push("destroy".to_string());
            }
        }
    }

    struct RecordingFactory {
        log: Arc<EngineLog>,
        native: bool,
    }

    impl EngineFactory for RecordingFactory {
        fn create(&self) -> Box<dyn StreamEngine> {
            self.log.live.fetch_add(1, Ordering::SeqCst);
            self.log.created.fetch_add(1, Ordering::SeqCst);
            Box::new(RecordingEngine {
                log: self.log.clone(),
                destroyed: false,
            })
        }

        fn native_hls(&self) -> bool {
            self.native
        }
    }

    fn player_with_log() -> (Player<RecordingFactory>, Arc<EngineLog>) {
        let log = Arc::new(EngineLog::default());
        let factory = RecordingFactory {
            log: log.clone(),
            native: false,
        };
        (Player::new(factory), log)
    }

    fn hls_source(id: &str) -> Source {
        Source {
            id: id.to_string(),
            origin: OriginKind::Curated,
            provider: "Archive".to_string(),
            title: "Feature".to_string(),
            quality: "1080p".to_string(),
            playback_type: PlaybackType::Hls,
            locator: format!("https://example.com/{id}/master.m3u8"),
            language: "en".to_string(),
            region_allowlist: Vec::new(),
            status: None,
            size_hint: None,
            seed_hint: None,
            peer_hint: None,
        }
    }

    fn embed_source(id: &str) -> Source {
        Source {
            playback_type: PlaybackType::Embed,
            locator: format!("https://vidsrc.xyz/embed/movie/{id}"),
            ..hls_source(id)
        }
    }

    #[test]
    fn test_network_error_then_reload_returns_to_playing() {
        let (mut player, log) = player_with_log();
        player.select(&hls_source("a"));
        player.handle_event(&StreamEvent::Playing);

        player.handle_event(&StreamEvent::NetworkError("manifest fetch".to_string()));
        assert_eq!(player.active().unwrap().state(), PlayerState::Recovering);

        player.handle_event(&StreamEvent::Playing);
        let session = player.active().unwrap();
        assert_eq!(session.state(), PlayerState::Playing);
        assert_eq!(session.last_error(), Some("manifest fetch"));

        // The engine was asked to reload, never destroyed
        let calls = log.calls.lock();
        assert!(calls.iter().any(|call| call == "start_load"));
        assert!(!calls.iter().any(|call| call == "destroy"));
    }

    #[test]
    fn test_second_media_error_fails_once_and_releases() {
        let (mut player, log) = player_with_log();
        player.select(&hls_source("a"));
        player.handle_event(&StreamEvent::Playing);

        player.handle_event(&StreamEvent::MediaError("stall".to_string()));
        assert_eq!(player.active().unwrap().state(), PlayerState::Recovering);

        player.handle_event(&StreamEvent::MediaError("stall again".to_string()));
        let session = player.active().unwrap();
        assert_eq!(session.state(), PlayerState::Failed);
        assert_eq!(log.live.load(Ordering::SeqCst), 0);

        // Further events leave the terminal state untouched
        player.handle_event(&StreamEvent::Playing);
        assert_eq!(player.active().unwrap().state(), PlayerState::Failed);

        let calls = log.calls.lock();
        assert_eq!(
            calls.iter().filter(|call| *call == "recover_media").count(),
            1
        );
        assert_eq!(calls.iter().filter(|call| *call == "destroy").count(), 1);
    }

    #[test]
    fn test_switching_never_holds_two_engines() {
        let (mut player, log) = player_with_log();

        player.select(&hls_source("a"));
        assert_eq!(log.live.load(Ordering::SeqCst), 1);

        player.select(&hls_source("b"));
        assert_eq!(log.live.load(Ordering::SeqCst), 1);

        player.select(&hls_source("a"));
        assert_eq!(log.live.load(Ordering::SeqCst), 1);
        assert_eq!(log.created.load(Ordering::SeqCst), 3);

        // Destroy precedes the next attach on every switch
        let calls = log.calls.lock();
        let sequence: Vec<&str> = calls
            .iter()
            .filter(|call| *call == "destroy" || call.starts_with("attach"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            sequence,
            vec![
                "attach:https://example.com/a/master.m3u8",
                "destroy",
                "attach:https://example.com/b/master.m3u8",
                "destroy",
                "attach:https://example.com/a/master.m3u8",
            ]
        );
    }

    #[test]
    fn test_reselecting_current_source_is_a_noop() {
        let (mut player, log) = player_with_log();

        player.select(&hls_source("a"));
        player.handle_event(&StreamEvent::Playing);
        player.select(&hls_source("a"));

        assert_eq!(log.created.load(Ordering::SeqCst), 1);
        assert_eq!(player.active().unwrap().state(), PlayerState::Playing);
    }

    #[test]
    fn test_switching_away_from_failed_source_recovers() {
        let (mut player, _log) = player_with_log();

        player.select(&hls_source("a"));
        player.handle_event(&StreamEvent::FatalError("engine broke".to_string()));
        assert_eq!(player.active().unwrap().state(), PlayerState::Failed);

        // Failed is terminal per source, but switching always starts fresh
        player.select(&hls_source("b"));
        assert_eq!(player.active().unwrap().state(), PlayerState::Loading);
    }

    #[test]
    fn test_embed_source_needs_no_engine() {
        let (mut player, log) = player_with_log();

        player.select(&embed_source("27205"));
        assert_eq!(log.created.load(Ordering::SeqCst), 0);
        assert_eq!(player.active().unwrap().state(), PlayerState::Playing);
    }

    #[test]
    fn test_native_surface_skips_engine_creation() {
        let log = Arc::new(EngineLog::default());
        let mut player = Player::new(RecordingFactory {
            log: log.clone(),
            native: true,
        });

        player.select(&hls_source("a"));
        assert_eq!(log.created.load(Ordering::SeqCst), 0);
        // The surface drives the stream; state advances on its events
        player.handle_event(&StreamEvent::Playing);
        assert_eq!(player.active().unwrap().state(), PlayerState::Playing);
    }

    #[test]
    fn test_clear_releases_resources() {
        let (mut player, log) = player_with_log();

        player.select(&hls_source("a"));
        assert_eq!(player.state(), PlayerState::Loading);
        player.clear();

        assert!(player.active().is_none());
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(log.live.load(Ordering::SeqCst), 0);
    }
}
