//! Client-side playback selection for aggregated watch sources.
//!
//! The aggregator assigns every source a playback kind; this crate dispatches
//! on that closed enum and manages the adaptive-streaming session lifecycle
//! (bounded recovery, teardown ordering, manual switching).

pub mod session;
pub mod state;

pub use session::{EngineFactory, PlaybackSession, Player, StreamEngine};
pub use state::{transition, Effect, PlayerState, StreamEvent};
