//! Geʽez Learn Core - progression store and game sessions
//!
//! Wraps the pure rules in `geez-logic` with everything that has side
//! effects: one shared progression store, snapshot persistence through a
//! pluggable key-value store, pronunciation audio, and the four game
//! session drivers.
//!
//! # Architecture
//!
//! - **Store**: [`engine::GameStore`] owns the single progression state and
//!   applies events one at a time
//! - **Persistence**: after each change the snapshot is saved through a
//!   [`persistence::KeyValueStore`]; failures never reach the learner
//! - **Sessions**: build rounds from the unlocked pool, report answers, and
//!   drive an injected [`audio::AudioSession`]
//!
//! # Example
//!
//! ```rust
//! use geez_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let game = GameStore::in_memory();
//! let mut audio = NullAudio;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//!
//! let mut session = QuizSession::family(&game, "h", &mut rng).unwrap();
//! while let Some(round) = session.current().cloned() {
//!     session.answer(&game, &round.target, &mut audio);
//! }
//! assert_eq!(game.get_state().tier_for("h"), MasteryTier::Gold);
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod session;

pub use error::{ConfigError, PersistError};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::audio::{AudioAssets, AudioSession, NullAudio, SoundCue};
    pub use crate::config::EngineConfig;
    pub use crate::engine::GameStore;
    pub use crate::persistence::{FileStore, KeyValueStore, MemoryStore, STORAGE_KEY};
    pub use crate::session::{AnswerOutcome, QuizSession, TimedSession, VowelSession};
    pub use geez_logic::mastery::MasteryTier;
    pub use geez_logic::progression::{Event, ProgressionState, Screen};
}
