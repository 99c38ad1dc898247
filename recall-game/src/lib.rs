//! Recall Game Engine
//!
//! Platform-agnostic core logic for the Recall sequence-memory game: a
//! seeded sequence is played back with timed pacing, the player reproduces
//! it symbol by symbol, and a lives/levels/score loop runs until every life
//! is gone. This crate has no UI; it emits notifications through
//! [`PresentationSink`] and accepts [`InputEvent`]s.
//!
//! All pacing runs on a virtual millisecond clock owned by the
//! [`ProgressionController`], which makes the engine fully deterministic and
//! testable headlessly. Enable the `async` feature for a tokio driver that
//! maps the virtual clock onto wall time.

pub mod config;
pub mod constants;
pub mod controller;
#[cfg(feature = "async")]
pub mod driver;
pub mod hint;
pub mod input;
pub mod numbers;
pub mod playback;
pub mod result;
pub mod rng;
pub mod scoring;
pub mod seed;
pub mod sequence;
pub mod session;
pub mod sink;
pub mod symbol;
pub mod timer;
pub mod validator;

// Re-export commonly used types
pub use config::{GameConfig, GameConfigError, SequenceLengths, TierCfg, TierTable, Timings};
pub use controller::ProgressionController;
#[cfg(feature = "async")]
pub use driver::{DriverExit, channel_sink, run_realtime};
pub use input::{Disposition, InputEvent};
pub use playback::{PlaybackCue, PlaybackScheduler, PlaybackStep, PlaybackToken};
pub use result::{Achievement, GameSummary, RoundOutcome, RoundResult, achievements_for};
pub use rng::RngBundle;
pub use seed::{encode_share_code, parse_share_code};
pub use session::{GameSession, Phase, PlayerInput, Sequence};
pub use sink::{ForwardSink, Notification, NotificationLog, PresentationSink};
pub use symbol::{Alphabet, Difficulty, Symbol, UnknownSymbol};
pub use timer::{TimerId, TimerQueue};
pub use validator::Validation;
