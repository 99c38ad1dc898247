//! Centralized tuning constants for Recall game logic.
//!
//! These are the defaults every `GameConfig` starts from. Keeping them
//! together means pacing and scoring can only drift through reviewed code
//! changes or an explicit configuration override.

// Session ------------------------------------------------------------------
pub(crate) const DEFAULT_TOTAL_LIVES: u8 = 3;
pub(crate) const DEFAULT_BASE_SEQUENCE_LENGTH: usize = 3;
pub(crate) const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 12;
pub(crate) const DEFAULT_LEVEL_UP_EVERY_N_ROUNDS: u32 = 5;
pub(crate) const STARTING_LEVEL: u32 = 1;
pub(crate) const STARTING_ROUND: u32 = 1;

// Pacing (milliseconds) ----------------------------------------------------
pub(crate) const DEFAULT_REVEAL_MS: u64 = 600;
pub(crate) const DEFAULT_GAP_MS: u64 = 400;
pub(crate) const DEFAULT_SETTLE_MS: u64 = 800;
pub(crate) const DEFAULT_FEEDBACK_MS: u64 = 1500;
pub(crate) const DEFAULT_LEVEL_UP_MS: u64 = 2000;

// Scoring ------------------------------------------------------------------
pub(crate) const POINTS_PER_SYMBOL: f64 = 10.0;
pub(crate) const DEFAULT_HINT_COST_POINTS: u32 = 5;
pub(crate) const EASY_MULTIPLIER: f32 = 1.0;
pub(crate) const MEDIUM_MULTIPLIER: f32 = 1.5;
pub(crate) const HARD_MULTIPLIER: f32 = 2.0;

// Achievements -------------------------------------------------------------
pub(crate) const HIGH_SCORER_MIN_SCORE: u32 = 500;
pub(crate) const PERFECT_PLAYER_MIN_ROUNDS: u32 = 10;
pub(crate) const LEVEL_MASTER_MIN_LEVEL: u32 = 5;
pub(crate) const SHARP_MEMORY_MIN_ROUNDS: u32 = 5;

// RNG domain tags ----------------------------------------------------------
pub(crate) const RNG_STREAM_SEQUENCE: &[u8] = b"sequence";
