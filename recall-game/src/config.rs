//! Session configuration and its validation rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::symbol::{Alphabet, Difficulty, Symbol};

const DEFAULT_CONFIG_DATA: &str = include_str!("../assets/config.json");

/// Errors raised when configuration invariants are violated.
///
/// These are the only true errors in the engine: every gameplay event is an
/// expected outcome and never fails.
#[derive(Debug, Error, PartialEq)]
pub enum GameConfigError {
    #[error("alphabet for {difficulty} is empty")]
    EmptyAlphabet { difficulty: Difficulty },
    #[error("alphabet for {difficulty} lists {symbol} more than once")]
    DuplicateSymbol {
        difficulty: Difficulty,
        symbol: Symbol,
    },
    #[error("multiplier for {difficulty} must be finite and positive (got {value})")]
    InvalidMultiplier { difficulty: Difficulty, value: f32 },
    #[error("max sequence length {max} cannot fit base length {base} plus one level")]
    SequenceBounds { base: usize, max: usize },
    #[error("total lives must be at least 1")]
    NoLives,
    #[error("level-up interval must be at least one round")]
    LevelUpInterval,
    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Alphabet and score multiplier for one difficulty tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCfg {
    pub symbols: Alphabet,
    pub multiplier: f32,
}

/// Difficulty-indexed tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default = "TierTable::default_easy")]
    pub easy: TierCfg,
    #[serde(default = "TierTable::default_medium")]
    pub medium: TierCfg,
    #[serde(default = "TierTable::default_hard")]
    pub hard: TierCfg,
}

impl TierTable {
    fn default_easy() -> TierCfg {
        TierCfg {
            symbols: Symbol::ALL[..3].iter().copied().collect(),
            multiplier: constants::EASY_MULTIPLIER,
        }
    }

    fn default_medium() -> TierCfg {
        TierCfg {
            symbols: Symbol::ALL[..4].iter().copied().collect(),
            multiplier: constants::MEDIUM_MULTIPLIER,
        }
    }

    fn default_hard() -> TierCfg {
        TierCfg {
            symbols: Symbol::ALL.iter().copied().collect(),
            multiplier: constants::HARD_MULTIPLIER,
        }
    }

    #[must_use]
    pub const fn tier(&self, difficulty: Difficulty) -> &TierCfg {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            easy: Self::default_easy(),
            medium: Self::default_medium(),
            hard: Self::default_hard(),
        }
    }
}

/// Pacing of playback and feedback pauses, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "Timings::default_reveal_ms")]
    pub reveal_ms: u64,
    #[serde(default = "Timings::default_gap_ms")]
    pub gap_ms: u64,
    #[serde(default = "Timings::default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "Timings::default_feedback_ms")]
    pub feedback_ms: u64,
    #[serde(default = "Timings::default_level_up_ms")]
    pub level_up_ms: u64,
}

impl Timings {
    const fn default_reveal_ms() -> u64 {
        constants::DEFAULT_REVEAL_MS
    }

    const fn default_gap_ms() -> u64 {
        constants::DEFAULT_GAP_MS
    }

    const fn default_settle_ms() -> u64 {
        constants::DEFAULT_SETTLE_MS
    }

    const fn default_feedback_ms() -> u64 {
        constants::DEFAULT_FEEDBACK_MS
    }

    const fn default_level_up_ms() -> u64 {
        constants::DEFAULT_LEVEL_UP_MS
    }

    /// Divide every delay by `factor`, used by the tester to speed up
    /// real-time runs. A factor of zero is treated as one.
    #[must_use]
    pub const fn scaled_down(self, factor: u64) -> Self {
        let factor = if factor == 0 { 1 } else { factor };
        Self {
            reveal_ms: self.reveal_ms / factor,
            gap_ms: self.gap_ms / factor,
            settle_ms: self.settle_ms / factor,
            feedback_ms: self.feedback_ms / factor,
            level_up_ms: self.level_up_ms / factor,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reveal_ms: Self::default_reveal_ms(),
            gap_ms: Self::default_gap_ms(),
            settle_ms: Self::default_settle_ms(),
            feedback_ms: Self::default_feedback_ms(),
            level_up_ms: Self::default_level_up_ms(),
        }
    }
}

/// Sequence length bounds: `min(base + level, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLengths {
    pub base: usize,
    pub max: usize,
}

impl SequenceLengths {
    #[must_use]
    pub fn for_level(self, level: u32) -> usize {
        let level = usize::try_from(level).unwrap_or(usize::MAX);
        self.base.saturating_add(level).min(self.max)
    }
}

/// Recognized engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "GameConfig::default_total_lives")]
    pub total_lives: u8,
    #[serde(default = "GameConfig::default_max_sequence_length")]
    pub max_sequence_length: usize,
    #[serde(default = "GameConfig::default_base_sequence_length")]
    pub base_sequence_length: usize,
    #[serde(default = "GameConfig::default_level_up_every_n_rounds")]
    pub level_up_every_n_rounds: u32,
    #[serde(default)]
    pub timings: Timings,
    #[serde(default = "GameConfig::default_hint_cost_points")]
    pub hint_cost_points: u32,
    /// `None` leaves hints unbounded.
    #[serde(default)]
    pub max_hints_per_round: Option<u32>,
    #[serde(default)]
    pub tiers: TierTable,
}

impl GameConfig {
    const fn default_total_lives() -> u8 {
        constants::DEFAULT_TOTAL_LIVES
    }

    const fn default_max_sequence_length() -> usize {
        constants::DEFAULT_MAX_SEQUENCE_LENGTH
    }

    const fn default_base_sequence_length() -> usize {
        constants::DEFAULT_BASE_SEQUENCE_LENGTH
    }

    const fn default_level_up_every_n_rounds() -> u32 {
        constants::DEFAULT_LEVEL_UP_EVERY_N_ROUNDS
    }

    const fn default_hint_cost_points() -> u32 {
        constants::DEFAULT_HINT_COST_POINTS
    }

    /// Parse a configuration document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GameConfigError::Parse`] for malformed JSON, or any
    /// validation error raised by [`GameConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, GameConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| GameConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the bundled default configuration, falling back to the compiled
    /// defaults if the asset cannot be parsed.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CONFIG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub const fn lengths(&self) -> SequenceLengths {
        SequenceLengths {
            base: self.base_sequence_length,
            max: self.max_sequence_length,
        }
    }

    #[must_use]
    pub const fn tier(&self, difficulty: Difficulty) -> &TierCfg {
        self.tiers.tier(difficulty)
    }

    /// Check every invariant the engine relies on before first use.
    ///
    /// All tiers are checked, not just the selected one, so a restart with a
    /// different difficulty can never hit an unchecked alphabet.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), GameConfigError> {
        for difficulty in Difficulty::ALL {
            let tier = self.tier(difficulty);
            if tier.symbols.is_empty() {
                return Err(GameConfigError::EmptyAlphabet { difficulty });
            }
            for (idx, symbol) in tier.symbols.iter().enumerate() {
                if tier.symbols[..idx].contains(symbol) {
                    return Err(GameConfigError::DuplicateSymbol {
                        difficulty,
                        symbol: *symbol,
                    });
                }
            }
            if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
                return Err(GameConfigError::InvalidMultiplier {
                    difficulty,
                    value: tier.multiplier,
                });
            }
        }
        if self.max_sequence_length == 0
            || self.base_sequence_length.saturating_add(1) > self.max_sequence_length
        {
            return Err(GameConfigError::SequenceBounds {
                base: self.base_sequence_length,
                max: self.max_sequence_length,
            });
        }
        if self.total_lives == 0 {
            return Err(GameConfigError::NoLives);
        }
        if self.level_up_every_n_rounds == 0 {
            return Err(GameConfigError::LevelUpInterval);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            total_lives: Self::default_total_lives(),
            max_sequence_length: Self::default_max_sequence_length(),
            base_sequence_length: Self::default_base_sequence_length(),
            level_up_every_n_rounds: Self::default_level_up_every_n_rounds(),
            timings: Timings::default(),
            hint_cost_points: Self::default_hint_cost_points(),
            max_hints_per_round: None,
            tiers: TierTable::default(),
        }
    }
}
