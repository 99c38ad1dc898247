//! The `GameSession` aggregate and the round-level `Phase`.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::constants::{STARTING_LEVEL, STARTING_ROUND};
use crate::symbol::{Difficulty, Symbol};

/// State of the round-level state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Presenting,
    AwaitingInput,
    Evaluating,
    RoundComplete,
    GameOver,
}

impl Phase {
    /// Whether symbol submissions and hints are accepted.
    #[must_use]
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::AwaitingInput)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::AwaitingInput => "awaiting_input",
            Self::Evaluating => "evaluating",
            Self::RoundComplete => "round_complete",
            Self::GameOver => "game_over",
        };
        f.write_str(label)
    }
}

/// Target sequence for a round. Immutable once built; a new round replaces
/// it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<Symbol>);

impl Sequence {
    #[must_use]
    pub const fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }
}

/// Symbols the player has entered during the current attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerInput(Vec<Symbol>);

impl PlayerInput {
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the entered symbols are a prefix of `sequence`.
    #[must_use]
    pub fn is_prefix_of(&self, sequence: &Sequence) -> bool {
        sequence.as_slice().starts_with(&self.0)
    }

    pub(crate) fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Single mutable aggregate for one play-through.
///
/// Fields are read through accessors; mutation is crate-private and only the
/// progression controller calls the mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    level: u32,
    score: u32,
    round: u32,
    lives: u8,
    difficulty: Difficulty,
    phase: Phase,
    sequence: Sequence,
    player_input: PlayerInput,
    perfect_rounds: u32,
    highest_level: u32,
    hints_used_this_round: u32,
    hints_used_total: u32,
    mistakes: u32,
    generation: u64,
}

impl GameSession {
    #[must_use]
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            level: STARTING_LEVEL,
            score: 0,
            round: STARTING_ROUND,
            lives: cfg.total_lives,
            difficulty: cfg.difficulty,
            phase: Phase::Idle,
            sequence: Sequence::default(),
            player_input: PlayerInput::default(),
            perfect_rounds: 0,
            highest_level: STARTING_LEVEL,
            hints_used_this_round: 0,
            hints_used_total: 0,
            mistakes: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub const fn player_input(&self) -> &PlayerInput {
        &self.player_input
    }

    #[must_use]
    pub const fn perfect_rounds(&self) -> u32 {
        self.perfect_rounds
    }

    #[must_use]
    pub const fn highest_level(&self) -> u32 {
        self.highest_level
    }

    #[must_use]
    pub const fn hints_used_this_round(&self) -> u32 {
        self.hints_used_this_round
    }

    #[must_use]
    pub const fn hints_used_total(&self) -> u32 {
        self.hints_used_total
    }

    #[must_use]
    pub const fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// Restart counter used to fence deferred callbacks.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset every counter for a new play-through, bumping the generation.
    pub(crate) fn reset(&mut self, cfg: &GameConfig) {
        let generation = self.generation.wrapping_add(1);
        *self = Self::new(cfg);
        self.generation = generation;
    }

    pub(crate) const fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Replace the sequence for a new round and clear per-round state.
    pub(crate) fn begin_round(&mut self, sequence: Sequence) {
        self.sequence = sequence;
        self.player_input.clear();
        self.hints_used_this_round = 0;
    }

    /// Split borrow used by the validator: the sequence stays read-only.
    pub(crate) fn input_slice(&mut self) -> (&Sequence, &mut PlayerInput) {
        (&self.sequence, &mut self.player_input)
    }

    pub(crate) fn clear_input(&mut self) {
        self.player_input.clear();
    }

    pub(crate) const fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub(crate) const fn record_hint(&mut self) {
        self.hints_used_this_round = self.hints_used_this_round.saturating_add(1);
        self.hints_used_total = self.hints_used_total.saturating_add(1);
    }

    pub(crate) const fn record_perfect_round(&mut self) {
        self.perfect_rounds = self.perfect_rounds.saturating_add(1);
    }

    pub(crate) const fn advance_round_counter(&mut self) {
        self.round = self.round.saturating_add(1);
    }

    /// Lose one life, returning the remaining count.
    pub(crate) const fn lose_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.mistakes = self.mistakes.saturating_add(1);
        self.lives
    }

    pub(crate) fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
        self.highest_level = self.highest_level.max(self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle_with_full_lives() {
        let session = GameSession::new(&GameConfig::default());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.level(), 1);
        assert_eq!(session.round(), 1);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.score(), 0);
        assert!(session.sequence().is_empty());
    }

    #[test]
    fn reset_bumps_generation_and_clears_counters() {
        let cfg = GameConfig::default();
        let mut session = GameSession::new(&cfg);
        session.set_score(120);
        session.lose_life();
        session.level_up();
        session.reset(&cfg);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.highest_level(), 1);
        assert_eq!(session.mistakes(), 0);
    }

    #[test]
    fn lives_never_underflow() {
        let mut session = GameSession::new(&GameConfig::default());
        for _ in 0..5 {
            session.lose_life();
        }
        assert_eq!(session.lives(), 0);
        assert_eq!(session.mistakes(), 5);
    }

    #[test]
    fn prefix_check_tracks_sequence() {
        let mut session = GameSession::new(&GameConfig::default());
        session.begin_round(Sequence::new(vec![Symbol::Red, Symbol::Blue]));
        let (sequence, input) = session.input_slice();
        input.push(Symbol::Red);
        assert!(input.is_prefix_of(sequence));
        input.push(Symbol::Green);
        assert!(!input.is_prefix_of(sequence));
    }

    #[test]
    fn phase_labels_are_snake_case() {
        assert_eq!(Phase::AwaitingInput.to_string(), "awaiting_input");
        assert!(Phase::AwaitingInput.accepts_input());
        assert!(!Phase::Presenting.accepts_input());
        assert!(Phase::GameOver.is_terminal());
    }
}
