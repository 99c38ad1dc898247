//! Round outcomes and the end-of-game summary.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    HIGH_SCORER_MIN_SCORE, LEVEL_MASTER_MIN_LEVEL, PERFECT_PLAYER_MIN_ROUNDS,
    SHARP_MEMORY_MIN_ROUNDS,
};
use crate::session::GameSession;
use crate::symbol::Difficulty;

/// How a round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    Success,
    GameOver,
}

/// Summary sent to the presentation layer after every resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub level: u32,
    pub sequence_len: usize,
    pub points: u32,
    pub hints_used: u32,
    pub score: u32,
    pub lives: u8,
    pub leveled_up: bool,
    pub result: RoundResult,
}

/// Badges earned over a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    HighScorer,
    PerfectPlayer,
    LevelMaster,
    SharpMemory,
}

impl Achievement {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighScorer => "High Scorer",
            Self::PerfectPlayer => "Perfect Player",
            Self::LevelMaster => "Level Master",
            Self::SharpMemory => "Sharp Memory",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Badges earned for the given totals, in display order.
#[must_use]
pub fn achievements_for(score: u32, perfect_rounds: u32, highest_level: u32) -> Vec<Achievement> {
    let mut earned = Vec::new();
    if score >= HIGH_SCORER_MIN_SCORE {
        earned.push(Achievement::HighScorer);
    }
    if perfect_rounds >= PERFECT_PLAYER_MIN_ROUNDS {
        earned.push(Achievement::PerfectPlayer);
    }
    if highest_level >= LEVEL_MASTER_MIN_LEVEL {
        earned.push(Achievement::LevelMaster);
    }
    if perfect_rounds >= SHARP_MEMORY_MIN_ROUNDS {
        earned.push(Achievement::SharpMemory);
    }
    earned
}

/// Complete summary of a play-through for the game-over screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub difficulty: Difficulty,
    pub final_score: u32,
    pub highest_level: u32,
    pub perfect_rounds: u32,
    pub rounds_played: u32,
    pub hints_used: u32,
    pub mistakes: u32,
    pub achievements: Vec<Achievement>,
}

impl GameSummary {
    /// Build the summary from a session that has just been resolved; the
    /// round counter already points at the round that would come next.
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            difficulty: session.difficulty(),
            final_score: session.score(),
            highest_level: session.highest_level(),
            perfect_rounds: session.perfect_rounds(),
            rounds_played: session.round().saturating_sub(1),
            hints_used: session.hints_used_total(),
            mistakes: session.mistakes(),
            achievements: achievements_for(
                session.score(),
                session.perfect_rounds(),
                session.highest_level(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn achievements_follow_thresholds() {
        assert!(achievements_for(0, 0, 1).is_empty());
        assert_eq!(achievements_for(499, 4, 4), Vec::new());
        assert_eq!(
            achievements_for(500, 5, 5),
            vec![
                Achievement::HighScorer,
                Achievement::LevelMaster,
                Achievement::SharpMemory
            ]
        );
        assert_eq!(
            achievements_for(0, 10, 1),
            vec![Achievement::PerfectPlayer, Achievement::SharpMemory]
        );
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(Achievement::SharpMemory.to_string(), "Sharp Memory");
    }
}
