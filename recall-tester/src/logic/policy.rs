use std::fmt;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use recall_game::Symbol;
use serde::{Deserialize, Serialize};

/// What a bot does at its next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Submit(Symbol),
    Hint,
}

/// Policy interface for automated players.
///
/// `memory` holds the symbols the bot saw revealed during the last
/// playback; `position` is how many symbols it has already entered.
pub trait PlayerPolicy {
    fn next_action(&mut self, memory: &[Symbol], position: usize, alphabet: &[Symbol])
    -> BotAction;
}

/// Built-in bot strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    /// Replays every reveal exactly
    Perfect,
    /// Misremembers more often as sequences grow
    Forgetful,
    /// Asks for hints now and then instead of relying on memory
    Hinting,
}

impl GameplayStrategy {
    pub const ALL: [Self; 3] = [Self::Perfect, Self::Forgetful, Self::Hinting];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Forgetful => "Forgetful",
            Self::Hinting => "Hinting",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Perfect => "replays every revealed symbol exactly",
            Self::Forgetful => "slips more often as sequences grow",
            Self::Hinting => "spends score on hints roughly one turn in five",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Forgetful => Box::new(ForgetfulPolicy::new(seed)),
            Self::Hinting => Box::new(HintingPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn remembered(memory: &[Symbol], position: usize, alphabet: &[Symbol]) -> Symbol {
    memory
        .get(position)
        .or_else(|| alphabet.first())
        .copied()
        .unwrap_or(Symbol::Red)
}

struct PerfectPolicy;

impl PlayerPolicy for PerfectPolicy {
    fn next_action(
        &mut self,
        memory: &[Symbol],
        position: usize,
        alphabet: &[Symbol],
    ) -> BotAction {
        BotAction::Submit(remembered(memory, position, alphabet))
    }
}

struct ForgetfulPolicy {
    rng: ChaCha20Rng,
    slip_per_symbol: f64,
}

impl ForgetfulPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            slip_per_symbol: 0.015,
        }
    }

    fn slip_chance(&self, len: usize) -> f64 {
        let len = f64::from(u32::try_from(len).unwrap_or(u32::MAX));
        (self.slip_per_symbol * len).min(0.5)
    }
}

impl PlayerPolicy for ForgetfulPolicy {
    fn next_action(
        &mut self,
        memory: &[Symbol],
        position: usize,
        alphabet: &[Symbol],
    ) -> BotAction {
        let chance = self.slip_chance(memory.len());
        if !alphabet.is_empty() && self.rng.gen_bool(chance) {
            let guess = alphabet[self.rng.gen_range(0..alphabet.len())];
            return BotAction::Submit(guess);
        }
        BotAction::Submit(remembered(memory, position, alphabet))
    }
}

struct HintingPolicy {
    rng: ChaCha20Rng,
    hint_rate: f64,
    hinted_at: Option<usize>,
}

impl HintingPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            hint_rate: 0.2,
            hinted_at: None,
        }
    }
}

impl PlayerPolicy for HintingPolicy {
    fn next_action(
        &mut self,
        memory: &[Symbol],
        position: usize,
        alphabet: &[Symbol],
    ) -> BotAction {
        // One hint per position; the runner submits the hinted symbol.
        if self.hinted_at != Some(position) && self.rng.gen_bool(self.hint_rate) {
            self.hinted_at = Some(position);
            return BotAction::Hint;
        }
        BotAction::Submit(remembered(memory, position, alphabet))
    }
}
