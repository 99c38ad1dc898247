//! Round scoring, hint penalties and level progress.
use crate::constants::POINTS_PER_SYMBOL;
use crate::numbers::{round_f64_to_u32, u32_to_f64, usize_to_f64};

/// Points for a completed round: `len × multiplier × 10`.
#[must_use]
pub fn score_round(sequence_len: usize, multiplier: f32) -> u32 {
    round_f64_to_u32(usize_to_f64(sequence_len) * f64::from(multiplier) * POINTS_PER_SYMBOL)
}

/// Deduct one hint's cost, never dropping below zero.
#[must_use]
pub const fn apply_hint_penalty(current_score: u32, cost: u32) -> u32 {
    current_score.saturating_sub(cost)
}

/// Percentage of the way to the next level-up, as shown on the progress ring.
#[must_use]
pub fn level_progress_pct(round: u32, level_up_every: u32) -> u32 {
    if level_up_every == 0 {
        return 0;
    }
    let into_level = round % level_up_every;
    round_f64_to_u32(u32_to_f64(into_level) / u32_to_f64(level_up_every) * 100.0)
}
