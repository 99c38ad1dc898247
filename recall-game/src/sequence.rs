//! Target sequence generation.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::SequenceLengths;
use crate::session::Sequence;
use crate::symbol::Symbol;

/// Draw a sequence of `min(base + level, max)` symbols, each sampled
/// independently and uniformly from `alphabet`. Repeats are allowed.
///
/// The alphabet is validated non-empty before a session starts; an empty
/// slice yields an empty sequence rather than panicking.
#[must_use]
pub fn generate<R: Rng + ?Sized>(
    alphabet: &[Symbol],
    level: u32,
    lengths: SequenceLengths,
    rng: &mut R,
) -> Sequence {
    let len = lengths.for_level(level);
    let symbols = (0..len)
        .filter_map(|_| alphabet.choose(rng).copied())
        .collect();
    Sequence::new(symbols)
}
