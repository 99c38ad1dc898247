//! Hint lookup.
use crate::session::{Phase, PlayerInput, Sequence};
use crate::symbol::Symbol;

/// The next expected symbol, or `None` when no hint applies.
///
/// Pure lookup: it never touches the input buffer or the score.
#[must_use]
pub fn next_hint(phase: Phase, sequence: &Sequence, input: &PlayerInput) -> Option<Symbol> {
    if !phase.accepts_input() || input.len() >= sequence.len() {
        return None;
    }
    sequence.get(input.len())
}
