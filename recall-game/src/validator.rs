//! Streaming prefix validation of player input.
use serde::{Deserialize, Serialize};

use crate::session::{PlayerInput, Sequence};
use crate::symbol::Symbol;

/// Result of submitting one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Validation {
    /// Symbol matched and more symbols are expected.
    MatchIncomplete,
    /// Symbol matched and completed the sequence.
    MatchComplete,
    /// Symbol broke the prefix; the input buffer is left untouched.
    Mismatch { expected: Symbol, got: Symbol },
    /// Input already covers the whole sequence; nothing was appended.
    Overflow,
}

/// Compare `symbol` with the next expected position, appending only on a
/// match. Clearing the buffer after a mismatch is the caller's job.
pub fn submit(sequence: &Sequence, input: &mut PlayerInput, symbol: Symbol) -> Validation {
    let Some(expected) = sequence.get(input.len()) else {
        return Validation::Overflow;
    };
    if expected != symbol {
        return Validation::Mismatch {
            expected,
            got: symbol,
        };
    }
    input.push(symbol);
    if input.len() == sequence.len() {
        Validation::MatchComplete
    } else {
        Validation::MatchIncomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::{Blue, Green, Red};

    fn seq() -> Sequence {
        Sequence::new(vec![Red, Blue, Red, Green])
    }

    #[test]
    fn exact_reproduction_completes_on_last_symbol() {
        let sequence = seq();
        let mut input = PlayerInput::default();
        let results: Vec<Validation> = sequence
            .as_slice()
            .iter()
            .map(|s| submit(&sequence, &mut input, *s))
            .collect();
        assert_eq!(
            results,
            vec![
                Validation::MatchIncomplete,
                Validation::MatchIncomplete,
                Validation::MatchIncomplete,
                Validation::MatchComplete,
            ]
        );
        assert_eq!(input.as_slice(), sequence.as_slice());
    }

    #[test]
    fn mismatch_leaves_buffer_alone() {
        let sequence = seq();
        let mut input = PlayerInput::default();
        assert_eq!(submit(&sequence, &mut input, Red), Validation::MatchIncomplete);
        assert_eq!(
            submit(&sequence, &mut input, Green),
            Validation::Mismatch {
                expected: Blue,
                got: Green
            }
        );
        assert_eq!(input.as_slice(), &[Red]);
        assert!(input.is_prefix_of(&sequence));
    }

    #[test]
    fn mismatch_is_detected_at_every_position() {
        let sequence = seq();
        for position in 0..sequence.len() {
            let mut input = PlayerInput::default();
            for symbol in &sequence.as_slice()[..position] {
                submit(&sequence, &mut input, *symbol);
            }
            let expected = sequence.as_slice()[position];
            let wrong = if expected == Red { Blue } else { Red };
            assert!(matches!(
                submit(&sequence, &mut input, wrong),
                Validation::Mismatch { .. }
            ));
            assert_eq!(input.len(), position);
        }
    }

    #[test]
    fn full_buffer_reports_overflow() {
        let sequence = Sequence::new(vec![Red]);
        let mut input = PlayerInput::default();
        assert_eq!(submit(&sequence, &mut input, Red), Validation::MatchComplete);
        assert_eq!(submit(&sequence, &mut input, Red), Validation::Overflow);
        assert_eq!(input.len(), 1);
    }
}
