//! Symbol palette and difficulty tiers.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Inline capacity large enough for the widest built-in alphabet.
pub type Alphabet = SmallVec<[Symbol; 6]>;

/// A colored pad the player has to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Symbol {
    /// Every symbol in palette order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Solfège syllable voiced when the pad lights up.
    #[must_use]
    pub const fn tone(self) -> &'static str {
        match self {
            Self::Red => "do",
            Self::Blue => "re",
            Self::Green => "mi",
            Self::Yellow => "fa",
            Self::Purple => "sol",
            Self::Orange => "la",
        }
    }

    /// Tone frequency in Hz for an audio collaborator.
    #[must_use]
    pub const fn frequency_hz(self) -> f32 {
        match self {
            Self::Red => 261.63,
            Self::Blue => 293.66,
            Self::Green => 329.63,
            Self::Yellow => 349.23,
            Self::Purple => 392.00,
            Self::Orange => 440.00,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a symbol name is not part of the palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown symbol '{0}'")]
pub struct UnknownSymbol(pub String);

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|symbol| symbol.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownSymbol(needle.to_string()))
    }
}

/// Difficulty tier chosen at the start of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Two-letter prefix used by share codes.
    #[must_use]
    pub const fn code_prefix(self) -> &'static str {
        match self {
            Self::Easy => "EZ",
            Self::Medium => "MD",
            Self::Hard => "HD",
        }
    }

    #[must_use]
    pub fn from_code_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.code_prefix().eq_ignore_ascii_case(prefix))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{s}'"))
    }
}
