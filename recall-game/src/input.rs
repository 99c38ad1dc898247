//! Discrete input events accepted by the engine.
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Event produced by an input source (pads, keyboard, a bot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "symbol")]
pub enum InputEvent {
    SymbolSubmitted(Symbol),
    StartRequested,
    RestartRequested,
    HintRequested,
    RepeatPlaybackRequested,
}

/// Whether an event changed anything. Events outside their valid phase are
/// `Ignored`; that is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Applied,
    Ignored,
}

impl Disposition {
    #[must_use]
    pub const fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub const fn from_applied(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Ignored }
    }
}
