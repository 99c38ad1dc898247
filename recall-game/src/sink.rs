//! Presentation port.
//!
//! The engine pushes every observable change through [`PresentationSink`];
//! it never reads anything back from the presentation layer.
use serde::{Deserialize, Serialize};

use crate::result::{GameSummary, RoundOutcome};
use crate::session::Phase;
use crate::symbol::Symbol;

/// Callbacks implemented by a renderer, audio layer, or test harness.
/// Every method defaults to a no-op.
pub trait PresentationSink {
    fn on_reveal(&mut self, _symbol: Symbol, _index: usize) {}
    fn on_unreveal_all(&mut self) {}
    fn on_phase_change(&mut self, _phase: Phase) {}
    fn on_score_change(&mut self, _score: u32) {}
    fn on_lives_change(&mut self, _lives: u8) {}
    fn on_round_summary(&mut self, _outcome: &RoundOutcome) {}
    fn on_game_over(&mut self, _summary: &GameSummary) {}
    fn on_hint(&mut self, _symbol: Symbol) {}
    fn on_level_up(&mut self, _level: u32) {}
}

/// Discards every notification.
impl PresentationSink for () {}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn on_reveal(&mut self, symbol: Symbol, index: usize) {
        (**self).on_reveal(symbol, index);
    }
    fn on_unreveal_all(&mut self) {
        (**self).on_unreveal_all();
    }
    fn on_phase_change(&mut self, phase: Phase) {
        (**self).on_phase_change(phase);
    }
    fn on_score_change(&mut self, score: u32) {
        (**self).on_score_change(score);
    }
    fn on_lives_change(&mut self, lives: u8) {
        (**self).on_lives_change(lives);
    }
    fn on_round_summary(&mut self, outcome: &RoundOutcome) {
        (**self).on_round_summary(outcome);
    }
    fn on_game_over(&mut self, summary: &GameSummary) {
        (**self).on_game_over(summary);
    }
    fn on_hint(&mut self, symbol: Symbol) {
        (**self).on_hint(symbol);
    }
    fn on_level_up(&mut self, level: u32) {
        (**self).on_level_up(level);
    }
}

/// Owned record of one sink callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Notification {
    Reveal { symbol: Symbol, index: usize },
    UnrevealAll,
    PhaseChanged { phase: Phase },
    ScoreChanged { score: u32 },
    LivesChanged { lives: u8 },
    RoundSummary { outcome: RoundOutcome },
    GameOver { summary: GameSummary },
    Hint { symbol: Symbol },
    LevelUp { level: u32 },
}

/// Adapts any `FnMut(Notification)` into a sink.
#[derive(Debug, Clone, Default)]
pub struct ForwardSink<F>(pub F);

impl<F: FnMut(Notification)> PresentationSink for ForwardSink<F> {
    fn on_reveal(&mut self, symbol: Symbol, index: usize) {
        (self.0)(Notification::Reveal { symbol, index });
    }
    fn on_unreveal_all(&mut self) {
        (self.0)(Notification::UnrevealAll);
    }
    fn on_phase_change(&mut self, phase: Phase) {
        (self.0)(Notification::PhaseChanged { phase });
    }
    fn on_score_change(&mut self, score: u32) {
        (self.0)(Notification::ScoreChanged { score });
    }
    fn on_lives_change(&mut self, lives: u8) {
        (self.0)(Notification::LivesChanged { lives });
    }
    fn on_round_summary(&mut self, outcome: &RoundOutcome) {
        (self.0)(Notification::RoundSummary {
            outcome: outcome.clone(),
        });
    }
    fn on_game_over(&mut self, summary: &GameSummary) {
        (self.0)(Notification::GameOver {
            summary: summary.clone(),
        });
    }
    fn on_hint(&mut self, symbol: Symbol) {
        (self.0)(Notification::Hint { symbol });
    }
    fn on_level_up(&mut self, level: u32) {
        (self.0)(Notification::LevelUp { level });
    }
}

/// Records notifications in order; the headless observer used by tests and
/// the tester bots.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    events: Vec<Notification>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    /// Take every recorded notification, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.events)
    }

    /// Symbols revealed by playback, in order.
    #[must_use]
    pub fn revealed(&self) -> Vec<Symbol> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Notification::Reveal { symbol, .. } => Some(*symbol),
                _ => None,
            })
            .collect()
    }

    /// Phases entered, in order.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Notification::PhaseChanged { phase } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn game_over(&self) -> Option<&GameSummary> {
        self.events.iter().find_map(|event| match event {
            Notification::GameOver { summary } => Some(summary),
            _ => None,
        })
    }

    fn record(&mut self, event: Notification) {
        self.events.push(event);
    }
}

impl PresentationSink for NotificationLog {
    fn on_reveal(&mut self, symbol: Symbol, index: usize) {
        self.record(Notification::Reveal { symbol, index });
    }
    fn on_unreveal_all(&mut self) {
        self.record(Notification::UnrevealAll);
    }
    fn on_phase_change(&mut self, phase: Phase) {
        self.record(Notification::PhaseChanged { phase });
    }
    fn on_score_change(&mut self, score: u32) {
        self.record(Notification::ScoreChanged { score });
    }
    fn on_lives_change(&mut self, lives: u8) {
        self.record(Notification::LivesChanged { lives });
    }
    fn on_round_summary(&mut self, outcome: &RoundOutcome) {
        self.record(Notification::RoundSummary {
            outcome: outcome.clone(),
        });
    }
    fn on_game_over(&mut self, summary: &GameSummary) {
        self.record(Notification::GameOver {
            summary: summary.clone(),
        });
    }
    fn on_hint(&mut self, symbol: Symbol) {
        self.record(Notification::Hint { symbol });
    }
    fn on_level_up(&mut self, level: u32) {
        self.record(Notification::LevelUp { level });
    }
}
