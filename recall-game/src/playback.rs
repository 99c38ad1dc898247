//! Paced, cancellable reveal of a sequence.
//!
//! The scheduler is a cursor over the reveal timeline; it never sleeps. Each
//! call to [`PlaybackScheduler::advance`] yields one cue plus the delay until
//! the next one, and the owner schedules that delay on its timer queue. The
//! next step therefore only exists once the previous one has fired, and
//! cancelling is just dropping the cursor.
use serde::{Deserialize, Serialize};

use crate::config::Timings;
use crate::session::Sequence;
use crate::symbol::Symbol;

/// Identifies one playback run so stale timer entries can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackToken(u64);

/// Something the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "cue")]
pub enum PlaybackCue {
    Reveal { index: usize, symbol: Symbol },
    UnrevealAll,
    Complete,
}

/// One fired step and the delay before the following one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    pub cue: PlaybackCue,
    pub next_in_ms: Option<u64>,
}

/// Handle returned when a playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStart {
    pub token: PlaybackToken,
    pub first_in_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    LeadIn,
    Revealed(usize),
    Blank(usize),
    Settling,
}

#[derive(Debug, Clone)]
struct ActivePlayback {
    token: PlaybackToken,
    symbols: Vec<Symbol>,
    cursor: Cursor,
}

#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    timings: Timings,
    active: Option<ActivePlayback>,
    next_token: u64,
}

impl PlaybackScheduler {
    #[must_use]
    pub const fn new(timings: Timings) -> Self {
        Self {
            timings,
            active: None,
            next_token: 0,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin revealing `sequence`. Returns `None` while another playback is
    /// still in flight; overlapping runs are rejected, never queued.
    pub fn present(&mut self, sequence: &Sequence) -> Option<PlaybackStart> {
        if self.active.is_some() {
            log::warn!("playback already in flight, ignoring present request");
            return None;
        }
        let token = PlaybackToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.active = Some(ActivePlayback {
            token,
            symbols: sequence.as_slice().to_vec(),
            cursor: Cursor::LeadIn,
        });
        Some(PlaybackStart {
            token,
            first_in_ms: self.timings.gap_ms,
        })
    }

    /// Fire the next step of the run identified by `token`.
    ///
    /// Returns `None` for a stale token (cancelled or superseded run).
    pub fn advance(&mut self, token: PlaybackToken) -> Option<PlaybackStep> {
        let timings = self.timings;
        let run = self.active.as_mut().filter(|run| run.token == token)?;
        let len = run.symbols.len();
        let cursor = run.cursor;
        let step = match cursor {
            Cursor::LeadIn if len == 0 => {
                run.cursor = Cursor::Settling;
                PlaybackStep {
                    cue: PlaybackCue::UnrevealAll,
                    next_in_ms: Some(timings.settle_ms),
                }
            }
            Cursor::LeadIn => Self::reveal(run, 0, timings),
            Cursor::Blank(prev) => Self::reveal(run, prev + 1, timings),
            Cursor::Revealed(index) => {
                let next_in_ms = if index + 1 < len {
                    run.cursor = Cursor::Blank(index);
                    timings.gap_ms
                } else {
                    run.cursor = Cursor::Settling;
                    timings.settle_ms
                };
                PlaybackStep {
                    cue: PlaybackCue::UnrevealAll,
                    next_in_ms: Some(next_in_ms),
                }
            }
            Cursor::Settling => {
                self.active = None;
                PlaybackStep {
                    cue: PlaybackCue::Complete,
                    next_in_ms: None,
                }
            }
        };
        Some(step)
    }

    fn reveal(run: &mut ActivePlayback, index: usize, timings: Timings) -> PlaybackStep {
        run.cursor = Cursor::Revealed(index);
        let symbol = run.symbols[index];
        PlaybackStep {
            cue: PlaybackCue::Reveal { index, symbol },
            next_in_ms: Some(timings.reveal_ms),
        }
    }

    /// Stop the run in flight. No further cue, including completion, is
    /// produced for its token.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Total wall time of a playback for a sequence of `len` symbols.
    /// Saturates at `u64::MAX`.
    #[must_use]
    pub const fn duration_ms(&self, len: usize) -> u64 {
        let t = self.timings;
        if len == 0 {
            return t.gap_ms.saturating_add(t.settle_ms);
        }
        let len = len as u64;
        let per_symbol = t.gap_ms.saturating_add(t.reveal_ms);
        per_symbol.saturating_mul(len).saturating_add(t.settle_ms)
    }
}
