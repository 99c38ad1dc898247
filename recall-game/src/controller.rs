//! Round progression: owns the session and drives the
//! generate → present → await-input → evaluate cycle.
use log::{debug, info};

use crate::config::{GameConfig, GameConfigError};
use crate::hint;
use crate::input::{Disposition, InputEvent};
use crate::playback::{PlaybackCue, PlaybackScheduler, PlaybackToken};
use crate::result::{GameSummary, RoundOutcome, RoundResult};
use crate::rng::RngBundle;
use crate::scoring;
use crate::sequence;
use crate::session::{GameSession, Phase};
use crate::sink::PresentationSink;
use crate::symbol::{Difficulty, Symbol};
use crate::timer::{TimerId, TimerQueue};
use crate::validator::{self, Validation};

/// Work deferred on the timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTask {
    Playback(PlaybackToken),
    RoundAdvance { level_up: bool },
}

/// Session generation and phase a deferred task was scheduled under. A task
/// whose fence no longer matches the live session is dropped unfired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    generation: u64,
    phase: Phase,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    fence: Fence,
    task: TimerTask,
}

/// Owner of the single [`GameSession`]; the only component allowed to move
/// the phase, lives, round or level.
#[derive(Debug)]
pub struct ProgressionController<S: PresentationSink> {
    cfg: GameConfig,
    session: GameSession,
    rng: RngBundle,
    playback: PlaybackScheduler,
    timers: TimerQueue<Deferred>,
    round_advance: Option<TimerId>,
    now_ms: u64,
    sink: S,
}

impl<S: PresentationSink> ProgressionController<S> {
    /// Build a controller for a seeded session.
    ///
    /// # Errors
    ///
    /// Returns a [`GameConfigError`] when the configuration is unusable.
    pub fn new(cfg: GameConfig, seed: u64, sink: S) -> Result<Self, GameConfigError> {
        cfg.validate()?;
        let session = GameSession::new(&cfg);
        let playback = PlaybackScheduler::new(cfg.timings);
        Ok(Self {
            cfg,
            session,
            rng: RngBundle::from_user_seed(seed),
            playback,
            timers: TimerQueue::new(),
            round_advance: None,
            now_ms: 0,
            sink,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// When the next deferred task is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub const fn is_playback_active(&self) -> bool {
        self.playback.is_active()
    }

    /// Percentage of the way to the next level-up.
    #[must_use]
    pub fn level_progress_pct(&self) -> u32 {
        scoring::level_progress_pct(self.session.round(), self.cfg.level_up_every_n_rounds)
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, event: InputEvent) -> Disposition {
        let disposition = match event {
            InputEvent::SymbolSubmitted(symbol) => self.submit(symbol),
            InputEvent::StartRequested => self.start(),
            InputEvent::RestartRequested => self.restart(),
            InputEvent::HintRequested => Disposition::from_applied(self.request_hint().is_some()),
            InputEvent::RepeatPlaybackRequested => self.repeat_playback(),
        };
        if !disposition.applied() {
            debug!("ignored {event:?} in phase {}", self.session.phase());
        }
        disposition
    }

    /// Choose the tier for the next play-through. Only valid while Idle.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Disposition {
        if self.session.phase() != Phase::Idle {
            return Disposition::Ignored;
        }
        self.cfg.difficulty = difficulty;
        self.session.reset(&self.cfg);
        Disposition::Applied
    }

    /// Start the first round of a fresh session.
    pub fn start(&mut self) -> Disposition {
        if self.session.phase() != Phase::Idle {
            return Disposition::Ignored;
        }
        info!(
            "starting {} session (seed {:#x})",
            self.session.difficulty(),
            self.rng.seed()
        );
        self.start_round();
        Disposition::Applied
    }

    /// Abandon the current play-through and return to Idle with every
    /// counter reset. Outstanding playback and timers are cancelled.
    pub fn restart(&mut self) -> Disposition {
        self.cancel_pending();
        self.set_phase(Phase::Idle);
        self.session.reset(&self.cfg);
        info!("session restarted (generation {})", self.session.generation());
        self.sink.on_unreveal_all();
        self.sink.on_score_change(self.session.score());
        self.sink.on_lives_change(self.session.lives());
        Disposition::Applied
    }

    /// Submit one symbol for prefix validation.
    pub fn submit(&mut self, symbol: Symbol) -> Disposition {
        if !self.session.phase().accepts_input() {
            return Disposition::Ignored;
        }
        self.set_phase(Phase::Evaluating);
        let (target, input) = self.session.input_slice();
        match validator::submit(target, input, symbol) {
            Validation::MatchIncomplete | Validation::Overflow => {
                self.set_phase(Phase::AwaitingInput);
            }
            Validation::MatchComplete => self.complete_round(),
            Validation::Mismatch { expected, got } => {
                debug!("mismatch: expected {expected}, got {got}");
                self.handle_mismatch();
            }
        }
        Disposition::Applied
    }

    /// Reveal the next expected symbol at a score cost.
    pub fn request_hint(&mut self) -> Option<Symbol> {
        if let Some(max) = self.cfg.max_hints_per_round
            && self.session.hints_used_this_round() >= max
        {
            debug!("hint cap of {max} reached for this round");
            return None;
        }
        let symbol = hint::next_hint(
            self.session.phase(),
            self.session.sequence(),
            self.session.player_input(),
        )?;
        let score = scoring::apply_hint_penalty(self.session.score(), self.cfg.hint_cost_points);
        self.session.set_score(score);
        self.session.record_hint();
        self.sink.on_hint(symbol);
        self.sink.on_score_change(score);
        Some(symbol)
    }

    /// Replay the current sequence. Only valid while awaiting input with no
    /// playback in flight; the input entered so far is kept.
    pub fn repeat_playback(&mut self) -> Disposition {
        if self.session.phase() != Phase::AwaitingInput || self.playback.is_active() {
            return Disposition::Ignored;
        }
        self.set_phase(Phase::Presenting);
        self.begin_playback();
        Disposition::Applied
    }

    /// Move the virtual clock forward by `ms`, firing every task that falls due.
    pub fn advance(&mut self, ms: u64) {
        self.advance_to(self.now_ms.saturating_add(ms));
    }

    /// Move the virtual clock to `target`, firing due tasks in order. The
    /// clock never moves backwards.
    pub fn advance_to(&mut self, target: u64) {
        while let Some(due) = self.timers.next_deadline().filter(|due| *due <= target) {
            self.now_ms = self.now_ms.max(due);
            let Some((_, deferred)) = self.timers.pop_due(self.now_ms) else {
                break;
            };
            self.fire(deferred);
        }
        self.now_ms = self.now_ms.max(target);
    }

    /// Advance until nothing is scheduled, returning the number of tasks
    /// fired. Stops after `limit` tasks.
    pub fn run_until_idle(&mut self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let Some(due) = self.timers.next_deadline() else {
                break;
            };
            self.advance_to(due);
            fired += 1;
        }
        fired
    }

    fn fire(&mut self, deferred: Deferred) {
        let live = Fence {
            generation: self.session.generation(),
            phase: self.session.phase(),
        };
        if deferred.fence != live {
            debug!(
                "dropping stale {:?} (scheduled {:?}, live {:?})",
                deferred.task, deferred.fence, live
            );
            return;
        }
        match deferred.task {
            TimerTask::Playback(token) => self.on_playback_step(token),
            TimerTask::RoundAdvance { level_up } => {
                self.round_advance = None;
                self.next_round(level_up);
            }
        }
    }

    fn schedule(&mut self, delay_ms: u64, phase: Phase, task: TimerTask) -> TimerId {
        let fence = Fence {
            generation: self.session.generation(),
            phase,
        };
        self.timers
            .schedule(self.now_ms.saturating_add(delay_ms), Deferred { fence, task })
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.round_advance.take()
            && self.timers.cancel(id)
        {
            debug!("cancelled pending round advance");
        }
        let steps = self
            .timers
            .cancel_where(|deferred| matches!(deferred.task, TimerTask::Playback(_)));
        if self.playback.cancel() {
            debug!("cancelled playback in flight ({steps} steps dropped)");
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.session.phase() == phase {
            return;
        }
        debug!("phase {} -> {phase}", self.session.phase());
        self.session.set_phase(phase);
        self.sink.on_phase_change(phase);
    }

    fn start_round(&mut self) {
        self.cancel_pending();
        let difficulty = self.session.difficulty();
        let target = sequence::generate(
            &self.cfg.tier(difficulty).symbols,
            self.session.level(),
            self.cfg.lengths(),
            self.rng.sequence(),
        );
        info!(
            "round {} (level {}): {} symbols, {} ms playback",
            self.session.round(),
            self.session.level(),
            target.len(),
            self.playback.duration_ms(target.len())
        );
        debug!("sequence stream has served {} draws", self.rng.sequence().draws());
        self.session.begin_round(target);
        self.set_phase(Phase::Presenting);
        self.begin_playback();
    }

    fn begin_playback(&mut self) {
        if let Some(start) = self.playback.present(self.session.sequence()) {
            self.schedule(
                start.first_in_ms,
                Phase::Presenting,
                TimerTask::Playback(start.token),
            );
        }
    }

    fn on_playback_step(&mut self, token: PlaybackToken) {
        let Some(step) = self.playback.advance(token) else {
            debug!("playback {token:?} no longer active");
            return;
        };
        match step.cue {
            PlaybackCue::Reveal { index, symbol } => self.sink.on_reveal(symbol, index),
            PlaybackCue::UnrevealAll => self.sink.on_unreveal_all(),
            PlaybackCue::Complete => self.set_phase(Phase::AwaitingInput),
        }
        if let Some(delay) = step.next_in_ms {
            self.schedule(delay, Phase::Presenting, TimerTask::Playback(token));
        }
    }

    fn complete_round(&mut self) {
        let tier = self.cfg.tier(self.session.difficulty());
        let points = scoring::score_round(self.session.sequence().len(), tier.multiplier);
        let score = self.session.score().saturating_add(points);
        self.session.set_score(score);
        self.session.record_perfect_round();
        self.session.advance_round_counter();
        let level_up = self.session.round() % self.cfg.level_up_every_n_rounds == 0;

        self.sink.on_score_change(score);
        self.set_phase(Phase::RoundComplete);
        let outcome = self.outcome(points, level_up, RoundResult::Success);
        self.sink.on_round_summary(&outcome);

        let timings = self.cfg.timings;
        let delay = if level_up {
            timings.feedback_ms.saturating_add(timings.level_up_ms)
        } else {
            timings.feedback_ms
        };
        let id = self.schedule(
            delay,
            Phase::RoundComplete,
            TimerTask::RoundAdvance { level_up },
        );
        self.round_advance = Some(id);
    }

    fn handle_mismatch(&mut self) {
        let lives = self.session.lose_life();
        self.sink.on_lives_change(lives);
        if lives == 0 {
            self.game_over();
        } else {
            self.session.clear_input();
            self.set_phase(Phase::AwaitingInput);
        }
    }

    fn game_over(&mut self) {
        self.cancel_pending();
        self.session.advance_round_counter();
        self.set_phase(Phase::GameOver);
        let outcome = self.outcome(0, false, RoundResult::GameOver);
        self.sink.on_round_summary(&outcome);
        let summary = GameSummary::from_session(&self.session);
        info!(
            "game over: score {} highest level {} perfect rounds {}",
            summary.final_score, summary.highest_level, summary.perfect_rounds
        );
        self.sink.on_game_over(&summary);
    }

    fn next_round(&mut self, level_up: bool) {
        if level_up {
            self.session.level_up();
            info!("level up: now level {}", self.session.level());
            self.sink.on_level_up(self.session.level());
        }
        self.set_phase(Phase::Idle);
        self.start_round();
    }

    /// Outcome of the round that was just resolved (the round counter has
    /// already moved on by one).
    fn outcome(&self, points: u32, leveled_up: bool, result: RoundResult) -> RoundOutcome {
        RoundOutcome {
            round: self.session.round().saturating_sub(1),
            level: self.session.level(),
            sequence_len: self.session.sequence().len(),
            points,
            hints_used: self.session.hints_used_this_round(),
            score: self.session.score(),
            lives: self.session.lives(),
            leveled_up,
            result,
        }
    }
}
