use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::debug;
use recall_game::{
    Difficulty, GameConfig, GameSummary, InputEvent, Notification, NotificationLog, Phase,
    ProgressionController, Symbol, channel_sink, run_realtime,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::logic::policy::{BotAction, GameplayStrategy, PlayerPolicy};

/// Upper bound on timer firings between two bot turns.
const MAX_TIMER_FIRES: usize = 4_096;
/// Upper bound on bot inputs in one session.
const MAX_TURNS: usize = 20_000;
/// Wall-clock ceiling for one real-time session.
const REALTIME_TIMEOUT: Duration = Duration::from_secs(120);

/// Tracks what a bot can see through the notification stream.
#[derive(Debug, Default)]
pub struct Observer {
    memory: Vec<Symbol>,
    game_over: Option<GameSummary>,
    level_ups: u32,
    last_hint: Option<Symbol>,
}

impl Observer {
    pub fn observe(&mut self, notification: &Notification) {
        match notification {
            Notification::Reveal { symbol, index } => {
                if *index == 0 {
                    self.memory.clear();
                }
                self.memory.push(*symbol);
            }
            Notification::GameOver { summary } => self.game_over = Some(summary.clone()),
            Notification::LevelUp { .. } => self.level_ups += 1,
            Notification::Hint { symbol } => self.last_hint = Some(*symbol),
            _ => {}
        }
    }

    #[must_use]
    pub fn memory(&self) -> &[Symbol] {
        &self.memory
    }
}

/// One bot run against the engine.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub difficulty: Difficulty,
    pub strategy: GameplayStrategy,
    pub max_rounds: u32,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(difficulty: Difficulty, strategy: GameplayStrategy) -> Self {
        Self {
            difficulty,
            strategy,
            max_rounds: 25,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Everything a finished run reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub strategy: GameplayStrategy,
    pub game_over: bool,
    pub turns: usize,
    pub level_ups: u32,
    pub summary: GameSummary,
    /// Engine rules the run observed being broken.
    pub violations: Vec<String>,
}

/// Drives bots against the engine, headless or in real time.
#[derive(Debug, Clone)]
pub struct GameTester {
    config: GameConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(config: GameConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    fn alphabet(&self, difficulty: Difficulty) -> Vec<Symbol> {
        self.config.tier(difficulty).symbols.to_vec()
    }

    /// Play one session on the virtual clock.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let cfg = self.config.clone().with_difficulty(plan.difficulty);
        let mut ctrl = ProgressionController::new(cfg, seed, NotificationLog::new())
            .context("invalid game configuration")?;
        let alphabet = self.alphabet(plan.difficulty);
        let mut policy = plan.strategy.create_policy(seed);
        let mut observer = Observer::default();
        let mut violations = Vec::new();
        let mut turns = 0;

        ctrl.start();
        loop {
            ctrl.run_until_idle(MAX_TIMER_FIRES);
            for notification in ctrl.sink_mut().drain() {
                observer.observe(&notification);
            }
            let session = ctrl.session();
            match session.phase() {
                Phase::GameOver => break,
                Phase::AwaitingInput => {}
                other => {
                    violations.push(format!("stalled in phase {other}"));
                    break;
                }
            }
            if session.round() > plan.max_rounds || turns >= MAX_TURNS {
                break;
            }
            turns += 1;

            let position = session.player_input().len();
            let lives_before = session.lives();
            let symbol = match policy.next_action(observer.memory(), position, &alphabet) {
                BotAction::Submit(symbol) => symbol,
                BotAction::Hint => match ctrl.request_hint() {
                    Some(symbol) => symbol,
                    None => fallback_symbol(policy.as_mut(), &observer, position, &alphabet),
                },
            };
            if !ctrl.submit(symbol).applied() {
                violations.push(format!("submit ignored while awaiting input (turn {turns})"));
            }

            let session = ctrl.session();
            if session.lives() > lives_before {
                violations.push(format!("lives rose from {lives_before} to {}", session.lives()));
            }
            if !session.player_input().is_prefix_of(session.sequence()) {
                violations.push("player input diverged from the target".to_string());
            }
            if session.lives() == 0 && session.phase() != Phase::GameOver {
                violations.push(format!("no lives left but phase is {}", session.phase()));
            }
        }

        let final_state = GameSummary::from_session(ctrl.session());
        let game_over = ctrl.session().phase() == Phase::GameOver;
        let summary = match observer.game_over.take() {
            Some(reported) => {
                if reported != final_state {
                    violations.push("game-over summary disagrees with the session".to_string());
                }
                reported
            }
            None => final_state,
        };
        if game_over != (ctrl.session().lives() == 0) {
            violations.push("game-over phase and remaining lives disagree".to_string());
        }

        if self.verbose {
            println!(
                "     ↳ seed {seed} {} {}: score {} level {} turns {turns}",
                plan.difficulty, plan.strategy, summary.final_score, summary.highest_level
            );
        }

        Ok(SimulationSummary {
            seed,
            difficulty: plan.difficulty,
            strategy: plan.strategy,
            game_over,
            turns,
            level_ups: observer.level_ups,
            summary,
            violations,
        })
    }

    /// Play one session through the tokio driver with timings divided by
    /// `speed`.
    pub async fn run_plan_realtime(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        speed: u64,
    ) -> Result<SimulationSummary> {
        let mut cfg = self.config.clone().with_difficulty(plan.difficulty);
        cfg.timings = cfg.timings.scaled_down(speed);
        let (sink, mut notifications) = channel_sink();
        let mut ctrl =
            ProgressionController::new(cfg, seed, sink).context("invalid game configuration")?;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let alphabet = self.alphabet(plan.difficulty);
        let mut policy = plan.strategy.create_policy(seed);
        let max_rounds = plan.max_rounds;

        let bot = tokio::spawn(async move {
            let mut observer = Observer::default();
            let mut position = 0;
            let mut turns = 0;
            let mut awaiting_hint = false;
            let _ = tx.send(InputEvent::StartRequested);
            while let Some(notification) = notifications.recv().await {
                observer.observe(&notification);
                match notification {
                    Notification::PhaseChanged {
                        phase: Phase::Presenting,
                    }
                    | Notification::LivesChanged { .. } => position = 0,
                    Notification::PhaseChanged {
                        phase: Phase::AwaitingInput,
                    } => {
                        if turns >= MAX_TURNS {
                            break;
                        }
                        turns += 1;
                        match policy.next_action(observer.memory(), position, &alphabet) {
                            BotAction::Submit(symbol) => {
                                position += 1;
                                let _ = tx.send(InputEvent::SymbolSubmitted(symbol));
                            }
                            BotAction::Hint => {
                                awaiting_hint = true;
                                let _ = tx.send(InputEvent::HintRequested);
                            }
                        }
                    }
                    Notification::Hint { symbol } if awaiting_hint => {
                        awaiting_hint = false;
                        position += 1;
                        let _ = tx.send(InputEvent::SymbolSubmitted(symbol));
                    }
                    Notification::RoundSummary { outcome } if outcome.round >= max_rounds => break,
                    Notification::GameOver { .. } => break,
                    _ => {}
                }
            }
            (observer, turns)
        });

        let exit = tokio::time::timeout(REALTIME_TIMEOUT, run_realtime(&mut ctrl, &mut rx)).await;
        let Ok(exit) = exit else {
            bot.abort();
            bail!("real-time session for seed {seed} timed out");
        };
        debug!("driver exited with {exit:?}");
        let (mut observer, turns) = bot.await.context("bot task failed")?;

        let game_over = ctrl.session().phase() == Phase::GameOver;
        let summary = observer
            .game_over
            .take()
            .unwrap_or_else(|| GameSummary::from_session(ctrl.session()));
        Ok(SimulationSummary {
            seed,
            difficulty: plan.difficulty,
            strategy: plan.strategy,
            game_over,
            turns,
            level_ups: observer.level_ups,
            summary,
            violations: Vec::new(),
        })
    }
}

fn fallback_symbol(
    policy: &mut (dyn PlayerPolicy + Send),
    observer: &Observer,
    position: usize,
    alphabet: &[Symbol],
) -> Symbol {
    match policy.next_action(observer.memory(), position, alphabet) {
        BotAction::Submit(symbol) => symbol,
        BotAction::Hint => observer
            .last_hint
            .or_else(|| observer.memory().get(position).copied())
            .unwrap_or(Symbol::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> GameTester {
        GameTester::new(GameConfig::default(), false)
    }

    #[test]
    fn perfect_bot_never_errs() {
        let plan = SimulationPlan::new(Difficulty::Medium, GameplayStrategy::Perfect)
            .with_max_rounds(12);
        let summary = tester().run_plan(&plan, 2024).unwrap();
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!(!summary.game_over);
        assert_eq!(summary.summary.mistakes, 0);
        assert_eq!(summary.summary.perfect_rounds, 12);
        assert_eq!(summary.level_ups, 2);
    }

    #[test]
    fn forgetful_bot_eventually_loses() {
        let plan = SimulationPlan::new(Difficulty::Hard, GameplayStrategy::Forgetful)
            .with_max_rounds(500);
        let summary = tester().run_plan(&plan, 99).unwrap();
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!(summary.game_over);
        assert_eq!(summary.summary.mistakes, 3);
    }

    #[test]
    fn hinting_bot_pays_for_hints() {
        let plan = SimulationPlan::new(Difficulty::Easy, GameplayStrategy::Hinting)
            .with_max_rounds(10);
        let summary = tester().run_plan(&plan, 5).unwrap();
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!(summary.summary.hints_used > 0);
        assert_eq!(summary.summary.mistakes, 0);
    }

    #[test]
    fn same_seed_same_summary() {
        let plan = SimulationPlan::new(Difficulty::Hard, GameplayStrategy::Forgetful)
            .with_max_rounds(40);
        let a = tester().run_plan(&plan, 31).unwrap();
        let b = tester().run_plan(&plan, 31).unwrap();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.turns, b.turns);
    }

    #[tokio::test]
    async fn realtime_run_matches_round_cap() {
        let plan = SimulationPlan::new(Difficulty::Easy, GameplayStrategy::Perfect)
            .with_max_rounds(2);
        let summary = tester().run_plan_realtime(&plan, 8, 100).await.unwrap();
        assert!(!summary.game_over);
        assert!(summary.summary.perfect_rounds >= 2);
        assert_eq!(summary.summary.mistakes, 0);
    }
}
