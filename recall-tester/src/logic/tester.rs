use anyhow::{Result, anyhow, ensure};
use colored::Colorize;
use recall_game::Difficulty;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::logic::policy::GameplayStrategy;
use crate::logic::seeds::SeedInfo;

/// How sessions are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Virtual clock, as fast as the CPU allows
    Headless,
    /// Tokio driver on the wall clock, timings divided by `speed`
    Realtime { speed: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub average_score: f64,
    pub best_level: u32,
    pub game_overs: usize,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Plan for a strategy with the checks every run of it must pass.
#[must_use]
pub fn plan_for(
    difficulty: Difficulty,
    strategy: GameplayStrategy,
    max_rounds: u32,
) -> SimulationPlan {
    let plan = SimulationPlan::new(difficulty, strategy)
        .with_max_rounds(max_rounds)
        .with_expectation(|summary: &SimulationSummary| {
            ensure!(
                summary.violations.is_empty(),
                "rule violations: {}",
                summary.violations.join("; ")
            );
            ensure!(
                summary.summary.perfect_rounds <= summary.summary.rounds_played,
                "more perfect rounds than rounds played"
            );
            Ok(())
        });
    match strategy {
        GameplayStrategy::Perfect => plan.with_expectation(|summary: &SimulationSummary| {
            ensure!(!summary.game_over, "perfect bot lost the game");
            ensure!(summary.summary.mistakes == 0, "perfect bot made a mistake");
            Ok(())
        }),
        GameplayStrategy::Hinting => plan.with_expectation(|summary: &SimulationSummary| {
            ensure!(summary.summary.mistakes == 0, "hinting bot made a mistake");
            Ok(())
        }),
        GameplayStrategy::Forgetful => plan.with_expectation(|summary: &SimulationSummary| {
            if summary.game_over {
                ensure!(
                    summary.summary.mistakes >= 1,
                    "game over without a single mistake"
                );
            }
            Ok(())
        }),
    }
}

pub struct LogicTester {
    tester: GameTester,
    mode: RunMode,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub const fn new(tester: GameTester, mode: RunMode, verbose: bool) -> Self {
        Self {
            tester,
            mode,
            verbose,
        }
    }

    pub async fn run_scenario(
        &self,
        plan: &SimulationPlan,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for seed in seeds.iter().filter(|s| s.matches_difficulty(plan.difficulty)) {
            if self.verbose {
                println!(
                    "🧪 Testing {} on {} (seed {})",
                    plan.strategy.label().bright_white(),
                    plan.difficulty,
                    seed.share_code_for(plan.difficulty)
                );
            }
            results.push(self.run_single_scenario(plan, seed, iterations).await);
        }

        results
    }

    async fn run_single_scenario(
        &self,
        plan: &SimulationPlan,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut total_score = 0_u64;
        let mut best_level = 0;
        let mut game_overs = 0;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = match self.mode {
                RunMode::Headless => self.tester.run_plan(plan, iteration_seed),
                RunMode::Realtime { speed } => {
                    self.tester
                        .run_plan_realtime(plan, iteration_seed, speed)
                        .await
                }
            };
            let checked = outcome.and_then(|summary| {
                evaluate_expectations(plan, &summary).map_or(Ok(summary), |err| Err(anyhow!(err)))
            });

            match checked {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    total_score += u64::from(summary.summary.final_score);
                    best_level = best_level.max(summary.summary.highest_level);
                    if summary.game_over {
                        game_overs += 1;
                    }
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) score:{} level:{} turns:{}",
                            i + 1,
                            iterations,
                            summary.summary.final_score,
                            summary.summary.highest_level,
                            summary.turns
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} ({} {}, seed {iteration_seed}): {err:#}",
                        i + 1,
                        plan.difficulty,
                        plan.strategy
                    ));
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        #[allow(clippy::cast_precision_loss)]
        let average_score = if successes == 0 {
            0.0
        } else {
            total_score as f64 / successes as f64
        };

        ScenarioResult {
            scenario_name: format!("{}/{}", plan.difficulty, plan.strategy.label().to_lowercase()),
            seed_code: seed.share_code_for(plan.difficulty),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_score,
            best_level,
            game_overs,
            average_duration,
            performance_data,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

/// Every tier crossed with the requested strategies.
pub fn build_plans(strategies: &[GameplayStrategy], max_rounds: u32) -> Result<Vec<SimulationPlan>> {
    ensure!(!strategies.is_empty(), "no strategies selected");
    Ok(Difficulty::ALL
        .iter()
        .flat_map(|difficulty| {
            strategies
                .iter()
                .map(move |strategy| plan_for(*difficulty, *strategy, max_rounds))
        })
        .collect())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
