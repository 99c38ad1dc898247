mod logic;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use recall_game::{Difficulty, GameConfig};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    GameTester, GameplayStrategy, LogicTester, RunMode, ScenarioResult, build_plans,
    resolve_seed_inputs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Virtual-clock sessions (fast, deterministic)
    Logic,
    /// Sessions paced on the wall clock through the async driver
    Realtime,
}

#[derive(Debug, Parser)]
#[command(name = "recall-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for the Recall memory game")]
struct Args {
    /// Test mode: logic (virtual clock) or realtime (wall clock)
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Difficulty tiers to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    difficulty: String,

    /// Bot strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategy: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated integers or share codes)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of sessions per seed and scenario
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Stop a session once this many rounds have been played
    #[arg(long, default_value_t = 25)]
    max_rounds: u32,

    /// Divide every engine delay by this factor (realtime mode only)
    #[arg(long, default_value_t = 20)]
    speed: u64,

    /// Game configuration JSON to use instead of the bundled one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_ref())?;
    let difficulties = parse_difficulties(&args.difficulty)?;
    let strategies = parse_strategies(&args.strategy)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let mode = match args.mode {
        TestMode::Logic => RunMode::Headless,
        TestMode::Realtime => RunMode::Realtime { speed: args.speed },
    };

    let game_tester = GameTester::new(config, args.verbose);
    let logic_tester = LogicTester::new(game_tester, mode, args.verbose);
    let plans = build_plans(&strategies, args.max_rounds)?;

    println!("{}", "🧠 Running Sessions".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut all_results = Vec::new();
    for plan in plans.iter().filter(|p| difficulties.contains(&p.difficulty)) {
        all_results.extend(
            logic_tester
                .run_scenario(plan, &seed_infos, args.iterations)
                .await,
        );
    }

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        let key = strategy.label().to_lowercase();
        writeln!(
            output_target.writer(),
            "  {key:12} - {}",
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Recall Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::load_from_static());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GameConfig::from_json(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn parse_difficulties(input: &str) -> Result<Vec<Difficulty>> {
    let tokens = split_csv(input);
    if tokens.is_empty() || tokens.iter().any(|t| t == "all") {
        return Ok(Difficulty::ALL.to_vec());
    }
    tokens
        .iter()
        .map(|token| token.parse::<Difficulty>().map_err(anyhow::Error::msg))
        .collect()
}

fn parse_strategies(input: &str) -> Result<Vec<GameplayStrategy>> {
    let tokens = split_csv(input);
    if tokens.is_empty() || tokens.iter().any(|t| t == "all") {
        return Ok(GameplayStrategy::ALL.to_vec());
    }
    let mut strategies = Vec::new();
    for token in tokens {
        let Ok(strategy) = GameplayStrategy::from_str(&token, true) else {
            bail!("Unknown strategy: {token}");
        };
        strategies.push(strategy);
    }
    Ok(strategies)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Recall Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            mode: TestMode::Logic,
            difficulty: "all".to_string(),
            strategy: "all".to_string(),
            list_strategies: false,
            seeds: "1337".to_string(),
            iterations: 1,
            max_rounds: 5,
            speed: 20,
            config: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("recall-{label}-{}", std::process::id()))
    }

    #[test]
    fn split_csv_trims_and_lowercases() {
        assert_eq!(split_csv(" Easy, ,HARD "), vec!["easy", "hard"]);
    }

    #[test]
    fn difficulties_expand_all() {
        assert_eq!(parse_difficulties("all").unwrap(), Difficulty::ALL.to_vec());
        assert_eq!(
            parse_difficulties("hard,easy").unwrap(),
            vec![Difficulty::Hard, Difficulty::Easy]
        );
        assert!(parse_difficulties("extreme").is_err());
    }

    #[test]
    fn strategies_parse_by_name() {
        assert_eq!(
            parse_strategies("forgetful").unwrap(),
            vec![GameplayStrategy::Forgetful]
        );
        assert_eq!(parse_strategies("").unwrap().len(), 3);
        assert!(parse_strategies("psychic").is_err());
    }

    #[test]
    fn load_config_reads_overrides() {
        let path = temp_file("config.json");
        std::fs::write(&path, r#"{"total_lives": 5, "hint_cost_points": 7}"#).unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.total_lives, 5);
        assert_eq!(cfg.hint_cost_points, 7);

        std::fs::write(&path, r#"{"total_lives": 0}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(None).is_ok());
    }

    #[test]
    fn write_reports_console_without_results() {
        let path = temp_file("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No scenarios executed."));
    }

    #[test]
    fn write_reports_markdown_to_file() {
        let path = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        let result = ScenarioResult {
            scenario_name: "easy/perfect".to_string(),
            seed_code: "EZ-01-76".to_string(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_score: 40.0,
            best_level: 1,
            game_overs: 0,
            average_duration: Duration::ZERO,
            performance_data: Vec::new(),
        };
        write_reports(&args, &[result], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("easy/perfect"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
