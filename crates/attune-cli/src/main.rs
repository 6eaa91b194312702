use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use attune_core::{
    AffectEngine, AttuneConfig, CycleReport, FixedStepClock, FrameInput, ReplaySource,
    SessionDriver,
};

mod synth;

#[derive(Parser)]
#[command(name = "attune", version, about = "Affect classification replay and simulation tool")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a captured frame stream (JSON lines, one frame per line)
    Replay {
        input: PathBuf,
        /// TOML configuration file; defaults plus ATTUNE_* overrides otherwise
        #[arg(long)]
        config: Option<PathBuf>,
        /// Frame spacing on the synthetic clock, in milliseconds
        #[arg(long, default_value_t = 33)]
        interval_ms: u64,
        /// Print every cycle instead of only commits
        #[arg(long)]
        verbose: bool,
    },
    /// Run a built-in synthetic scenario
    Simulate {
        #[arg(long, value_enum, default_value_t = synth::Scenario::Calm)]
        scenario: synth::Scenario,
        #[arg(long, default_value_t = 300)]
        frames: usize,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 33)]
        interval_ms: u64,
        /// Print every cycle instead of only commits
        #[arg(long)]
        verbose: bool,
    },
    /// Print the default configuration as TOML
    ConfigDefault {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check that a configuration file parses and validates
    ConfigValidate { config: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Replay {
            input,
            config,
            interval_ms,
            verbose,
        } => {
            let config = AttuneConfig::load_layered(None, config.as_deref())?;
            let frames = read_frames(&input)?;
            log::info!("replaying {} frames from {}", frames.len(), input.display());
            run_session(config, frames, interval_ms, verbose);
        }
        Commands::Simulate {
            scenario,
            frames,
            seed,
            config,
            interval_ms,
            verbose,
        } => {
            let config = AttuneConfig::load_layered(None, config.as_deref())?;
            let generated = synth::generate(scenario, frames, seed);
            println!(
                "simulating '{}' for {} frames (seed {})",
                scenario.as_str(),
                frames,
                seed
            );
            run_session(config, generated, interval_ms, verbose);
        }
        Commands::ConfigDefault { out } => {
            let config = AttuneConfig::default();
            match out {
                Some(path) => {
                    config.save_to_file(&path)?;
                    println!("wrote default configuration to {}", path.display());
                }
                None => print!("{}", config.to_toml_string()?),
            }
        }
        Commands::ConfigValidate { config } => {
            AttuneConfig::from_file(&config)?;
            println!("configuration OK: {}", config.display());
        }
    }
    Ok(())
}

fn read_frames(path: &Path) -> Result<Vec<FrameInput>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(path)?;
    let mut frames = Vec::new();
    for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let frame: FrameInput =
            serde_json::from_str(trimmed).map_err(|e| format!("line {}: {}", i + 1, e))?;
        frames.push(frame);
    }
    Ok(frames)
}

fn run_session(config: AttuneConfig, frames: Vec<FrameInput>, interval_ms: u64, verbose: bool) {
    let engine = AffectEngine::new(config);
    let clock = FixedStepClock::new(interval_ms as i64 * 1000);
    let mut driver = SessionDriver::with_clock(engine, clock);
    let mut source = ReplaySource::new(frames);

    let cycles = driver.run(&mut source, |report| print_report(report, verbose));

    let engine = driver.engine();
    let stats = engine.session_stats();
    println!("---");
    println!(
        "cycles: {}  expressions: {}  landmarks: {}  commits: {}",
        cycles, stats.frames_with_expressions, stats.frames_with_landmarks, stats.commits
    );
    println!("final label: {}", engine.current_label().as_str());
    for t in engine.transition_history() {
        println!(
            "  {:>8.2}s  {} -> {}  (conf {:.2})",
            t.at_us as f64 / 1e6,
            t.from.as_str(),
            t.to.as_str(),
            t.confidence
        );
    }
}

fn print_report(report: &CycleReport, verbose: bool) {
    if let Some(t) = report.committed {
        println!(
            "[{:>8.2}s] committed {} -> {} (conf {:.2})",
            t.at_us as f64 / 1e6,
            t.from.as_str(),
            t.to.as_str(),
            t.confidence
        );
    } else if verbose {
        println!(
            "label={} conf={:.2} warmed={} cooldown={}ms scores={:?}",
            report.label.as_str(),
            report.confidence,
            report.warmed_up,
            report.cooldown_remaining_ms,
            report.scores.p
        );
    }
}
