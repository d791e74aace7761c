//! Rover CLI - course robot runner.
//!
//! - `rover run` - drive the course against the simulated robot and print a JSON report
//! - `rover check` - validate a course profile and dry-build every phase tree
//! - `rover profile` - print the reference profile as YAML

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tokio::time::{Interval, MissedTickBehavior};
use tracing_subscriber::{fmt, EnvFilter};

use rover_course::{CourseCatalog, CourseConfig, CourseRunner, SimConfig, SimRobot};

#[derive(Parser)]
#[command(name = "rover")]
#[command(about = "Course robot runner", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the course on the simulated robot
    Run {
        /// Course profile (YAML); the reference profile when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tick as fast as possible instead of once per period
        #[arg(long)]
        fast: bool,

        /// Give up after this many ticks
        #[arg(long, default_value = "60000")]
        max_ticks: u64,

        /// Sonar reading the simulated robot reports, in centimetres
        #[arg(long)]
        sonar_cm: Option<i32>,

        /// Write the JSON report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate a course profile
    Check {
        /// Course profile (YAML)
        config: PathBuf,
    },

    /// Print the reference course profile
    Profile,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let logs = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr);
    if cli.json_logs {
        logs.json().init();
    } else {
        logs.init();
    }

    match cli.command {
        Commands::Run {
            config,
            fast,
            max_ticks,
            sonar_cm,
            report,
        } => run_course(config.as_deref(), fast, max_ticks, sonar_cm, report.as_deref()).await,
        Commands::Check { config } => check_profile(&config),
        Commands::Profile => {
            print!("{}", serde_yaml::to_string(&CourseConfig::default())?);
            Ok(())
        }
    }
}

fn load_profile(path: Option<&Path>) -> Result<CourseConfig> {
    match path {
        Some(path) => CourseConfig::load(path),
        None => {
            tracing::info!("No profile given, using the reference course");
            Ok(CourseConfig::default())
        }
    }
}

async fn run_course(
    profile: Option<&Path>,
    fast: bool,
    max_ticks: u64,
    sonar_cm: Option<i32>,
    report_path: Option<&Path>,
) -> Result<()> {
    let config = Arc::new(load_profile(profile)?);

    let mut sim = SimConfig {
        period_micros: config.period_micros,
        ..SimConfig::default()
    };
    if let Some(cm) = sonar_cm {
        sim.sonar_cm = cm;
    }
    let robot = SimRobot::new(sim);
    let (sensors, actuators) = robot.split();

    let (wake_tx, mut woken) = oneshot::channel::<()>();
    let mut wake_tx = Some(wake_tx);
    let wake = move || {
        if let Some(tx) = wake_tx.take() {
            // The receiver only goes away once the loop is over.
            let _ = tx.send(());
        }
    };

    let mut runner = CourseRunner::new(Arc::clone(&config), sensors, actuators, wake)
        .context("Course profile rejected")?;

    let mut interval = (!fast).then(|| {
        let mut interval = tokio::time::interval(Duration::from_micros(config.period_micros));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    tracing::info!(fast, max_ticks, "Starting course");
    loop {
        tokio::select! {
            biased;
            _ = &mut woken => {
                tracing::info!(ticks = runner.ticks(), "Supervisor woken, run finished");
                break;
            }
            _ = pace(interval.as_mut()) => {
                if runner.ticks() >= max_ticks {
                    tracing::warn!(max_ticks, phase = %runner.phase(), "Tick budget exhausted");
                    break;
                }
                runner.tick();
            }
        }
    }

    let report = runner.report();
    let json = serde_json::to_string_pretty(&report)?;
    match report_path {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    if !runner.is_finished() {
        bail!("course did not finish within {max_ticks} ticks (stuck in {})", runner.phase());
    }
    Ok(())
}

/// Waits for the next period, or just yields in fast mode.
async fn pace(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}

fn check_profile(path: &Path) -> Result<()> {
    let config = CourseConfig::load(path)?;
    let legs: usize = config.leg_lists().iter().map(|(_, legs)| legs.len()).sum();
    CourseCatalog::new(Arc::new(config))
        .verify()
        .with_context(|| format!("Phase trees for {} do not build", path.display()))?;

    println!("{}: OK ({legs} legs)", path.display());
    Ok(())
}
