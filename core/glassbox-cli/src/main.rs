//! glassbox: records and scores a work session.
//!
//! ## Subcommands
//!
//! - `run`: record a session until `glassbox stop` is issued
//! - `stop`: write the stop sentinel polled by a running session
//! - `show`: print a persisted session record with derived metrics
//! - `leaderboard`: print the top ranked sessions
//! - `score`: compute the hard score for given durations

mod logging;
mod report;
mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glassbox")]
#[command(about = "Work-session telemetry recorder and scorer")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.glassbox/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session (keystrokes are read from stdin)
    Run {
        /// Candidate label stored in the record
        #[arg(long, default_value = "hacker_007")]
        candidate: String,

        /// Analyzer output (JSON) attached as FINAL_ANALYSIS and used for the soft score
        #[arg(long, value_name = "FILE")]
        analysis: Option<PathBuf>,

        /// External code-quality score (0-100) blended into the hard score
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        code_score: Option<u32>,

        /// Display name for the leaderboard; also renames the candidate
        #[arg(long)]
        name: Option<String>,
    },

    /// Signal a running session to stop
    Stop,

    /// Show a persisted session record
    Show {
        /// Record path (defaults to the configured session log)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Print the record and metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the leaderboard
    Leaderboard {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Score durations in seconds without recording
    Score {
        #[arg(long, default_value_t = 0.0)]
        coding: f64,

        #[arg(long, default_value_t = 0.0)]
        researching: f64,

        #[arg(long, default_value_t = 0.0)]
        idle: f64,

        /// Seconds of keyboard inactivity
        #[arg(long, default_value_t = 0.0)]
        inactive: f64,
    },
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let config = match glassbox_core::load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run {
            candidate,
            analysis,
            code_score,
            name,
        } => run::run(
            config,
            run::RunOptions {
                candidate,
                analysis,
                code_score,
                name,
            },
        ),
        Commands::Stop => report::stop(&config),
        Commands::Show { path, json } => report::show(&config, path, json),
        Commands::Leaderboard { top } => report::leaderboard(&config, top),
        Commands::Score {
            coding,
            researching,
            idle,
            inactive,
        } => {
            print!("{}", report::score(coding, researching, idle, inactive));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "glassbox command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
