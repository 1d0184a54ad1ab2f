//! whatif CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "whatif",
    version,
    about = "Per-question score impact analysis for two-stage adaptive tests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every incorrect answer by the score it cost
    Analyze {
        /// Scoring table JSON
        #[arg(long)]
        scoring_file: PathBuf,

        /// Attempt records JSON
        #[arg(long)]
        attempt_file: PathBuf,

        /// Adaptive threshold override, in [0, 1]
        #[arg(long)]
        threshold: Option<f64>,

        /// Only use records for this student
        #[arg(long)]
        student_id: Option<String>,

        /// Output prefix (writes <prefix>_impacts.csv and <prefix>_summary.json)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format: csv, json, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check scoring and attempt files without analyzing
    Validate {
        /// Scoring table JSON
        #[arg(long)]
        scoring_file: PathBuf,

        /// Attempt records JSON
        #[arg(long)]
        attempt_file: PathBuf,

        /// Only use records for this student
        #[arg(long)]
        student_id: Option<String>,
    },

    /// Create a starter whatif.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whatif=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            scoring_file,
            attempt_file,
            threshold,
            student_id,
            out,
            format,
            config,
        } => commands::analyze::execute(
            scoring_file,
            attempt_file,
            threshold,
            student_id,
            out,
            format,
            config,
        ),
        Commands::Validate {
            scoring_file,
            attempt_file,
            student_id,
        } => commands::validate::execute(scoring_file, attempt_file, student_id),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
