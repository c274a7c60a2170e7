//! lengua CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use lengua_core::model::Category;
use lengua_core::session::Mode;

mod commands;

#[derive(Parser)]
#[command(name = "lengua", version, about = "Spanish grammar practice quizzes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive quiz
    Play {
        /// Quiz mode: spelling, devices, recognize, produce, classify
        #[arg(long, default_value = "spelling")]
        mode: Mode,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for reproducible item draws
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many graded answers
        #[arg(long)]
        rounds: Option<usize>,
    },

    /// Check data files and report usable records and warnings
    Validate {
        /// Path to a data file or a directory holding bv/recursos/conjugaciones.json
        #[arg(long)]
        data: PathBuf,

        /// Category of a single file (default: inferred from the file name)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Resolve a mood and tense label into mood, time group and exact tense
    Classify {
        /// Mood label, e.g. "Subjuntivo"
        #[arg(long)]
        mood: String,

        /// Tense label, e.g. "Pretérito perfecto compuesto"
        #[arg(long, default_value = "")]
        tense: String,

        /// Reject labels that only match a fallback rule
        #[arg(long)]
        strict: bool,
    },

    /// Show or reset the saved score
    Score {
        /// Reset the counters to zero
        #[arg(long)]
        reset: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample data files
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lengua=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            mode,
            config,
            seed,
            rounds,
        } => commands::play::execute(mode, config, seed, rounds).await,
        Commands::Validate { data, category } => commands::validate::execute(data, category),
        Commands::Classify {
            mood,
            tense,
            strict,
        } => commands::classify::execute(&mood, &tense, strict),
        Commands::Score { reset, config } => commands::score::execute(reset, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
