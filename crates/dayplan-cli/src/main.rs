use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dayplan-cli", version, about = "Dayplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render plan: block positions, gaps and hour markers
    Plan {
        /// Plan file (TOML or JSON)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Idle gaps that could take a buffer block
    Gaps {
        /// Plan file (TOML or JSON)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether a time range is free
    Check {
        /// Plan file (TOML or JSON)
        file: PathBuf,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Day offset (0 = event day, 1 = the day after)
        #[arg(long, default_value_t = 0)]
        day: u32,
        /// Block being edited, ignored in the check
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Suggest a slot for the next block
    Suggest {
        /// Plan file (TOML or JSON)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sub-timeline of one block
    Sub {
        /// Plan file (TOML or JSON)
        file: PathBuf,
        /// Parent block id
        block_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan { file, json } => commands::plan::run(&file, json),
        Commands::Gaps { file, json } => commands::gaps::run(&file, json),
        Commands::Check {
            file,
            start,
            end,
            day,
            exclude,
        } => commands::check::run(&file, &start, &end, day, exclude.as_deref()),
        Commands::Suggest { file, json } => commands::suggest::run(&file, json),
        Commands::Sub {
            file,
            block_id,
            json,
        } => commands::sub::run(&file, &block_id, json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
