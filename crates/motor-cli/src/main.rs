//! Motor CLI - command-line interface for the motor engine-sound synthesizer.

mod commands;
mod scenario;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motor")]
#[command(author, version, about = "Engine sound synthesis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List and manage engine profiles
    Profiles(commands::profiles::ProfilesArgs),

    /// Print the crossfade band table of a profile
    Bands(commands::bands::BandsArgs),

    /// Check a profile for layout and tuning problems
    Validate(commands::validate::ValidateArgs),

    /// Run an offline, deterministic driving scenario
    Simulate(commands::simulate::SimulateArgs),

    /// Run a scenario in real time with a separate input thread
    Live(commands::live::LiveArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so table and JSON output on stdout stay clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Profiles(args) => commands::profiles::run(args),
        Commands::Bands(args) => commands::bands::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Live(args) => commands::live::run(args),
    }
}
