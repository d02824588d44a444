//! Bracket CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the HTTP API server
//! - play: Play a bracket interactively in the terminal
//! - simulate: Play many random brackets and print the leaderboard

mod play_cmd;
mod server;
mod simulate_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bracket")]
#[command(about = "Elimination bracket preference tournaments")]
struct Cli {
    /// Seed for reproducible shuffles
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve(server::ServerArgs),
    /// Play a bracket in the terminal
    Play(play_cmd::PlayArgs),
    /// Simulate random brackets and print the leaderboard
    Simulate(simulate_cmd::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args, cli.seed),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Simulate(args) => simulate_cmd::run(args, cli.seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_seed_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bracket", "simulate", "--file", "t.json", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        assert!(matches!(cli.command, Commands::Simulate(_)));
    }
}
