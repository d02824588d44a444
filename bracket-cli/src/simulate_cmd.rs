//! Simulate command - play many random-pick brackets
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_results()
//! - Level 3: (delegated to bracket-stats crate)
//! - Level 4: formatting utilities

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use bracket_core::TournamentDef;
use bracket_stats::{simulate, LeaderboardOrder, SimulationConfig, SimulationResult};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Tournament definition JSON file
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Number of brackets to play
    #[arg(long, default_value = "1000")]
    pub runs: usize,

    /// Play runs on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Leaderboard order: wins or win_rate
    #[arg(long, default_value = "wins")]
    pub order: LeaderboardOrder,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Load the tournament
/// 2. Simulate the configured number of brackets
/// 3. Report the leaderboard
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let def = TournamentDef::load(&args.file)
        .with_context(|| format!("Failed to load tournament: {}", args.file.display()))?;
    let config = build_config(&args, seed);

    tracing::info!(
        "Simulating {} brackets of '{}' ({})",
        config.runs,
        def.title,
        if config.parallel { "parallel" } else { "sequential" }
    );

    let start = Instant::now();
    let result = simulate(&def, &config)
        .with_context(|| format!("Invalid tournament: {}", args.file.display()))?;
    tracing::info!("Simulation finished in {:.2?}", start.elapsed());

    let stdout = std::io::stdout();
    report_results(&def, &result, config.order, args.json, &mut stdout.lock())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &SimulateArgs, seed: Option<u64>) -> SimulationConfig {
    let mut config = SimulationConfig::new(args.runs).with_order(args.order);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if args.sequential {
        config = config.sequential();
    }
    config
}

fn report_results<W: Write>(
    def: &TournamentDef,
    result: &SimulationResult,
    order: LeaderboardOrder,
    json: bool,
    output: &mut W,
) -> Result<()> {
    if json {
        print_json_results(def, result, order, output)
    } else {
        print_text_results(def, result, output)
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_results<W: Write>(
    def: &TournamentDef,
    result: &SimulationResult,
    order: LeaderboardOrder,
    output: &mut W,
) -> Result<()> {
    let json = serde_json::json!({
        "title": def.title,
        "runs": result.runs,
        "order": order,
        "standings": result.standings,
    });
    writeln!(output, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

fn print_text_results<W: Write>(
    def: &TournamentDef,
    result: &SimulationResult,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "\n=== {} ({} runs) ===", def.title, result.runs)?;
    writeln!(
        output,
        "{:>4}  {:<24} {:>8} {:>9} {:>10}",
        "Rank", "Candidate", "Titles", "Champ %", "Match win %"
    )?;
    writeln!(output, "{}", "-".repeat(61))?;

    for standing in &result.standings {
        writeln!(
            output,
            "{:>4}  {:<24} {:>8} {:>8.1}% {:>10.1}%",
            standing.rank,
            standing.name,
            standing.win_count,
            standing.champion_rate * 100.0,
            standing.match_win_rate * 100.0
        )?;
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
