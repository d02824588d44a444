//! Play command - run one bracket interactively in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_tournament(), play_bracket(), report_summary()
//! - Level 3: prompt_pick(), read_choice()
//! - Level 4: formatting utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bracket_core::{BracketEngine, Candidate, Shuffler, TournamentDef};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Tournament definition JSON file
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,
}

/// What the player typed at a prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Choice {
    Left,
    Right,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load the tournament
/// 2. Play every match on stdin/stdout
/// 3. Print the champion and session counters
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let def = load_tournament(&args.file)?;

    let mut engine = BracketEngine::with_seed(seed);
    engine.initialize(def.candidates.clone())?;

    tracing::info!(
        "Playing '{}' with {} candidates",
        def.title,
        engine.candidate_count()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match play_bracket(&mut engine, stdin.lock(), &mut output)? {
        Some(_) => report_summary(&engine, &def, &mut output)?,
        None => writeln!(output, "\nBracket abandoned; nothing recorded.")?,
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load and validate a tournament definition
fn load_tournament(path: &std::path::Path) -> Result<TournamentDef> {
    let def = TournamentDef::load(path)
        .with_context(|| format!("Failed to load tournament: {}", path.display()))?;
    def.validate()
        .with_context(|| format!("Invalid tournament: {}", path.display()))?;
    Ok(def)
}

/// Prompt for every match until a champion is decided.
///
/// Returns `None` when the player quits or input ends first.
fn play_bracket<S, R, W>(
    engine: &mut BracketEngine<S>,
    mut input: R,
    output: &mut W,
) -> Result<Option<Candidate>>
where
    S: Shuffler,
    R: BufRead,
    W: Write,
{
    loop {
        let (left, right) = match engine.current_pair() {
            Some((left, right)) => (left.clone(), right.clone()),
            None => return Ok(engine.champion().cloned()),
        };

        prompt_pick(engine, &left, &right, output)?;

        let picked = match read_choice(&mut input, output)? {
            Choice::Left => left,
            Choice::Right => right,
            Choice::Quit => return Ok(None),
        };

        engine.record_pick(&picked.id)?;
    }
}

/// Print the champion and per-candidate session counters
fn report_summary<S: Shuffler, W: Write>(
    engine: &BracketEngine<S>,
    def: &TournamentDef,
    output: &mut W,
) -> Result<()> {
    if let Some(champion) = engine.champion() {
        writeln!(output, "\n=== Champion: {} ===", champion.name)?;
    }

    writeln!(output, "\n{:<24} {:>6} {:>8} {:>8}", "Candidate", "Wins", "Matches", "Rate")?;
    writeln!(output, "{}", "-".repeat(50))?;

    for candidate in &def.candidates {
        let counters = engine.counters(&candidate.id).unwrap_or_default();
        writeln!(
            output,
            "{:<24} {:>6} {:>8} {:>7.1}%",
            truncate(&candidate.name, 24),
            counters.match_wins,
            counters.match_exposures,
            counters.win_rate() * 100.0
        )?;
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn prompt_pick<S: Shuffler, W: Write>(
    engine: &BracketEngine<S>,
    left: &Candidate,
    right: &Candidate,
    output: &mut W,
) -> Result<()> {
    if let (Some(label), Some(progress)) = (engine.round_label(), engine.match_progress()) {
        writeln!(
            output,
            "\n[{}] match {} of {}",
            label, progress.current_match, progress.total_matches
        )?;
    }
    writeln!(output, "  1) {}", left.name)?;
    writeln!(output, "  2) {}", right.name)?;
    Ok(())
}

/// Read until a valid choice or end of input
fn read_choice<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Choice> {
    let mut line = String::new();
    loop {
        write!(output, "Pick 1 or 2 (q to quit): ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(Choice::Quit);
        }

        match parse_choice(&line) {
            Some(choice) => return Ok(choice),
            None => writeln!(output, "Please enter 1, 2 or q.")?,
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_choice(line: &str) -> Option<Choice> {
    match line.trim().to_ascii_lowercase().as_str() {
        "1" | "l" | "left" => Some(Choice::Left),
        "2" | "r" | "right" => Some(Choice::Right),
        "q" | "quit" => Some(Choice::Quit),
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_core::{CandidateId, IdentityShuffler};
    use std::io::Cursor;

    fn make_def(n: usize) -> TournamentDef {
        let candidates = (0..n)
            .map(|i| {
                Candidate::new(
                    format!("c{}", i),
                    format!("Candidate {}", i),
                    format!("/img/{}.png", i),
                )
            })
            .collect();
        TournamentDef::new("Snacks", candidates)
    }

    fn identity_engine(def: &TournamentDef) -> BracketEngine<IdentityShuffler> {
        let mut engine = BracketEngine::new(IdentityShuffler);
        engine.initialize(def.candidates.clone()).unwrap();
        engine
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1\n"), Some(Choice::Left));
        assert_eq!(parse_choice(" 2 "), Some(Choice::Right));
        assert_eq!(parse_choice("Q"), Some(Choice::Quit));
        assert_eq!(parse_choice("3"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn test_play_bracket_always_left() {
        let def = make_def(4);
        let mut engine = identity_engine(&def);
        let mut output = Vec::new();

        let champion = play_bracket(&mut engine, Cursor::new("1\n1\n1\n"), &mut output).unwrap();

        // Identity order: c0 beats c1, c2 beats c3, c0 beats c2
        assert_eq!(champion.map(|c| c.id), Some(CandidateId::from("c0")));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[round of 4] match 1 of 2"));
        assert!(text.contains("[final] match 1 of 1"));
    }

    #[test]
    fn test_invalid_input_is_reprompted() {
        let def = make_def(2);
        let mut engine = identity_engine(&def);
        let mut output = Vec::new();

        let champion = play_bracket(&mut engine, Cursor::new("x\n2\n"), &mut output).unwrap();

        assert_eq!(champion.map(|c| c.id), Some(CandidateId::from("c1")));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Please enter 1, 2 or q."));
    }

    #[test]
    fn test_quit_and_eof_abandon() {
        let def = make_def(4);

        let mut engine = identity_engine(&def);
        let result = play_bracket(&mut engine, Cursor::new("1\nq\n"), &mut Vec::new()).unwrap();
        assert!(result.is_none());
        assert!(!engine.is_concluded());
        assert_eq!(engine.matches_played(), 1);

        let mut engine = identity_engine(&def);
        let result = play_bracket(&mut engine, Cursor::new(""), &mut Vec::new()).unwrap();
        assert!(result.is_none());
        assert_eq!(engine.matches_played(), 0);
    }

    #[test]
    fn test_report_summary_lists_every_candidate() {
        let def = make_def(4);
        let mut engine = identity_engine(&def);
        play_bracket(&mut engine, Cursor::new("2\n2\n2\n"), &mut Vec::new()).unwrap();

        let mut output = Vec::new();
        report_summary(&engine, &def, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("=== Champion: Candidate 3 ==="));
        for candidate in &def.candidates {
            assert!(text.contains(&candidate.name));
        }
    }

    #[test]
    fn test_load_tournament_rejects_bad_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        make_def(3).save(&path).unwrap();

        let err = load_tournament(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid tournament"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long name", 6), "a ver…");
    }
}
