//! Integration tests for the bracket platform
//!
//! Tests the full stack: tournament files, the engine, the durable ledger
//! and simulation.

use bracket_core::{BracketEngine, Candidate, CandidateId, PickOutcome, TournamentDef};
use bracket_stats::{compute_standings, simulate, LeaderboardOrder, Ledger, SimulationConfig};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn test_tournament(n: usize) -> TournamentDef {
    let candidates = (0..n)
        .map(|i| {
            Candidate::new(
                format!("c{}", i),
                format!("Candidate {}", i),
                format!("https://img.example/{}.png", i),
            )
        })
        .collect();
    TournamentDef::new("Integration", candidates)
}

/// Play one bracket where the lexicographically smaller id always wins
fn play_smallest_wins(def: &TournamentDef, seed: u64) -> (CandidateId, bracket_core::StatsBatch) {
    let mut engine = BracketEngine::with_seed(Some(seed));
    engine.initialize(def.candidates.clone()).unwrap();

    loop {
        let pick = {
            let (left, right) = engine.current_pair().unwrap();
            std::cmp::min(&left.id, &right.id).clone()
        };
        if let PickOutcome::Champion(champion) = engine.record_pick(&pick).unwrap() {
            return (champion.id, engine.stats_batch().unwrap());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_tournament_file_to_leaderboard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tournament.json");
    test_tournament(8).save(&path).unwrap();

    let def = TournamentDef::load(&path).unwrap();
    def.validate().unwrap();

    let mut ledger = Ledger::new();
    for seed in 0..5 {
        let (champion, batch) = play_smallest_wins(&def, seed);
        assert_eq!(champion, CandidateId::from("c0"));
        ledger.apply(&batch);
    }

    let standings = compute_standings(&def.candidates, &ledger, LeaderboardOrder::Wins);
    assert_eq!(ledger.total_plays, 5);
    assert_eq!(standings[0].candidate_id, CandidateId::from("c0"));
    assert_eq!(standings[0].win_count, 5);
    assert_eq!(standings[0].match_win_count, 15);
    assert!((standings[0].champion_rate - 1.0).abs() < 1e-6);
}

#[test]
fn test_simulation_is_reproducible_with_seed() {
    let def = test_tournament(16);
    let config = SimulationConfig::new(200).with_seed(42);

    let parallel = simulate(&def, &config).unwrap();
    let sequential = simulate(&def, &config.clone().sequential()).unwrap();

    assert_eq!(parallel.ledger.total_plays, 200);
    assert_eq!(parallel.standings, sequential.standings);
}

#[test]
fn test_invalid_tournament_cannot_be_simulated() {
    let def = test_tournament(12);
    assert!(def.validate().is_err());
    assert!(simulate(&def, &SimulationConfig::new(10)).is_err());
}
