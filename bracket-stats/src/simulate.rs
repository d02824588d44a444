//! Bracket simulation - many brackets with uniformly random picks
//!
//! Level 1 - Orchestration and Level 2 - Phases

use bracket_core::{
    validate_candidates, BracketEngine, BracketError, Candidate, StatsBatch, TournamentDef,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::ledger::Ledger;
use crate::standings::{compute_standings, Standing};

/// Outcome of a simulation
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Brackets played
    pub runs: usize,
    /// Aggregated counters over all runs
    pub ledger: Ledger,
    /// Leaderboard computed from the ledger
    pub standings: Vec<Standing>,
}

impl SimulationResult {
    /// Top standing
    pub fn leader(&self) -> Option<&Standing> {
        self.standings.first()
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Play `config.runs` brackets over the tournament's candidates
///
/// # Arguments
/// * `def` - Tournament whose candidates are played
/// * `config` - Simulation configuration
///
/// # Returns
/// The aggregated ledger and standings, or the validation error of the
/// candidate set
pub fn simulate(
    def: &TournamentDef,
    config: &SimulationConfig,
) -> Result<SimulationResult, BracketError> {
    validate_candidates(&def.candidates)?;

    let seeds = prepare_run_seeds(config);
    let ledger = if config.parallel {
        seeds
            .par_iter()
            .map(|&seed| play_random_bracket(&def.candidates, seed))
            .try_fold(Ledger::new, |mut ledger, batch| {
                ledger.apply(&batch?);
                Ok::<Ledger, BracketError>(ledger)
            })
            .try_reduce(Ledger::new, |mut a, b| {
                a.merge(&b);
                Ok(a)
            })?
    } else {
        let mut ledger = Ledger::new();
        for &seed in &seeds {
            ledger.apply(&play_random_bracket(&def.candidates, seed)?);
        }
        ledger
    };

    let standings = compute_standings(&def.candidates, &ledger, config.order);

    tracing::info!(
        runs = config.runs,
        title = %def.title,
        "simulation finished"
    );

    Ok(SimulationResult {
        runs: config.runs,
        ledger,
        standings,
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Play one bracket, picking left or right with equal probability
pub fn play_random_bracket(
    candidates: &[Candidate],
    seed: u64,
) -> Result<StatsBatch, BracketError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut engine = BracketEngine::with_seed(Some(rng.gen()));
    engine.initialize(candidates.to_vec())?;

    while let Some((left, right)) = engine.current_pair() {
        let pick = if rng.gen_bool(0.5) {
            left.id.clone()
        } else {
            right.id.clone()
        };
        engine.record_pick(&pick)?;
    }

    engine.stats_batch()
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// One seed per run; consecutive from the base seed when configured
fn prepare_run_seeds(config: &SimulationConfig) -> Vec<u64> {
    match config.seed {
        Some(base) => (0..config.runs as u64).map(|i| base.wrapping_add(i)).collect(),
        None => {
            let mut rng = rand::thread_rng();
            (0..config.runs).map(|_| rng.gen()).collect()
        }
    }
}
