//! Swiss-system tournament standings and pairing.
//!
//! The pipeline is three pure stages over a team registry and an ordered
//! round history: statistics aggregation, multi-level tiebreak ranking,
//! and next-round pairing with floaters. `run_swiss` wires them together;
//! the stages are also usable on their own.

pub mod audit;
pub mod data_loader;
pub mod error;
pub mod pairing;
pub mod ranking;
pub mod report;
pub mod stats;
pub mod swiss_context;
pub mod util;

pub use data_loader::{load_history, MatchRecord, Round};
pub use error::SwissError;
pub use pairing::{generate_pairings, Pairing};
pub use ranking::compute_standings;
pub use stats::{aggregate, Registry, TeamStats};
pub use swiss_context::SwissContext;

#[derive(Debug)]
pub struct SwissOutput {
    // Rank-ordered indices into the registry.
    pub standings: Vec<usize>,
    pub pairings: Vec<Pairing>,
}

// Full pipeline: aggregate, rank, pair. Deterministic, so re-running on
// the same inputs reproduces the same output exactly.
pub fn run_swiss(
    reg: &mut Registry,
    rounds: &[Round],
    ctx: &SwissContext,
) -> Result<SwissOutput, SwissError> {
    stats::aggregate(reg, rounds, ctx)?;
    let standings = ranking::compute_standings(reg, ctx);
    let pairings = pairing::generate_pairings(&standings, reg, rounds, ctx);
    log::info!(
        "{} teams ranked, {} pairings for the next round",
        reg.len(),
        pairings.len()
    );
    Ok(SwissOutput {
        standings,
        pairings,
    })
}
