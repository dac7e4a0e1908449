use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data_loader::{MatchRecord, Round};
use crate::error::SwissError;
use crate::pairing::{generate_pairings, played_set};
use crate::ranking::compute_standings;
use crate::stats::{aggregate, Registry};
use crate::swiss_context::SwissContext;
use crate::util::pair_key;

// Plays an entire random event through the real pipeline and reports what
// the invariants looked like afterwards. Handy for eyeballing pairing
// behavior under configurations the curated tests don't cover.
pub struct AuditReport {
    pub rounds: Vec<Round>,
    pub rematches: usize,
    pub byes_by_team: Vec<usize>,
}

pub fn simulate_event(
    num_teams: usize,
    num_rounds: usize,
    seed: u64,
    ctx: &SwissContext,
) -> Result<AuditReport, SwissError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let names: Vec<String> = (1..=num_teams).map(|i| format!("Team {i:02}")).collect();
    let mut reg = Registry::from_names(names)?;

    let mut rounds: Vec<Round> = Vec::new();
    let mut rematches = 0;

    for _ in 0..num_rounds {
        aggregate(&mut reg, &rounds, ctx)?;
        let standings = compute_standings(&mut reg, ctx);
        let pairings = generate_pairings(&standings, &reg, &rounds, ctx);

        let played = played_set(&reg, &rounds);
        let mut next: Round = Vec::new();
        for p in &pairings {
            match &p.away {
                Some(away) => {
                    if let (Some(a), Some(b)) = (reg.index_of(&p.home), reg.index_of(away)) {
                        if played.contains(&pair_key(a, b)) {
                            log::warn!("rematch {} vs {}", p.home, away);
                            rematches += 1;
                        }
                    }
                    let score_1 = rng.random_range(0..=3);
                    let score_2 = rng.random_range(0..=3);
                    next.push(MatchRecord::played(&p.home, away, score_1, score_2));
                }
                None => next.push(MatchRecord::bye(&p.home)),
            }
        }
        rounds.push(next);
    }

    aggregate(&mut reg, &rounds, ctx)?;
    let byes_by_team = reg.teams().iter().map(|t| t.bye_count()).collect();

    Ok(AuditReport {
        rounds,
        rematches,
        byes_by_team,
    })
}
