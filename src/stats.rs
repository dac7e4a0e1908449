use std::collections::HashMap;

use serde::Serialize;

use crate::data_loader::Round;
use crate::error::SwissError;
use crate::swiss_context::SwissContext;

// One completed round from a single team's perspective. `opponent` is None
// for a bye.
#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    pub round_index: usize,
    pub opponent: Option<String>,
    pub match_point: f64,
    pub score_margin: i64,
}

// Head-to-head totals inside one tie group. Only meaningful for groups of
// two or more; singleton groups keep `TeamStats::head_to_head` at None.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeadToHead {
    pub match_points: f64,
    pub score_margin: i64,
    pub wins: u32,
}

impl HeadToHead {
    // Legacy output carried two margin columns that were always equal.
    // Downstream consumers still expect both, so the second one is an alias.
    pub fn margin_again(&self) -> i64 {
        self.score_margin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamStats {
    pub name: String,
    pub seed: usize,

    pub match_points: f64,
    pub score_margin: i64,
    pub round_results: Vec<RoundResult>,

    pub buchholz: f64,
    pub cumulative_rounds: Vec<f64>,
    pub cumulative_score: f64,
    pub cop: f64,

    pub head_to_head: Option<HeadToHead>,
}

impl TeamStats {
    fn new(name: String, seed: usize) -> Self {
        Self {
            name,
            seed,
            match_points: 0.0,
            score_margin: 0,
            round_results: Vec::new(),
            buchholz: 0.0,
            cumulative_rounds: Vec::new(),
            cumulative_score: 0.0,
            cop: 0.0,
            head_to_head: None,
        }
    }

    pub fn bye_count(&self) -> usize {
        self.round_results.iter().filter(|rr| rr.opponent.is_none()).count()
    }

    // Clears everything the pipeline derives. Name and seed survive.
    fn reset(&mut self) {
        self.match_points = 0.0;
        self.score_margin = 0;
        self.round_results.clear();
        self.buchholz = 0.0;
        self.cumulative_rounds.clear();
        self.cumulative_score = 0.0;
        self.cop = 0.0;
        self.head_to_head = None;
    }
}

// Name -> stats lookup for one tournament. Seeds come from insertion order
// and never change afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    teams: Vec<TeamStats>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn from_names<I>(names: I) -> Result<Self, SwissError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut reg = Registry::default();
        for name in names {
            if reg.by_name.contains_key(&name) {
                return Err(SwissError::DuplicateTeam(name));
            }
            let seed = reg.teams.len() + 1;
            reg.by_name.insert(name.clone(), reg.teams.len());
            reg.teams.push(TeamStats::new(name, seed));
        }
        Ok(reg)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn team(&self, idx: usize) -> &TeamStats {
        &self.teams[idx]
    }

    pub fn teams(&self) -> &[TeamStats] {
        &self.teams
    }

    pub(crate) fn team_mut(&mut self, idx: usize) -> &mut TeamStats {
        &mut self.teams[idx]
    }

    pub fn reset_stats(&mut self) {
        for t in &mut self.teams {
            t.reset();
        }
    }
}

pub fn match_point(score_for: u32, score_against: u32) -> f64 {
    if score_for > score_against {
        1.0
    } else if score_for == score_against {
        0.5
    } else {
        0.0
    }
}

// Replays the full history and fills in every derived metric. Entry point
// for the aggregation stage.
pub fn aggregate(reg: &mut Registry, rounds: &[Round], ctx: &SwissContext) -> Result<(), SwissError> {
    reg.reset_stats();
    process_rounds(reg, rounds, ctx)?;
    compute_buchholz(reg);
    compute_cumulative_scores(reg, ctx);
    compute_cop(reg);
    log::debug!("aggregated {} rounds for {} teams", rounds.len(), reg.len());
    Ok(())
}

pub fn process_rounds(reg: &mut Registry, rounds: &[Round], ctx: &SwissContext) -> Result<(), SwissError> {
    for (i, round) in rounds.iter().enumerate() {
        let rnd = i + 1;
        for m in round {
            match &m.team_2 {
                Some(team_2) => {
                    let a = resolve(reg, &m.team_1, rnd)?;
                    let b = resolve(reg, team_2, rnd)?;
                    let margin = m.score_1 as i64 - m.score_2 as i64;
                    credit(reg, a, rnd, Some(team_2.clone()), match_point(m.score_1, m.score_2), margin)?;
                    credit(reg, b, rnd, Some(m.team_1.clone()), match_point(m.score_2, m.score_1), -margin)?;
                }
                None => {
                    let a = resolve(reg, &m.team_1, rnd)?;
                    credit(reg, a, rnd, None, ctx.bye_point, 0)?;
                }
            }
        }
    }
    Ok(())
}

fn resolve(reg: &Registry, name: &str, round: usize) -> Result<usize, SwissError> {
    reg.index_of(name).ok_or_else(|| SwissError::UnknownTeam {
        name: name.to_owned(),
        round,
    })
}

fn credit(
    reg: &mut Registry,
    idx: usize,
    round: usize,
    opponent: Option<String>,
    match_point: f64,
    score_margin: i64,
) -> Result<(), SwissError> {
    let team = &mut reg.teams[idx];

    // History replays in round order, so a same-index collision can only be
    // a team listed twice within one round.
    if team.round_results.last().is_some_and(|rr| rr.round_index == round) {
        return Err(SwissError::DuplicateResult {
            name: team.name.clone(),
            round,
        });
    }

    team.match_points += match_point;
    team.score_margin += score_margin;
    team.round_results.push(RoundResult {
        round_index: round,
        opponent,
        match_point,
        score_margin,
    });
    Ok(())
}

// Buchholz is a single snapshot over final match points, not a per-round
// freeze. Byes contribute nothing.
pub fn compute_buchholz(reg: &mut Registry) {
    for i in 0..reg.teams.len() {
        let mut sum = 0.0;
        for rr in &reg.teams[i].round_results {
            if let Some(opp) = rr.opponent.as_deref().and_then(|o| reg.index_of(o)) {
                sum += reg.teams[opp].match_points;
            }
        }
        reg.teams[i].buchholz = sum;
    }
}

pub fn compute_cumulative_scores(reg: &mut Registry, ctx: &SwissContext) {
    for t in &mut reg.teams {
        t.round_results.sort_by_key(|rr| rr.round_index);

        t.cumulative_rounds.clear();
        let mut running = 0.0;
        for rr in &t.round_results {
            running += rr.match_point;
            t.cumulative_rounds.push(running);
        }

        let mut score: f64 = t.cumulative_rounds.iter().sum();
        if !ctx.count_final_cumulative_round {
            if let Some(last) = t.cumulative_rounds.last() {
                score -= last;
            }
        }

        // Back out the free points so byes don't read as schedule strength.
        score -= ctx.bye_point * t.bye_count() as f64;
        t.cumulative_score = score;
    }
}

pub fn compute_cop(reg: &mut Registry) {
    for i in 0..reg.teams.len() {
        let mut sum = 0.0;
        for rr in &reg.teams[i].round_results {
            if let Some(opp) = rr.opponent.as_deref().and_then(|o| reg.index_of(o)) {
                sum += reg.teams[opp].cumulative_score;
            }
        }
        reg.teams[i].cop = sum;
    }
}
