use std::cmp::Ordering;
use std::collections::HashSet;

use crate::stats::{HeadToHead, Registry, TeamStats};
use crate::swiss_context::SwissContext;

// Produces the final standings as rank-ordered indices into the registry.
// Ties on the primary key are settled group by group with head-to-head
// results; the head-to-head record of every group member is left on the
// team for reporting. Singleton groups keep it at None.
pub fn compute_standings(reg: &mut Registry, ctx: &SwissContext) -> Vec<usize> {
    let mut order: Vec<usize> = (0..reg.len()).collect();
    order.sort_by(|&a, &b| primary_cmp(reg.team(a), reg.team(b)));

    // Maximal contiguous runs with an identical primary key form the tie
    // groups. Group boundaries never move, only the order inside one.
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len()
            && primary_cmp(reg.team(order[i]), reg.team(order[j])) == Ordering::Equal
        {
            j += 1;
        }
        if j - i > 1 {
            log::debug!("tie group of {} at rank {}", j - i, i + 1);
            resolve_group(reg, &mut order[i..j], ctx);
        }
        i = j;
    }

    order
}

// Primary ordering key, best first: match points, Buchholz, score margin.
pub fn primary_cmp(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.match_points
        .total_cmp(&a.match_points)
        .then(b.buchholz.total_cmp(&a.buchholz))
        .then(b.score_margin.cmp(&a.score_margin))
}

fn resolve_group(reg: &mut Registry, group: &mut [usize], ctx: &SwissContext) {
    let names: HashSet<String> = group
        .iter()
        .map(|&idx| reg.team(idx).name.clone())
        .collect();

    for &idx in group.iter() {
        let mut h2h = HeadToHead {
            match_points: 0.0,
            score_margin: 0,
            wins: 0,
        };
        for rr in &reg.team(idx).round_results {
            if rr.opponent.as_deref().is_some_and(|o| names.contains(o)) {
                h2h.match_points += rr.match_point;
                h2h.score_margin += rr.score_margin;
                if rr.match_point == 1.0 {
                    h2h.wins += 1;
                }
            }
        }
        reg.team_mut(idx).head_to_head = Some(h2h);
    }

    group.sort_by(|&a, &b| h2h_cmp(reg.team(a), reg.team(b), ctx));
}

fn h2h_cmp(a: &TeamStats, b: &TeamStats, ctx: &SwissContext) -> Ordering {
    let (ha, hb) = match (&a.head_to_head, &b.head_to_head) {
        (Some(ha), Some(hb)) => (ha, hb),
        // Only reachable for singleton groups, which are never re-sorted.
        _ => return a.seed.cmp(&b.seed),
    };

    hb.match_points
        .total_cmp(&ha.match_points)
        .then(hb.score_margin.cmp(&ha.score_margin))
        .then(hb.wins.cmp(&ha.wins))
        .then(hb.margin_again().cmp(&ha.margin_again()))
        .then_with(|| {
            if ctx.use_opponent_strength {
                b.cop
                    .total_cmp(&a.cop)
                    .then(b.cumulative_score.total_cmp(&a.cumulative_score))
            } else {
                Ordering::Equal
            }
        })
        // Lower seed ranks higher, always the last word.
        .then(a.seed.cmp(&b.seed))
}
