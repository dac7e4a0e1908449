use std::path::Path;

use crate::error::SwissError;
use crate::pairing::Pairing;
use crate::stats::Registry;

const HEADERS: [&str; 9] = [
    "Rank", "Team", "Score", "Buchholz", "MapDiff", "H2H Score", "H2H MapDiff", "Cumulative",
    "Seed",
];

// H2H columns show -1 for teams that never entered a tie group.
fn h2h_columns(reg: &Registry, idx: usize) -> (f64, i64) {
    match &reg.team(idx).head_to_head {
        Some(h) => (h.match_points, h.margin_again()),
        None => (-1.0, -1),
    }
}

pub fn print_standings(reg: &Registry, order: &[usize]) {
    println!(
        "{0:<5} {1:<28} {2:>6} {3:>9} {4:>8} {5:>10} {6:>12} {7:>11} {8:>5}",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        HEADERS[3],
        HEADERS[4],
        HEADERS[5],
        HEADERS[6],
        HEADERS[7],
        HEADERS[8],
    );
    for (rank, &i) in order.iter().enumerate() {
        let t = reg.team(i);
        let (h2h_mp, h2h_sp) = h2h_columns(reg, i);
        println!(
            "{0:<5} {1:<28} {2:>6.1} {3:>9.1} {4:>8} {5:>10.1} {6:>12} {7:>11.1} {8:>5}",
            rank + 1,
            t.name,
            t.match_points,
            t.buchholz,
            t.score_margin,
            h2h_mp,
            h2h_sp,
            t.cumulative_score,
            t.seed,
        );
    }
}

pub fn print_pairings(pairings: &[Pairing]) {
    println!("\nNext Round Pairings:");
    for p in pairings {
        match &p.away {
            Some(away) => println!("{} vs {}", p.home, away),
            None => println!("{} - BYE", p.home),
        }
    }
}

pub fn write_standings_csv<P: AsRef<Path>>(
    reg: &Registry,
    order: &[usize],
    path: P,
) -> Result<(), SwissError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(HEADERS)?;

    for (rank, &i) in order.iter().enumerate() {
        let t = reg.team(i);
        let (h2h_mp, h2h_sp) = h2h_columns(reg, i);
        wtr.write_record(&[
            (rank + 1).to_string(),
            t.name.clone(),
            t.match_points.to_string(),
            t.buchholz.to_string(),
            t.score_margin.to_string(),
            h2h_mp.to_string(),
            h2h_sp.to_string(),
            t.cumulative_score.to_string(),
            t.seed.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::MatchRecord;
    use crate::ranking::compute_standings;
    use crate::stats::aggregate;
    use crate::swiss_context::SwissContext;

    #[test]
    fn csv_export_round_trips() {
        let mut reg =
            Registry::from_names(["A", "B"].iter().map(|n| n.to_string())).unwrap();
        let rounds = vec![vec![MatchRecord::played("A", "B", 2, 0)]];
        let ctx = SwissContext::default();
        aggregate(&mut reg, &rounds, &ctx).unwrap();
        let order = compute_standings(&mut reg, &ctx);

        let path = std::env::temp_dir().join("swiss_rank_standings_test.csv");
        write_standings_csv(&reg, &order, &path).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let mut lines = data.lines();
        assert!(lines.next().unwrap().starts_with("Rank,Team,Score"));
        assert!(lines.next().unwrap().starts_with("1,A,1"));
        assert!(lines.next().unwrap().starts_with("2,B,0"));

        std::fs::remove_file(&path).ok();
    }
}
