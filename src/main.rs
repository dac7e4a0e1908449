use swiss_rank::{data_loader, report, run_swiss, SwissContext};

/*
    Reads a result file (plain text or .json), prints the standings and the
    next round's pairings, and writes standings.csv next to the working
    directory. Adjust the model with SwissContext.
*/

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "result.txt".to_string());
    let ctx = SwissContext::default();

    let (mut registry, rounds) = match data_loader::load_history(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("failed to load '{path}': {e}");
            std::process::exit(1);
        }
    };

    let output = match run_swiss(&mut registry, &rounds, &ctx) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("pipeline failed: {e}");
            std::process::exit(1);
        }
    };

    report::print_standings(&registry, &output.standings);
    report::print_pairings(&output.pairings);

    if let Err(e) = report::write_standings_csv(&registry, &output.standings, "standings.csv") {
        eprintln!("failed to write standings.csv: {e}");
        std::process::exit(1);
    }
}
