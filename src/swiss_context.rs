#[derive(Debug, Clone)]
pub struct SwissContext {
    // Points credited for a bye round. Tournaments that only half-credit
    // byes set this to 0.5.
    pub bye_point: f64,

    // Adds COP and cumulative score to the head-to-head tiebreak chain.
    // Off by default: group-local results settle most ties on their own.
    pub use_opponent_strength: bool,

    // Whether the last running-total entry counts toward the cumulative
    // scalar. Both behaviors have shipped; the flag makes the choice
    // explicit instead of depending on which script you happened to run.
    pub count_final_cumulative_round: bool,

    // When the final floater pool is odd, hand the bye to the member with
    // the fewest prior byes instead of whoever the pairwise scan strands.
    pub fair_byes: bool,
}

impl Default for SwissContext {
    fn default() -> Self {
        Self {
            bye_point: 1.0,
            use_opponent_strength: false,
            count_final_cumulative_round: true,
            fair_byes: true,
        }
    }
}
