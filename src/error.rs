use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwissError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("duplicate team name '{0}'")]
    DuplicateTeam(String),

    #[error("round {round} references unknown team '{name}'")]
    UnknownTeam { name: String, round: usize },

    #[error("team '{name}' has two results in round {round}")]
    DuplicateResult { name: String, round: usize },
}

impl SwissError {
    // Data-integrity errors invalidate the whole run; IO/parse errors just
    // mean the input never made it into the pipeline.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            SwissError::DuplicateTeam(_)
                | SwissError::UnknownTeam { .. }
                | SwissError::DuplicateResult { .. }
        )
    }
}
