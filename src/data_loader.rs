use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::error::SwissError;
use crate::stats::Registry;

// One entry in a round. `team_2` is None for a bye, in which case the
// scores carry no information.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub team_1: String,
    pub team_2: Option<String>,
    pub score_1: u32,
    pub score_2: u32,
}

pub type Round = Vec<MatchRecord>;

impl MatchRecord {
    pub fn played(team_1: &str, team_2: &str, score_1: u32, score_2: u32) -> Self {
        Self {
            team_1: team_1.to_owned(),
            team_2: Some(team_2.to_owned()),
            score_1,
            score_2,
        }
    }

    pub fn bye(team: &str) -> Self {
        Self {
            team_1: team.to_owned(),
            team_2: None,
            score_1: 0,
            score_2: 0,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.team_2.is_none()
    }
}

// Dispatches on extension: .json gets the structured format, everything
// else the plain result-file format.
pub fn load_history(path: &str) -> Result<(Registry, Vec<Round>), SwissError> {
    let data = fs::read_to_string(path)?;
    if Path::new(path).extension().is_some_and(|e| e == "json") {
        parse_json(&data)
    } else {
        parse_text(&data)
    }
}

// Plain result-file format: leading lines are team names in seed order, a
// line holding just a number opens a round, and each following line is
// "team1,team2,score1,score2" until the next round header. An empty second
// name marks a bye.
pub fn parse_text(input: &str) -> Result<(Registry, Vec<Round>), SwissError> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(n, l)| (n + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    let is_round_header = |l: &str| !l.is_empty() && l.chars().all(|c| c.is_ascii_digit());

    let mut names = Vec::new();
    let mut i = 0;
    while i < lines.len() && !is_round_header(lines[i].1) {
        names.push(lines[i].1.to_owned());
        i += 1;
    }
    let registry = Registry::from_names(names)?;

    let mut rounds: Vec<Round> = Vec::new();
    while i < lines.len() {
        // Round header; the ordinal itself is implied by position.
        i += 1;

        let mut matches = Vec::new();
        while i < lines.len() && !is_round_header(lines[i].1) {
            let (line_no, line) = lines[i];
            matches.push(parse_match_line(line_no, line)?);
            i += 1;
        }
        rounds.push(matches);
    }

    Ok((registry, rounds))
}

fn parse_match_line(line_no: usize, line: &str) -> Result<MatchRecord, SwissError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();

    match parts.as_slice() {
        // A lone name is shorthand for a bye.
        [team] => Ok(MatchRecord::bye(team)),
        [t1, t2, s1, s2] => {
            if t2.is_empty() {
                return Ok(MatchRecord::bye(t1));
            }
            let score_1 = parse_score(line_no, s1)?;
            let score_2 = parse_score(line_no, s2)?;
            Ok(MatchRecord::played(t1, t2, score_1, score_2))
        }
        _ => Err(SwissError::Parse {
            line: line_no,
            msg: format!("expected 'team1,team2,score1,score2', got '{line}'"),
        }),
    }
}

fn parse_score(line_no: usize, raw: &str) -> Result<u32, SwissError> {
    raw.parse().map_err(|_| SwissError::Parse {
        line: line_no,
        msg: format!("invalid score '{raw}'"),
    })
}

// Structured match-data format. Field names arrive camelCase and scores
// sometimes arrive as strings, depending on the exporter.
#[derive(Serialize, Deserialize, Debug)]
struct MatchData {
    pub teams: Vec<String>,
    pub rounds: Vec<JsonRound>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonRound {
    pub matches: Vec<JsonMatch>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonMatch {
    #[serde(rename(deserialize = "team1"))]
    pub team_1: String,
    #[serde(rename(deserialize = "team2"), default)]
    pub team_2: Option<String>,
    #[serde(rename(deserialize = "score1"), default)]
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub score_1: u32,
    #[serde(rename(deserialize = "score2"), default)]
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub score_2: u32,
}

pub fn parse_json(input: &str) -> Result<(Registry, Vec<Round>), SwissError> {
    let data: MatchData = serde_json::from_str(input)?;
    let registry = Registry::from_names(data.teams)?;

    let rounds = data
        .rounds
        .into_iter()
        .map(|r| {
            r.matches
                .into_iter()
                .map(|m| MatchRecord {
                    // Some exporters write a bye as an empty team2 string.
                    team_2: m.team_2.filter(|t| !t.is_empty()),
                    team_1: m.team_1,
                    score_1: m.score_1,
                    score_2: m.score_2,
                })
                .collect()
        })
        .collect();

    Ok((registry, rounds))
}
