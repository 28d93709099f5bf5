use serde::{Deserialize, Serialize};

use crate::models::TeamId;
use crate::state::MatchState;

/// One finished set as seen by the match winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLine {
    /// One-based.
    pub set_number: usize,
    /// Winner's points first.
    pub score: String,
    /// The match winner took this set.
    pub won: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner_id: TeamId,
    pub winner_name: String,
    pub loser_name: String,
    pub winner_sets: u32,
    pub loser_sets: u32,
    /// False when exported before a team reached the sets needed to win.
    pub complete: bool,
    pub sets: Vec<SetLine>,
    pub log: Vec<String>,
}

impl MatchSummary {
    pub fn from_state(state: &MatchState) -> Self {
        let winner_id =
            if state.team_a.sets > state.team_b.sets { TeamId::A } else { TeamId::B };
        let winner = state.team(winner_id);
        let loser = state.team(winner_id.other());

        let sets = state
            .set_scores
            .iter()
            .enumerate()
            .map(|(i, set)| {
                let won = set.winner_id == winner_id;
                SetLine {
                    set_number: i + 1,
                    score: if won { oriented(&set.score) } else { reversed(&set.score) },
                    won,
                }
            })
            .collect();

        Self {
            winner_id,
            winner_name: winner.name.clone(),
            loser_name: loser.name.clone(),
            winner_sets: winner.sets,
            loser_sets: loser.sets,
            complete: state.is_complete(),
            sets,
            log: state.match_log.clone(),
        }
    }

    /// "3 - 1"
    pub fn final_result(&self) -> String {
        format!("{} - {}", self.winner_sets, self.loser_sets)
    }
}

fn split_score(score: &str) -> Option<(&str, &str)> {
    let (left, right) = score.split_once('-')?;
    let valid = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    (valid(left) && valid(right)).then_some((left, right))
}

fn oriented(score: &str) -> String {
    match split_score(score) {
        Some((w, l)) => format!("{}-{}", w, l),
        None => "0-0".to_string(),
    }
}

fn reversed(score: &str) -> String {
    match split_score(score) {
        Some((w, l)) => format!("{}-{}", l, w),
        None => "0-0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SetScore;

    fn finished_match() -> MatchState {
        let mut state = MatchState::new();
        state.team_a.name = "Leones".to_string();
        state.team_b.name = "Tigres".to_string();
        state.team_a.sets = 1;
        state.team_b.sets = 3;
        state.set_scores = vec![
            SetScore { winner_id: TeamId::A, score: "25-21".to_string() },
            SetScore { winner_id: TeamId::B, score: "25-19".to_string() },
            SetScore { winner_id: TeamId::B, score: "27-25".to_string() },
            SetScore { winner_id: TeamId::B, score: "25-10".to_string() },
        ];
        state
    }

    #[test]
    fn test_winner_by_sets_and_orientation() {
        let summary = MatchSummary::from_state(&finished_match());
        assert_eq!(summary.winner_id, TeamId::B);
        assert_eq!(summary.winner_name, "Tigres");
        assert_eq!(summary.final_result(), "3 - 1");
        assert!(summary.complete);

        let scores: Vec<&str> = summary.sets.iter().map(|s| s.score.as_str()).collect();
        assert_eq!(scores, vec!["21-25", "25-19", "27-25", "25-10"]);
        assert!(!summary.sets[0].won);
    }

    #[test]
    fn test_tied_sets_name_team_b() {
        let mut state = MatchState::new();
        state.team_a.sets = 1;
        state.team_b.sets = 1;
        let summary = MatchSummary::from_state(&state);
        assert_eq!(summary.winner_id, TeamId::B);
        assert!(!summary.complete);
    }

    #[test]
    fn test_malformed_score_reads_as_zero() {
        let mut state = finished_match();
        state.set_scores[0].score = "??".to_string();
        let summary = MatchSummary::from_state(&state);
        assert_eq!(summary.sets[0].score, "0-0");
    }
}
