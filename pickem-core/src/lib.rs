mod countdown;
mod matchup;

pub use countdown::Countdown;
pub use matchup::{away_vs_home_text, day_time_place_text, rest_and_spread_text};

pub type GameId = String;
pub type TeamAbbrev = String;
pub type Week = u32;

/// Result of a finished game. Equal scores produce `Tie`, which no pick
/// can match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(TeamAbbrev),
    Tie,
}

impl GameOutcome {
    pub fn from_scores(
        away_team: &str,
        away_score: i64,
        home_team: &str,
        home_score: i64,
    ) -> GameOutcome {
        if away_score > home_score {
            GameOutcome::Winner(away_team.to_string())
        } else if home_score > away_score {
            GameOutcome::Winner(home_team.to_string())
        } else {
            GameOutcome::Tie
        }
    }

    pub fn matches_pick(&self, picked_team: &str) -> bool {
        match self {
            GameOutcome::Winner(team) => team == picked_team,
            GameOutcome::Tie => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_is_team_with_higher_score() {
        assert_eq!(
            GameOutcome::from_scores("BUF", 31, "LA", 10),
            GameOutcome::Winner("BUF".to_string())
        );
        assert_eq!(
            GameOutcome::from_scores("BUF", 10, "LA", 31),
            GameOutcome::Winner("LA".to_string())
        );
    }

    #[test]
    fn test_equal_scores_are_a_tie() {
        assert_eq!(GameOutcome::from_scores("IND", 21, "HOU", 21), GameOutcome::Tie);
    }

    #[test]
    fn test_no_pick_matches_a_tie() {
        let outcome = GameOutcome::from_scores("IND", 21, "HOU", 21);
        assert!(!outcome.matches_pick("IND"));
        assert!(!outcome.matches_pick("HOU"));
    }

    #[test]
    fn test_pick_matches_only_the_winner() {
        let outcome = GameOutcome::from_scores("BUF", 31, "LA", 10);
        assert!(outcome.matches_pick("BUF"));
        assert!(!outcome.matches_pick("LA"));
    }
}
