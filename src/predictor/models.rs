use serde::{Deserialize, Serialize};

/// A validated snapshot of a live innings, ready for estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSituation {
    pub batting_team: String,
    pub bowling_team: String,
    pub current_runs: u32,
    /// 0–10
    pub current_wickets: u32,
    /// 0–20
    pub overs_completed: u32,
    /// 0–5
    pub balls_in_current_over: u32,
    /// Only meaningful while chasing
    pub target_score: Option<u32>,
    pub is_second_innings: bool,
}

/// Result of one live estimator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePrediction {
    /// Rounded batting-side probability (0–100)
    pub batting_team_win_probability: u32,
    /// Always `100 - batting_team_win_probability`
    pub bowling_team_win_probability: u32,
    /// Two-decimal runs per over; absent in the first innings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_run_rate: Option<f64>,
    /// Two-decimal runs per over
    pub current_run_rate: f64,
    /// Negative only when the over data exceeds the format
    pub balls_remaining: i32,
}

/// The team/team/venue triple a pre-match estimate is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub team1: String,
    pub team2: String,
    pub venue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
        }
    }
}

/// Result of one pre-match estimator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreMatchPrediction {
    /// One of the two fixture teams
    pub winner: String,
    /// Winner's probability (0.0–1.0)
    pub probability: f64,
    pub confidence: Confidence,
}
