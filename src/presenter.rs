//! Turns outcomes into what the pages display: rounded percentages, the
//! favourite, and two-decimal rate strings. No logic beyond formatting.

use serde::Serialize;

use crate::catalog::Venue;
use crate::predictor::{LivePrediction, PreMatchPrediction};
use crate::session::{LiveSelection, PreMatchSelection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamShare {
    pub team: String,
    /// Whole-number percentage
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveBreakdown {
    pub batting: TeamShare,
    pub bowling: TeamShare,
    pub favorite: TeamShare,
    /// e.g. "80/2"
    pub scoreline: String,
    /// e.g. "10.3"
    pub overs: String,
    pub current_run_rate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_run_rate: Option<String>,
    pub balls_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreMatchBreakdown {
    pub winner: String,
    pub win_percent: u32,
    pub team1: TeamShare,
    pub team2: TeamShare,
    pub confidence: &'static str,
    /// "Ground, City"
    pub venue: String,
}

/// Live breakdown for a stored prediction. Team labels fall back to the
/// side name when a team was cleared after the prediction was made.
pub fn live_breakdown(selection: &LiveSelection, prediction: &LivePrediction) -> LiveBreakdown {
    let batting = TeamShare {
        team: label(selection.batting_team.as_deref(), "Batting Team"),
        percent: prediction.batting_team_win_probability,
    };
    let bowling = TeamShare {
        team: label(selection.bowling_team.as_deref(), "Bowling Team"),
        percent: prediction.bowling_team_win_probability,
    };
    // Ties go to the bowling side
    let favorite = if batting.percent > bowling.percent {
        batting.clone()
    } else {
        bowling.clone()
    };

    LiveBreakdown {
        batting,
        bowling,
        favorite,
        scoreline: format!("{}/{}", selection.current_runs, selection.current_wickets),
        overs: format!(
            "{}.{}",
            selection.overs_completed, selection.balls_in_current_over
        ),
        current_run_rate: format!("{:.2}", prediction.current_run_rate),
        required_run_rate: prediction.required_run_rate.map(|r| format!("{:.2}", r)),
        balls_remaining: prediction.balls_remaining,
    }
}

/// Pre-match breakdown. `None` when the selection no longer names the
/// predicted winner (it cannot be placed against either side).
pub fn prematch_breakdown(
    selection: &PreMatchSelection,
    prediction: &PreMatchPrediction,
    venue: Option<&Venue>,
) -> Option<PreMatchBreakdown> {
    let team1 = selection.team1.clone()?;
    let team2 = selection.team2.clone()?;
    let win_percent = (prediction.probability * 100.0).round().clamp(0.0, 100.0) as u32;
    let lose_percent = 100 - win_percent;
    let share = |team: String| {
        let percent = if team == prediction.winner {
            win_percent
        } else {
            lose_percent
        };
        TeamShare { team, percent }
    };
    if prediction.winner != team1 && prediction.winner != team2 {
        return None;
    }

    Some(PreMatchBreakdown {
        winner: prediction.winner.clone(),
        win_percent,
        team1: share(team1),
        team2: share(team2),
        confidence: prediction.confidence.label(),
        venue: match venue {
            Some(v) => format!("{}, {}", v.name, v.city),
            None => selection.venue.clone().unwrap_or_default(),
        },
    })
}

/// "66,349"-style thousands grouping for venue capacities.
pub fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn label(team: Option<&str>, fallback: &str) -> String {
    team.unwrap_or(fallback).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Confidence;

    fn live_selection() -> LiveSelection {
        LiveSelection {
            batting_team: Some("Mumbai Indians".into()),
            bowling_team: Some("Chennai Super Kings".into()),
            current_runs: 80,
            current_wickets: 2,
            overs_completed: 10,
            balls_in_current_over: 0,
            target_score: None,
            is_second_innings: false,
        }
    }

    fn live_prediction(batting: u32, rrr: Option<f64>) -> LivePrediction {
        LivePrediction {
            batting_team_win_probability: batting,
            bowling_team_win_probability: 100 - batting,
            required_run_rate: rrr,
            current_run_rate: 8.0,
            balls_remaining: 60,
        }
    }

    #[test]
    fn live_breakdown_formats_rates() {
        let b = live_breakdown(&live_selection(), &live_prediction(42, None));
        assert_eq!(b.batting.percent, 42);
        assert_eq!(b.bowling.percent, 58);
        assert_eq!(b.favorite.team, "Chennai Super Kings");
        assert_eq!(b.favorite.percent, 58);
        assert_eq!(b.scoreline, "80/2");
        assert_eq!(b.overs, "10.0");
        assert_eq!(b.current_run_rate, "8.00");
        assert_eq!(b.required_run_rate, None);
        assert_eq!(b.balls_remaining, 60);
    }

    #[test]
    fn live_breakdown_shows_required_rate_in_chase() {
        let b = live_breakdown(&live_selection(), &live_prediction(65, Some(9.5)));
        assert_eq!(b.required_run_rate.as_deref(), Some("9.50"));
        assert_eq!(b.favorite.team, "Mumbai Indians");
    }

    #[test]
    fn live_tie_goes_to_bowling_side() {
        let b = live_breakdown(&live_selection(), &live_prediction(50, None));
        assert_eq!(b.favorite.team, "Chennai Super Kings");
    }

    #[test]
    fn live_labels_fall_back() {
        let mut s = live_selection();
        s.batting_team = None;
        let b = live_breakdown(&s, &live_prediction(42, None));
        assert_eq!(b.batting.team, "Batting Team");
    }

    fn prematch_selection() -> PreMatchSelection {
        PreMatchSelection {
            team1: Some("Kolkata Knight Riders".into()),
            team2: Some("Rajasthan Royals".into()),
            venue: Some("Eden Gardens".into()),
        }
    }

    #[test]
    fn prematch_splits_percentages() {
        let p = PreMatchPrediction {
            winner: "Kolkata Knight Riders".into(),
            probability: 0.734,
            confidence: Confidence::High,
        };
        let venue = Venue {
            name: "Eden Gardens".into(),
            city: "Kolkata".into(),
            capacity: 66_349,
        };
        let b = prematch_breakdown(&prematch_selection(), &p, Some(&venue)).unwrap();
        assert_eq!(b.win_percent, 73);
        assert_eq!(b.team1.percent, 73);
        assert_eq!(b.team2.percent, 27);
        assert_eq!(b.confidence, "High");
        assert_eq!(b.venue, "Eden Gardens, Kolkata");
    }

    #[test]
    fn prematch_winner_may_be_team2() {
        let p = PreMatchPrediction {
            winner: "Rajasthan Royals".into(),
            probability: 0.6,
            confidence: Confidence::Medium,
        };
        let b = prematch_breakdown(&prematch_selection(), &p, None).unwrap();
        assert_eq!(b.team1.percent, 40);
        assert_eq!(b.team2.percent, 60);
        assert_eq!(b.venue, "Eden Gardens");
    }

    #[test]
    fn prematch_foreign_winner_not_rendered() {
        let p = PreMatchPrediction {
            winner: "Delhi Capitals".into(),
            probability: 0.6,
            confidence: Confidence::Medium,
        };
        assert!(prematch_breakdown(&prematch_selection(), &p, None).is_none());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(26_950), "26,950");
        assert_eq!(group_thousands(132_000), "132,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
