//! In-play win probability for a T20 innings.
//!
//! This is a hand-tuned heuristic, not a fitted model. The batting side's
//! chances are driven by how its run rate compares with a reference (first
//! innings) or with the rate it still needs (the chase), with wickets lost
//! as a penalty.
//!
//! - **First innings**: baseline 50, +3 per run/over above 8, −4 per wicket,
//!   clamped to [20, 80].
//! - **Chase, target reached**: 95.
//! - **Chase, 8+ wickets down**: 60 − 5 × required rate, floored at 10.
//! - **Chase otherwise**: 65 − 8 × (required − current rate), clamped to
//!   [15, 85].

use anyhow::Result;
use async_trait::async_trait;

use super::models::{LivePrediction, MatchSituation};
use super::progress::{round2, MatchProgress};

/// Reference run rate for a par first-innings score.
const PAR_RUN_RATE: f64 = 8.0;
/// Probability given to a chase that has already reached its target.
const CHASE_COMPLETE_PROB: f64 = 95.0;
/// Wickets down from which the tail-end penalty dominates a chase.
const TAIL_WICKETS: u32 = 8;

/// Estimator for the live flow. Implemented by the in-process formula; a
/// remote scoring service can stand in without touching the sessions or the
/// presenter.
#[async_trait]
pub trait LiveEstimator: Send + Sync {
    async fn estimate(&self, situation: &MatchSituation) -> Result<LivePrediction>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// The built-in heuristic estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaEstimator;

#[async_trait]
impl LiveEstimator for FormulaEstimator {
    async fn estimate(&self, situation: &MatchSituation) -> Result<LivePrediction> {
        Ok(estimate_live(situation))
    }

    fn name(&self) -> &str {
        "formula"
    }
}

/// Compute the live outcome for a validated situation. Pure: the same input
/// always yields the same prediction.
pub fn estimate_live(situation: &MatchSituation) -> LivePrediction {
    let progress = MatchProgress::new(
        situation.current_runs,
        situation.overs_completed,
        situation.balls_in_current_over,
    );

    let (batting_prob, required_run_rate) = match chase_target(situation) {
        Some(target) => {
            let rrr = progress.required_run_rate(situation.current_runs, target);
            (chase_win_prob(situation, &progress, target, rrr), Some(rrr))
        }
        None => (first_innings_win_prob(situation, &progress), None),
    };

    let batting = batting_prob.round().clamp(0.0, 100.0) as u32;
    LivePrediction {
        batting_team_win_probability: batting,
        bowling_team_win_probability: 100 - batting,
        required_run_rate: required_run_rate.map(round2),
        current_run_rate: round2(progress.current_run_rate),
        balls_remaining: progress.balls_remaining,
    }
}

fn chase_target(situation: &MatchSituation) -> Option<u32> {
    if situation.is_second_innings {
        situation.target_score
    } else {
        None
    }
}

fn first_innings_win_prob(situation: &MatchSituation, progress: &MatchProgress) -> f64 {
    let p = 50.0 + (progress.current_run_rate - PAR_RUN_RATE) * 3.0
        - situation.current_wickets as f64 * 4.0;
    p.clamp(20.0, 80.0)
}

fn chase_win_prob(
    situation: &MatchSituation,
    progress: &MatchProgress,
    target: u32,
    required_run_rate: f64,
) -> f64 {
    let runs_needed = target as i64 - situation.current_runs as i64;
    if runs_needed <= 0 {
        CHASE_COMPLETE_PROB
    } else if situation.current_wickets >= TAIL_WICKETS {
        (60.0 - required_run_rate * 5.0).max(10.0)
    } else {
        (65.0 - (required_run_rate - progress.current_run_rate) * 8.0).clamp(15.0, 85.0)
    }
}
