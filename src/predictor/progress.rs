//! Match-progress arithmetic shared by the live estimator and the presenter.
//!
//! A T20 innings is 20 overs of 6 legal deliveries. Rates are expressed per
//! over (runs per six balls).

/// Overs per innings in the T20 format.
pub const OVERS_PER_INNINGS: u32 = 20;
/// Legal deliveries per over.
pub const BALLS_PER_OVER: u32 = 6;
/// Balls per innings (120).
pub const BALLS_PER_INNINGS: u32 = OVERS_PER_INNINGS * BALLS_PER_OVER;

/// Derived progress figures for one innings snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchProgress {
    /// Signed: over data beyond the format limit yields a negative value,
    /// which is reported rather than corrected.
    pub balls_remaining: i32,
    pub current_run_rate: f64,
}

impl MatchProgress {
    pub fn new(current_runs: u32, overs_completed: u32, balls_in_current_over: u32) -> Self {
        let total_balls_bowled = overs_completed * BALLS_PER_OVER + balls_in_current_over;
        let balls_remaining = BALLS_PER_INNINGS as i32 - total_balls_bowled as i32;
        MatchProgress {
            balls_remaining,
            current_run_rate: run_rate(current_runs as f64, total_balls_bowled as i32),
        }
    }

    /// Rate the chasing side must sustain to reach `target`.
    /// Zero when no balls remain.
    pub fn required_run_rate(&self, current_runs: u32, target: u32) -> f64 {
        let runs_needed = target as f64 - current_runs as f64;
        run_rate(runs_needed, self.balls_remaining)
    }
}

/// Runs per over over `balls` deliveries; zero for a non-positive ball count.
fn run_rate(runs: f64, balls: i32) -> f64 {
    if balls > 0 {
        runs / balls as f64 * BALLS_PER_OVER as f64
    } else {
        0.0
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
