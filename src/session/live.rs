use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PredictionError, Result};
use crate::predictor::progress::{BALLS_PER_OVER, OVERS_PER_INNINGS};
use crate::predictor::MatchSituation;

/// Most wickets an innings can lose.
const MAX_WICKETS: u32 = 10;

/// Live-page Selection State. Fields mirror the score inputs; teams stay
/// unset until picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveSelection {
    pub batting_team: Option<String>,
    pub bowling_team: Option<String>,
    pub current_runs: u32,
    pub current_wickets: u32,
    pub overs_completed: u32,
    pub balls_in_current_over: u32,
    pub target_score: Option<u32>,
    pub is_second_innings: bool,
}

/// A single-field edit, e.g. `{"field": "current_runs", "value": 80}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LiveUpdate {
    BattingTeam(Option<String>),
    BowlingTeam(Option<String>),
    CurrentRuns(u32),
    CurrentWickets(u32),
    OversCompleted(u32),
    BallsInCurrentOver(u32),
    TargetScore(Option<u32>),
    IsSecondInnings(bool),
}

impl LiveSelection {
    /// Validate and apply one edit. Nothing changes when it is rejected.
    pub fn apply(&mut self, update: LiveUpdate, catalog: &Catalog) -> Result<()> {
        match update {
            LiveUpdate::BattingTeam(team) => {
                self.batting_team = resolve_side(team, self.bowling_team.as_deref(), catalog)?;
            }
            LiveUpdate::BowlingTeam(team) => {
                self.bowling_team = resolve_side(team, self.batting_team.as_deref(), catalog)?;
            }
            LiveUpdate::CurrentRuns(runs) => self.current_runs = runs,
            LiveUpdate::CurrentWickets(w) => {
                self.current_wickets = bounded("current_wickets", w, MAX_WICKETS)?;
            }
            LiveUpdate::OversCompleted(o) => {
                self.overs_completed = bounded("overs_completed", o, OVERS_PER_INNINGS)?;
            }
            LiveUpdate::BallsInCurrentOver(b) => {
                self.balls_in_current_over =
                    bounded("balls_in_current_over", b, BALLS_PER_OVER - 1)?;
            }
            LiveUpdate::TargetScore(Some(0)) => return Err(PredictionError::InvalidTarget),
            LiveUpdate::TargetScore(target) => self.target_score = target,
            LiveUpdate::IsSecondInnings(chasing) => {
                self.is_second_innings = chasing;
                if !chasing {
                    self.target_score = None;
                }
            }
        }
        Ok(())
    }

    /// Whether the trigger should be enabled.
    pub fn can_predict(&self) -> bool {
        self.batting_team.is_some() && self.bowling_team.is_some()
    }

    /// Snapshot for the estimator, or the reason the trigger is refused.
    pub fn situation(&self) -> Result<MatchSituation> {
        let (Some(batting), Some(bowling)) = (&self.batting_team, &self.bowling_team) else {
            return Err(PredictionError::MissingTeams);
        };
        if self.is_second_innings && self.target_score.is_none() {
            return Err(PredictionError::MissingTarget);
        }
        Ok(MatchSituation {
            batting_team: batting.clone(),
            bowling_team: bowling.clone(),
            current_runs: self.current_runs,
            current_wickets: self.current_wickets,
            overs_completed: self.overs_completed,
            balls_in_current_over: self.balls_in_current_over,
            target_score: if self.is_second_innings {
                self.target_score
            } else {
                None
            },
            is_second_innings: self.is_second_innings,
        })
    }

    /// Run an externally supplied situation through the same checks as the
    /// page edits, returning it with catalog-canonical team names.
    pub fn validate_situation(raw: &MatchSituation, catalog: &Catalog) -> Result<MatchSituation> {
        let mut selection = LiveSelection::default();
        let updates = [
            LiveUpdate::BattingTeam(Some(raw.batting_team.clone())),
            LiveUpdate::BowlingTeam(Some(raw.bowling_team.clone())),
            LiveUpdate::CurrentRuns(raw.current_runs),
            LiveUpdate::CurrentWickets(raw.current_wickets),
            LiveUpdate::OversCompleted(raw.overs_completed),
            LiveUpdate::BallsInCurrentOver(raw.balls_in_current_over),
            LiveUpdate::IsSecondInnings(raw.is_second_innings),
            LiveUpdate::TargetScore(raw.target_score),
        ];
        for update in updates {
            selection.apply(update, catalog)?;
        }
        selection.situation()
    }
}

fn resolve_side(team: Option<String>, other: Option<&str>, catalog: &Catalog) -> Result<Option<String>> {
    let Some(key) = team else {
        return Ok(None);
    };
    let name = catalog
        .find_team(&key)
        .ok_or(PredictionError::UnknownTeam(key))?
        .name
        .clone();
    if other == Some(name.as_str()) {
        return Err(PredictionError::SameTeam(name));
    }
    Ok(Some(name))
}

fn bounded(field: &'static str, value: u32, max: u32) -> Result<u32> {
    if value > max {
        return Err(PredictionError::OutOfRange { field, value, max });
    }
    Ok(value)
}
