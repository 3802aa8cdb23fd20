use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PredictionError, Result};
use crate::predictor::Fixture;

/// Pre-match Selection State: two teams and a venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreMatchSelection {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PreMatchUpdate {
    Team1(Option<String>),
    Team2(Option<String>),
    Venue(Option<String>),
}

impl PreMatchSelection {
    /// Validate and apply one edit. Picking the same team twice is allowed
    /// here; it only keeps the trigger disabled.
    pub fn apply(&mut self, update: PreMatchUpdate, catalog: &Catalog) -> Result<()> {
        match update {
            PreMatchUpdate::Team1(team) => self.team1 = resolve_team(team, catalog)?,
            PreMatchUpdate::Team2(team) => self.team2 = resolve_team(team, catalog)?,
            PreMatchUpdate::Venue(None) => self.venue = None,
            PreMatchUpdate::Venue(Some(name)) => {
                let venue = catalog
                    .find_venue(&name)
                    .ok_or(PredictionError::UnknownVenue(name))?;
                self.venue = Some(venue.name.clone());
            }
        }
        Ok(())
    }

    pub fn can_predict(&self) -> bool {
        self.fixture().is_ok()
    }

    pub fn fixture(&self) -> Result<Fixture> {
        match (&self.team1, &self.team2, &self.venue) {
            (Some(team1), Some(team2), Some(venue)) if team1 != team2 => Ok(Fixture {
                team1: team1.clone(),
                team2: team2.clone(),
                venue: venue.clone(),
            }),
            _ => Err(PredictionError::IncompleteFixture),
        }
    }

    /// Run an externally supplied fixture through the page checks.
    pub fn validate_fixture(raw: &Fixture, catalog: &Catalog) -> Result<Fixture> {
        let mut selection = PreMatchSelection::default();
        selection.apply(PreMatchUpdate::Team1(Some(raw.team1.clone())), catalog)?;
        selection.apply(PreMatchUpdate::Team2(Some(raw.team2.clone())), catalog)?;
        selection.apply(PreMatchUpdate::Venue(Some(raw.venue.clone())), catalog)?;
        selection.fixture()
    }
}

fn resolve_team(team: Option<String>, catalog: &Catalog) -> Result<Option<String>> {
    match team {
        None => Ok(None),
        Some(key) => catalog
            .find_team(&key)
            .map(|t| Some(t.name.clone()))
            .ok_or(PredictionError::UnknownTeam(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(team1: &str, team2: &str, venue: &str) -> PreMatchSelection {
        let catalog = Catalog::default();
        let mut s = PreMatchSelection::default();
        s.apply(PreMatchUpdate::Team1(Some(team1.into())), &catalog).unwrap();
        s.apply(PreMatchUpdate::Team2(Some(team2.into())), &catalog).unwrap();
        s.apply(PreMatchUpdate::Venue(Some(venue.into())), &catalog).unwrap();
        s
    }

    #[test]
    fn complete_selection_can_predict() {
        let s = filled("SRH", "GT", "Narendra Modi Stadium");
        assert!(s.can_predict());
        let f = s.fixture().unwrap();
        assert_eq!(f.team1, "Sunrisers Hyderabad");
        assert_eq!(f.team2, "Gujarat Titans");
        assert_eq!(f.venue, "Narendra Modi Stadium");
    }

    #[test]
    fn identical_teams_disable_trigger_silently() {
        let s = filled("SRH", "Sunrisers Hyderabad", "Eden Gardens");
        assert!(!s.can_predict());
        let err = s.fixture().unwrap_err();
        assert_eq!(err, PredictionError::IncompleteFixture);
        assert!(!err.notify_user());
    }

    #[test]
    fn missing_venue_disables_trigger() {
        let catalog = Catalog::default();
        let mut s = filled("MI", "DC", "Wankhede Stadium");
        s.apply(PreMatchUpdate::Venue(None), &catalog).unwrap();
        assert!(!s.can_predict());
        assert!(!PreMatchSelection::default().can_predict());
    }

    #[test]
    fn unknown_names_rejected() {
        let catalog = Catalog::default();
        let mut s = PreMatchSelection::default();
        assert_eq!(
            s.apply(PreMatchUpdate::Venue(Some("Lord's".into())), &catalog)
                .unwrap_err(),
            PredictionError::UnknownVenue("Lord's".into())
        );
        assert_eq!(
            s.apply(PreMatchUpdate::Team2(Some("XI".into())), &catalog)
                .unwrap_err(),
            PredictionError::UnknownTeam("XI".into())
        );
        assert_eq!(s, PreMatchSelection::default());
    }

    #[test]
    fn validate_fixture_checks_names() {
        let catalog = Catalog::default();
        let ok = Fixture {
            team1: "pbks".into(),
            team2: "LSG".into(),
            venue: "Eden Gardens".into(),
        };
        let f = PreMatchSelection::validate_fixture(&ok, &catalog).unwrap();
        assert_eq!(f.team1, "Punjab Kings");

        let same = Fixture { team2: "PBKS".into(), ..ok };
        assert_eq!(
            PreMatchSelection::validate_fixture(&same, &catalog).unwrap_err(),
            PredictionError::IncompleteFixture
        );
    }
}
