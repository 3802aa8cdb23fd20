//! Static team and venue catalogs backing the selection pickers.
//!
//! The built-in catalog covers the ten league franchises and twelve grounds.
//! A JSON file with the same shape can replace it at startup.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Short code, e.g. "CSK"
    pub code: String,
    /// CSS colour used for the picker swatch
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub city: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    teams: Vec<Team>,
    venues: Vec<Venue>,
}

const DEFAULT_TEAMS: &[(&str, &str, &str)] = &[
    ("Chennai Super Kings", "CSK", "#eab308"),
    ("Mumbai Indians", "MI", "#2563eb"),
    ("Royal Challengers Bangalore", "RCB", "#dc2626"),
    ("Kolkata Knight Riders", "KKR", "#9333ea"),
    ("Delhi Capitals", "DC", "#3b82f6"),
    ("Punjab Kings", "PBKS", "#ef4444"),
    ("Rajasthan Royals", "RR", "#ec4899"),
    ("Sunrisers Hyderabad", "SRH", "#f97316"),
    ("Gujarat Titans", "GT", "#0d9488"),
    ("Lucknow Super Giants", "LSG", "#06b6d4"),
];

const DEFAULT_VENUES: &[(&str, &str, u32)] = &[
    ("Wankhede Stadium", "Mumbai", 33_108),
    ("M. Chinnaswamy Stadium", "Bangalore", 40_000),
    ("Eden Gardens", "Kolkata", 66_349),
    ("Feroz Shah Kotla", "Delhi", 41_820),
    ("M.A. Chidambaram Stadium", "Chennai", 50_000),
    ("Sawai Mansingh Stadium", "Jaipur", 30_000),
    ("Punjab Cricket Association IS Bindra Stadium", "Mohali", 26_950),
    ("Rajiv Gandhi International Stadium", "Hyderabad", 55_000),
    ("Narendra Modi Stadium", "Ahmedabad", 132_000),
    (
        "Bharat Ratna Shri Atal Bihari Vajpayee Ekana Cricket Stadium",
        "Lucknow",
        50_000,
    ),
    (
        "Dr. Y.S. Rajasekhara Reddy ACA-VDCA Cricket Stadium",
        "Visakhapatnam",
        27_000,
    ),
    ("Maharashtra Cricket Association Stadium", "Pune", 37_406),
];

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            teams: DEFAULT_TEAMS
                .iter()
                .map(|&(name, code, color)| Team {
                    name: name.into(),
                    code: code.into(),
                    color: color.into(),
                })
                .collect(),
            venues: DEFAULT_VENUES
                .iter()
                .map(|&(name, city, capacity)| Venue {
                    name: name.into(),
                    city: city.into(),
                    capacity,
                })
                .collect(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a JSON file of the form
    /// `{"teams": [{name, code, color}], "venues": [{name, city, capacity}]}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.teams.len() < 2 {
            bail!("catalog needs at least two teams, found {}", self.teams.len());
        }
        if self.venues.is_empty() {
            bail!("catalog needs at least one venue");
        }
        let mut names = HashSet::new();
        let mut codes = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() || team.code.trim().is_empty() {
                bail!("team name and code must not be empty");
            }
            if !names.insert(team.name.as_str()) {
                bail!("duplicate team name: {}", team.name);
            }
            if !codes.insert(team.code.to_ascii_uppercase()) {
                bail!("duplicate team code: {}", team.code);
            }
        }
        let mut venue_names = HashSet::new();
        for venue in &self.venues {
            if !venue_names.insert(venue.name.as_str()) {
                bail!("duplicate venue name: {}", venue.name);
            }
        }
        Ok(())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// All teams except `exclude` (matched by name). Used to keep a picker
    /// from offering the team already chosen on the other side.
    pub fn teams_excluding<'a>(&'a self, exclude: Option<&str>) -> Vec<&'a Team> {
        self.teams
            .iter()
            .filter(|t| Some(t.name.as_str()) != exclude)
            .collect()
    }

    /// Look a team up by exact name or case-insensitive code.
    pub fn find_team(&self, key: &str) -> Option<&Team> {
        let key = key.trim();
        self.teams
            .iter()
            .find(|t| t.name == key || t.code.eq_ignore_ascii_case(key))
    }

    pub fn find_venue(&self, name: &str) -> Option<&Venue> {
        let name = name.trim();
        self.venues.iter().find(|v| v.name == name)
    }
}
