use thiserror::Error;

/// Everything that can stop a selection update or a prediction trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("Please select both batting and bowling teams.")]
    MissingTeams,

    #[error("Please enter the target score for second innings.")]
    MissingTarget,

    #[error("select two different teams and a venue first")]
    IncompleteFixture,

    #[error("{0} cannot bat and bowl in the same match")]
    SameTeam(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("unknown venue: {0}")]
    UnknownVenue(String),

    #[error("{field} must be at most {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("target score must be positive")]
    InvalidTarget,

    #[error("a prediction is already being calculated")]
    AlreadyCalculating,

    #[error("session not found: {0}")]
    SessionNotFound(u64),

    #[error("too many open sessions (limit {0})")]
    TooManySessions(usize),

    #[error("estimator failed: {0}")]
    Estimator(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl PredictionError {
    /// Short heading shown above the message in the page notification.
    pub fn title(&self) -> &'static str {
        match self {
            PredictionError::MissingTeams => "Missing Information",
            PredictionError::MissingTarget => "Missing Target",
            PredictionError::IncompleteFixture => "Incomplete Selection",
            PredictionError::SameTeam(_)
            | PredictionError::UnknownTeam(_)
            | PredictionError::UnknownVenue(_)
            | PredictionError::OutOfRange { .. }
            | PredictionError::InvalidTarget
            | PredictionError::MalformedRequest(_) => "Invalid Input",
            PredictionError::AlreadyCalculating => "Please Wait",
            PredictionError::SessionNotFound(_) | PredictionError::TooManySessions(_) => {
                "Session Error"
            }
            PredictionError::Estimator(_) => "Prediction Failed",
        }
    }

    /// Whether the page should surface this error to the user. An incomplete
    /// pre-match selection only keeps the trigger disabled.
    pub fn notify_user(&self) -> bool {
        !matches!(self, PredictionError::IncompleteFixture)
    }
}

pub type Result<T> = std::result::Result<T, PredictionError>;
