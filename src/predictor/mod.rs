pub mod live;
pub mod models;
pub mod prematch;
pub mod progress;

pub use live::{FormulaEstimator, LiveEstimator};
pub use models::{Confidence, Fixture, LivePrediction, MatchSituation, PreMatchPrediction};
pub use prematch::{PreMatchEstimator, RandomEstimator};
