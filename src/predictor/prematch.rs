//! Pre-match estimation.
//!
//! There is no real model behind the pre-match page yet. [`RandomEstimator`]
//! is a placeholder that favours the first-listed team with a uniformly drawn
//! probability; anything implementing [`PreMatchEstimator`] can replace it.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use super::models::{Confidence, Fixture, PreMatchPrediction};

/// Lower bound of the placeholder win probability.
pub const MIN_PLACEHOLDER_PROB: f64 = 0.60;
/// Upper bound of the placeholder win probability.
pub const MAX_PLACEHOLDER_PROB: f64 = 0.90;

/// Trait that every pre-match estimator must implement.
#[async_trait]
pub trait PreMatchEstimator: Send + Sync {
    async fn predict(&self, fixture: &Fixture) -> Result<PreMatchPrediction>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Placeholder estimator: uniform probability in [0.60, 0.90] for `team1`
/// and a coin-flip confidence label.
pub struct RandomEstimator {
    rng: Mutex<StdRng>,
}

impl RandomEstimator {
    /// Seeded for reproducible output, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomEstimator {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl PreMatchEstimator for RandomEstimator {
    async fn predict(&self, fixture: &Fixture) -> Result<PreMatchPrediction> {
        let mut rng = self.rng.lock().await;
        let probability = rng.gen_range(MIN_PLACEHOLDER_PROB..=MAX_PLACEHOLDER_PROB);
        let confidence = if rng.gen_bool(0.5) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        Ok(PreMatchPrediction {
            winner: fixture.team1.clone(),
            probability,
            confidence,
        })
    }

    fn name(&self) -> &str {
        "random-placeholder"
    }
}
