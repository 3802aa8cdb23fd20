//! Per-page Selection State and the trigger → delay → estimate → store cycle.
//!
//! Every page owns one session. Edits go through [`SessionManager`]; each
//! accepted edit clears the stored outcome and bumps the session generation.
//! A trigger validates a snapshot, then a background task waits out the
//! simulated latency, runs the estimator and hands the result back tagged
//! with the generation it was computed from.

pub mod live;
pub mod prematch;
pub mod store;

pub use live::{LiveSelection, LiveUpdate};
pub use prematch::{PreMatchSelection, PreMatchUpdate};
pub use store::{Session, SessionMap, StaleResultPolicy, Ticket};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{PredictionError, Result};
use crate::predictor::{
    Fixture, LiveEstimator, LivePrediction, MatchSituation, PreMatchEstimator, PreMatchPrediction,
};

pub type LiveSession = Session<LiveSelection, LivePrediction>;
pub type PreMatchSession = Session<PreMatchSelection, PreMatchPrediction>;

/// Timing and lifecycle knobs, usually taken from the command line.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub live_delay: Duration,
    pub prematch_delay: Duration,
    pub stale_results: StaleResultPolicy,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

pub struct SessionManager {
    live: SessionMap<LiveSelection, LivePrediction>,
    prematch: SessionMap<PreMatchSelection, PreMatchPrediction>,
    catalog: Arc<Catalog>,
    live_estimator: Arc<dyn LiveEstimator>,
    prematch_estimator: Arc<dyn PreMatchEstimator>,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(
        catalog: Arc<Catalog>,
        live_estimator: Arc<dyn LiveEstimator>,
        prematch_estimator: Arc<dyn PreMatchEstimator>,
        settings: SessionSettings,
    ) -> Self {
        SessionManager {
            live: SessionMap::new(settings.max_sessions),
            prematch: SessionMap::new(settings.max_sessions),
            catalog,
            live_estimator,
            prematch_estimator,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ── Live flow ────────────────────────────────────────────────────────────

    pub async fn create_live(&self) -> Result<(u64, LiveSession)> {
        self.live.create().await
    }

    pub async fn live_session(&self, id: u64) -> Result<LiveSession> {
        self.live.get(id).await
    }

    pub async fn update_live(&self, id: u64, update: LiveUpdate) -> Result<LiveSession> {
        self.live
            .update(id, |s| s.apply(update, &self.catalog))
            .await
    }

    /// Start a live prediction. Returns the session as it stands (loading)
    /// and the handle of the task that will deliver the result.
    pub async fn trigger_live(self: &Arc<Self>, id: u64) -> Result<(LiveSession, JoinHandle<()>)> {
        let (ticket, situation, session) = self.live.begin(id, LiveSelection::situation).await?;
        info!(
            session = id,
            "Live prediction requested: {} {}/{} after {}.{} overs",
            situation.batting_team,
            situation.current_runs,
            situation.current_wickets,
            situation.overs_completed,
            situation.balls_in_current_over
        );

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(manager.settings.live_delay).await;
            let outcome = match manager.live_estimator.estimate(&situation).await {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(
                        session = id,
                        "Live estimator {} failed: {}",
                        manager.live_estimator.name(),
                        e
                    );
                    None
                }
            };
            manager.finish("live", id, ticket, outcome, &manager.live).await;
        });
        Ok((session, handle))
    }

    /// Estimate an externally supplied situation right away, without a
    /// session or the simulated delay.
    pub async fn estimate_live_now(&self, raw: &MatchSituation) -> Result<LivePrediction> {
        let situation = LiveSelection::validate_situation(raw, &self.catalog)?;
        self.live_estimator
            .estimate(&situation)
            .await
            .map_err(|e| PredictionError::Estimator(e.to_string()))
    }

    // ── Pre-match flow ───────────────────────────────────────────────────────

    pub async fn create_prematch(&self) -> Result<(u64, PreMatchSession)> {
        self.prematch.create().await
    }

    pub async fn prematch_session(&self, id: u64) -> Result<PreMatchSession> {
        self.prematch.get(id).await
    }

    pub async fn update_prematch(&self, id: u64, update: PreMatchUpdate) -> Result<PreMatchSession> {
        self.prematch
            .update(id, |s| s.apply(update, &self.catalog))
            .await
    }

    pub async fn trigger_prematch(
        self: &Arc<Self>,
        id: u64,
    ) -> Result<(PreMatchSession, JoinHandle<()>)> {
        let (ticket, fixture, session) =
            self.prematch.begin(id, PreMatchSelection::fixture).await?;
        info!(
            session = id,
            "Pre-match prediction requested: {} vs {} at {}",
            fixture.team1,
            fixture.team2,
            fixture.venue
        );

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(manager.settings.prematch_delay).await;
            let outcome = match manager.prematch_estimator.predict(&fixture).await {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(
                        session = id,
                        "Pre-match estimator {} failed: {}",
                        manager.prematch_estimator.name(),
                        e
                    );
                    None
                }
            };
            manager
                .finish("pre-match", id, ticket, outcome, &manager.prematch)
                .await;
        });
        Ok((session, handle))
    }

    pub async fn estimate_prematch_now(&self, raw: &Fixture) -> Result<PreMatchPrediction> {
        let fixture = PreMatchSelection::validate_fixture(raw, &self.catalog)?;
        self.prematch_estimator
            .predict(&fixture)
            .await
            .map_err(|e| PredictionError::Estimator(e.to_string()))
    }

    // ── Shared ───────────────────────────────────────────────────────────────

    async fn finish<S, P>(
        &self,
        flow: &str,
        id: u64,
        ticket: Ticket,
        outcome: Option<P>,
        map: &SessionMap<S, P>,
    ) where
        S: Default + Clone,
        P: Clone,
    {
        let had_outcome = outcome.is_some();
        match map
            .complete(id, ticket, outcome, self.settings.stale_results)
            .await
        {
            Ok(true) => info!(session = id, "{} prediction stored", flow),
            Ok(false) if had_outcome => {
                info!(session = id, "{} prediction discarded: inputs changed", flow)
            }
            Ok(false) => {}
            // Swept or never existed; nothing to write to
            Err(e) => debug!(session = id, "{} prediction dropped: {}", flow, e),
        }
    }

    /// Spawn the background task that evicts idle sessions.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let ttl = match chrono::Duration::from_std(manager.settings.session_ttl) {
                Ok(ttl) => ttl,
                Err(e) => {
                    warn!("Session sweeper disabled, bad TTL: {}", e);
                    return;
                }
            };
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let live = manager.live.sweep(ttl).await;
                let prematch = manager.prematch.sweep(ttl).await;
                if live + prematch > 0 {
                    info!(
                        "Evicted {} live and {} pre-match idle session(s); {} + {} remain",
                        live,
                        prematch,
                        manager.live.len().await,
                        manager.prematch.len().await
                    );
                }
            }
        })
    }
}
