use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod catalog;
mod config;
mod dashboard;
mod error;
mod predictor;
mod presenter;
mod session;

use catalog::Catalog;
use config::Config;
use dashboard::AppState;
use predictor::{FormulaEstimator, LiveEstimator, PreMatchEstimator, RandomEstimator};
use session::SessionManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => {
            let catalog = Catalog::from_json_file(path)?;
            info!("Catalog loaded from {}", path);
            catalog
        }
        None => Catalog::default(),
    };
    info!(
        "{} teams, {} venues available",
        catalog.teams().len(),
        catalog.venues().len()
    );

    // Both estimators are placeholders until a real scoring backend exists
    let live_estimator: Arc<dyn LiveEstimator> = Arc::new(FormulaEstimator);
    let prematch_estimator: Arc<dyn PreMatchEstimator> =
        Arc::new(RandomEstimator::new(config.rng_seed));
    info!(
        "Estimators: live={}, pre-match={} (stale results: {:?})",
        live_estimator.name(),
        prematch_estimator.name(),
        config.stale_results
    );

    let sessions = Arc::new(SessionManager::new(
        Arc::new(catalog),
        live_estimator,
        prematch_estimator,
        config.session_settings(),
    ));
    sessions.start_sweeper(Duration::from_secs(60));

    let app = dashboard::router(AppState { sessions });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run the HTTP server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
