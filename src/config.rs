use clap::Parser;
use std::time::Duration;

use crate::session::{SessionSettings, StaleResultPolicy};

/// T20 league match predictor (pre-match and live win probability pages)
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-predictor", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Simulated latency before a pre-match prediction is stored (ms)
    #[arg(long, env = "PREMATCH_DELAY_MS", default_value = "2000")]
    pub prematch_delay_ms: u64,

    /// Simulated latency before a live prediction is stored (ms)
    #[arg(long, env = "LIVE_DELAY_MS", default_value = "1500")]
    pub live_delay_ms: u64,

    /// What to do with a result whose inputs were edited while it was computing
    #[arg(long, env = "STALE_RESULTS", value_enum, default_value = "discard")]
    pub stale_results: StaleResultPolicy,

    /// JSON file replacing the built-in team and venue catalog
    #[arg(long, env = "CATALOG_PATH")]
    pub catalog_path: Option<String>,

    /// Seed for the placeholder pre-match estimator (reproducible output)
    #[arg(long, env = "RNG_SEED")]
    pub rng_seed: Option<u64>,

    /// Idle time after which a page session is evicted (seconds)
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "3600")]
    pub session_ttl_secs: u64,

    /// Maximum open sessions per page type
    #[arg(long, env = "MAX_SESSIONS", default_value = "10000")]
    pub max_sessions: usize,
}

/// Upper bound on either simulated delay.
const MAX_DELAY_MS: u64 = 60_000;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.prematch_delay_ms > MAX_DELAY_MS {
            anyhow::bail!("prematch_delay_ms must be at most {}", MAX_DELAY_MS);
        }
        if self.live_delay_ms > MAX_DELAY_MS {
            anyhow::bail!("live_delay_ms must be at most {}", MAX_DELAY_MS);
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("session_ttl_secs must be positive");
        }
        if self.max_sessions == 0 {
            anyhow::bail!("max_sessions must be positive");
        }
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid listen_addr {:?}: {}", self.listen_addr, e))?;
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            live_delay: Duration::from_millis(self.live_delay_ms),
            prematch_delay: Duration::from_millis(self.prematch_delay_ms),
            stale_results: self.stale_results,
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            max_sessions: self.max_sessions,
        }
    }
}
