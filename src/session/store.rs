use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::error::{PredictionError, Result};

/// What to do with a result that arrives after the selection it was computed
/// from has been edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StaleResultPolicy {
    /// Drop results whose generation no longer matches the session.
    Discard,
    /// Write late results regardless, even over newer input.
    Overwrite,
}

/// Proof of a started prediction: the generation of the selection it read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// One page's Selection State plus the outcome last computed from it.
#[derive(Debug, Clone)]
pub struct Session<S, P> {
    pub selection: S,
    pub prediction: Option<P>,
    pub predicted_at: Option<DateTime<Utc>>,
    generation: u64,
    pending: u32,
    last_touched: DateTime<Utc>,
}

impl<S: Default, P> Session<S, P> {
    fn new() -> Self {
        Session {
            selection: S::default(),
            prediction: None,
            predicted_at: None,
            generation: 0,
            pending: 0,
            last_touched: Utc::now(),
        }
    }
}

impl<S, P> Session<S, P> {
    /// True while a triggered prediction has not come back yet.
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    /// Bumped on every accepted edit.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Sessions of one flow, keyed by id.
pub struct SessionMap<S, P> {
    sessions: Mutex<HashMap<u64, Session<S, P>>>,
    next_id: AtomicU64,
    max_sessions: usize,
}

impl<S, P> SessionMap<S, P>
where
    S: Default + Clone,
    P: Clone,
{
    pub fn new(max_sessions: usize) -> Self {
        SessionMap {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_sessions,
        }
    }

    pub async fn create(&self) -> Result<(u64, Session<S, P>)> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            return Err(PredictionError::TooManySessions(self.max_sessions));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Session::new();
        sessions.insert(id, session.clone());
        Ok((id, session))
    }

    pub async fn get(&self, id: u64) -> Result<Session<S, P>> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PredictionError::SessionNotFound(id))?;
        session.last_touched = Utc::now();
        Ok(session.clone())
    }

    /// Apply an edit to the selection. When `edit` succeeds the stored
    /// outcome is cleared and the generation advances; when it fails the
    /// session is left untouched.
    pub async fn update<F>(&self, id: u64, edit: F) -> Result<Session<S, P>>
    where
        F: FnOnce(&mut S) -> Result<()>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PredictionError::SessionNotFound(id))?;
        session.last_touched = Utc::now();
        edit(&mut session.selection)?;
        session.generation += 1;
        session.prediction = None;
        session.predicted_at = None;
        Ok(session.clone())
    }

    /// Start a prediction: validate the current selection with `snapshot` and
    /// mark the session as loading. Only one prediction may be in flight.
    pub async fn begin<T, F>(&self, id: u64, snapshot: F) -> Result<(Ticket, T, Session<S, P>)>
    where
        F: FnOnce(&S) -> Result<T>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PredictionError::SessionNotFound(id))?;
        session.last_touched = Utc::now();
        if session.pending > 0 {
            return Err(PredictionError::AlreadyCalculating);
        }
        let input = snapshot(&session.selection)?;
        session.pending += 1;
        let ticket = Ticket {
            generation: session.generation,
        };
        Ok((ticket, input, session.clone()))
    }

    /// Finish a prediction started with `ticket`. `outcome` is `None` when
    /// the estimator failed. Returns whether the outcome was stored.
    pub async fn complete(
        &self,
        id: u64,
        ticket: Ticket,
        outcome: Option<P>,
        policy: StaleResultPolicy,
    ) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PredictionError::SessionNotFound(id))?;
        session.pending = session.pending.saturating_sub(1);

        let Some(outcome) = outcome else {
            return Ok(false);
        };
        if policy == StaleResultPolicy::Discard && ticket.generation != session.generation {
            return Ok(false);
        }
        session.prediction = Some(outcome);
        session.predicted_at = Some(Utc::now());
        Ok(true)
    }

    /// Drop sessions idle for longer than `ttl`, unless a prediction is still
    /// in flight. Returns how many were removed.
    pub async fn sweep(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.pending > 0 || s.last_touched >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
