use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

mod pages;

use crate::catalog::Team;
use crate::error::PredictionError;
use crate::predictor::{Fixture, LivePrediction, MatchSituation, PreMatchPrediction};
use crate::presenter::{
    group_thousands, live_breakdown, prematch_breakdown, LiveBreakdown, PreMatchBreakdown,
};
use crate::session::{
    LiveSelection, LiveSession, LiveUpdate, PreMatchSelection, PreMatchSession, PreMatchUpdate,
    SessionManager,
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

/// Build the Axum router for the predictor pages and API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(prematch_page))
        .route("/live", get(live_page))
        .route("/api/teams", get(teams_handler))
        .route("/api/venues", get(venues_handler))
        .route("/api/prematch/sessions", post(create_prematch_handler))
        .route(
            "/api/prematch/sessions/:id",
            get(get_prematch_handler).patch(update_prematch_handler),
        )
        .route(
            "/api/prematch/sessions/:id/predict",
            post(predict_prematch_handler),
        )
        .route("/api/live/sessions", post(create_live_handler))
        .route(
            "/api/live/sessions/:id",
            get(get_live_handler).patch(update_live_handler),
        )
        .route("/api/live/sessions/:id/predict", post(predict_live_handler))
        .route("/api/estimate/live", post(estimate_live_handler))
        .route("/api/estimate/prematch", post(estimate_prematch_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub title: String,
    pub error: String,
    /// False when the page should only keep its trigger disabled
    pub notify: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(e: PredictionError) -> ApiError {
    let status = match &e {
        PredictionError::MissingTeams
        | PredictionError::MissingTarget
        | PredictionError::SameTeam(_)
        | PredictionError::UnknownTeam(_)
        | PredictionError::UnknownVenue(_)
        | PredictionError::OutOfRange { .. }
        | PredictionError::InvalidTarget
        | PredictionError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::IncompleteFixture | PredictionError::AlreadyCalculating => {
            StatusCode::CONFLICT
        }
        PredictionError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        PredictionError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
        PredictionError::Estimator(_) => StatusCode::BAD_GATEWAY,
    };
    debug!("Request rejected ({}): {}", status, e);
    (
        status,
        Json(ErrorBody {
            title: e.title().to_string(),
            error: e.to_string(),
            notify: e.notify_user(),
        }),
    )
}

/// `Json` extractor whose rejection uses the same `ErrorBody` as every other
/// API error.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    // 422 for bad field values, 400/415 for syntax and content type
    let status = rejection.status();
    let (_, body) = api_error(PredictionError::MalformedRequest(rejection.body_text()));
    (status, body)
}

// ── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LiveSessionView {
    pub id: u64,
    pub generation: u64,
    pub selection: LiveSelection,
    pub loading: bool,
    pub can_predict: bool,
    pub prediction: Option<LivePrediction>,
    pub predicted_at: Option<DateTime<Utc>>,
    pub breakdown: Option<LiveBreakdown>,
}

impl LiveSessionView {
    fn new(id: u64, session: LiveSession) -> Self {
        let breakdown = session
            .prediction
            .as_ref()
            .map(|p| live_breakdown(&session.selection, p));
        LiveSessionView {
            id,
            generation: session.generation(),
            loading: session.loading(),
            can_predict: session.selection.can_predict() && !session.loading(),
            prediction: session.prediction,
            predicted_at: session.predicted_at,
            selection: session.selection,
            breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreMatchSessionView {
    pub id: u64,
    pub generation: u64,
    pub selection: PreMatchSelection,
    pub loading: bool,
    pub can_predict: bool,
    pub prediction: Option<PreMatchPrediction>,
    pub predicted_at: Option<DateTime<Utc>>,
    pub breakdown: Option<PreMatchBreakdown>,
}

impl PreMatchSessionView {
    fn new(id: u64, session: PreMatchSession, manager: &SessionManager) -> Self {
        let venue = session
            .selection
            .venue
            .as_deref()
            .and_then(|v| manager.catalog().find_venue(v));
        let breakdown = session
            .prediction
            .as_ref()
            .and_then(|p| prematch_breakdown(&session.selection, p, venue));
        PreMatchSessionView {
            id,
            generation: session.generation(),
            loading: session.loading(),
            can_predict: session.selection.can_predict() && !session.loading(),
            prediction: session.prediction,
            predicted_at: session.predicted_at,
            selection: session.selection,
            breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
struct VenueView {
    name: String,
    city: String,
    capacity: u32,
    capacity_label: String,
}

// ── Pages ────────────────────────────────────────────────────────────────────

async fn prematch_page() -> impl IntoResponse {
    Html(pages::prematch_html())
}

async fn live_page() -> impl IntoResponse {
    Html(pages::live_html())
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TeamsQuery {
    exclude: Option<String>,
}

/// GET /api/teams?exclude=<team>
async fn teams_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TeamsQuery>,
) -> Json<Vec<Team>> {
    let catalog = state.sessions.catalog();
    let exclude = q
        .exclude
        .as_deref()
        .and_then(|key| catalog.find_team(key))
        .map(|t| t.name.as_str());
    Json(
        catalog
            .teams_excluding(exclude)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/venues
async fn venues_handler(State(state): State<Arc<AppState>>) -> Json<Vec<VenueView>> {
    let venues = state
        .sessions
        .catalog()
        .venues()
        .iter()
        .map(|v| VenueView {
            name: v.name.clone(),
            city: v.city.clone(),
            capacity: v.capacity,
            capacity_label: group_thousands(v.capacity),
        })
        .collect();
    Json(venues)
}

// ── Pre-match sessions ───────────────────────────────────────────────────────

/// POST /api/prematch/sessions
async fn create_prematch_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let (id, session) = state.sessions.create_prematch().await.map_err(api_error)?;
    Ok((
        StatusCode::CREATED,
        Json(PreMatchSessionView::new(id, session, &state.sessions)),
    ))
}

/// GET /api/prematch/sessions/:id
async fn get_prematch_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<PreMatchSessionView>, ApiError> {
    let session = state.sessions.prematch_session(id).await.map_err(api_error)?;
    Ok(Json(PreMatchSessionView::new(id, session, &state.sessions)))
}

/// PATCH /api/prematch/sessions/:id
async fn update_prematch_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    ApiJson(update): ApiJson<PreMatchUpdate>,
) -> Result<Json<PreMatchSessionView>, ApiError> {
    let session = state
        .sessions
        .update_prematch(id, update)
        .await
        .map_err(api_error)?;
    Ok(Json(PreMatchSessionView::new(id, session, &state.sessions)))
}

/// POST /api/prematch/sessions/:id/predict
async fn predict_prematch_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let (session, _task) = state
        .sessions
        .trigger_prematch(id)
        .await
        .map_err(api_error)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PreMatchSessionView::new(id, session, &state.sessions)),
    ))
}

// ── Live sessions ────────────────────────────────────────────────────────────

/// POST /api/live/sessions
async fn create_live_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let (id, session) = state.sessions.create_live().await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(LiveSessionView::new(id, session))))
}

/// GET /api/live/sessions/:id
async fn get_live_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<LiveSessionView>, ApiError> {
    let session = state.sessions.live_session(id).await.map_err(api_error)?;
    Ok(Json(LiveSessionView::new(id, session)))
}

/// PATCH /api/live/sessions/:id
async fn update_live_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    ApiJson(update): ApiJson<LiveUpdate>,
) -> Result<Json<LiveSessionView>, ApiError> {
    let session = state
        .sessions
        .update_live(id, update)
        .await
        .map_err(api_error)?;
    Ok(Json(LiveSessionView::new(id, session)))
}

/// POST /api/live/sessions/:id/predict
async fn predict_live_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let (session, _task) = state.sessions.trigger_live(id).await.map_err(api_error)?;
    Ok((StatusCode::ACCEPTED, Json(LiveSessionView::new(id, session))))
}

// ── Backend contract ─────────────────────────────────────────────────────────

/// POST /api/estimate/live
async fn estimate_live_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(situation): ApiJson<MatchSituation>,
) -> Result<Json<LivePrediction>, ApiError> {
    state
        .sessions
        .estimate_live_now(&situation)
        .await
        .map(Json)
        .map_err(api_error)
}

/// POST /api/estimate/prematch
async fn estimate_prematch_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(fixture): ApiJson<Fixture>,
) -> Result<Json<PreMatchPrediction>, ApiError> {
    state
        .sessions
        .estimate_prematch_now(&fixture)
        .await
        .map(Json)
        .map_err(api_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::predictor::{FormulaEstimator, RandomEstimator};
    use crate::session::{SessionSettings, StaleResultPolicy};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn spawn_app() -> String {
        let manager = SessionManager::new(
            Arc::new(Catalog::default()),
            Arc::new(FormulaEstimator),
            Arc::new(RandomEstimator::new(Some(3))),
            SessionSettings {
                live_delay: Duration::ZERO,
                prematch_delay: Duration::ZERO,
                stale_results: StaleResultPolicy::Discard,
                session_ttl: Duration::from_secs(60),
                max_sessions: 100,
            },
        );
        let app = router(AppState {
            sessions: Arc::new(manager),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Poll a session until its prediction lands (or give up).
    async fn wait_for_prediction(client: &reqwest::Client, url: &str) -> Value {
        for _ in 0..100 {
            let view: Value = client.get(url).send().await.unwrap().json().await.unwrap();
            if !view["loading"].as_bool().unwrap() {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("prediction never completed for {}", url);
    }

    #[tokio::test]
    async fn serves_both_pages() {
        let base = spawn_app().await;
        let index = reqwest::get(&base).await.unwrap().text().await.unwrap();
        assert!(index.contains("Predict Winner"));
        let live = reqwest::get(format!("{}/live", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(live.contains("Update Prediction"));
    }

    #[tokio::test]
    async fn team_list_excludes_counterpart() {
        let base = spawn_app().await;
        let teams: Vec<Team> = reqwest::get(format!("{}/api/teams?exclude=CSK", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(teams.len(), 9);
        assert!(teams.iter().all(|t| t.code != "CSK"));

        let venues: Value = reqwest::get(format!("{}/api/venues", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(venues.as_array().unwrap().len(), 12);
        assert_eq!(venues[0]["capacity_label"], "33,108");
    }

    #[tokio::test]
    async fn live_session_round_trip() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/api/live/sessions", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
        let view: Value = resp.json().await.unwrap();
        let url = format!("{}/api/live/sessions/{}", base, view["id"]);
        assert_eq!(view["can_predict"], false);

        // Trigger without teams → Missing Information
        let resp = client
            .post(format!("{}/predict", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = resp.json().await.unwrap();
        assert_eq!(body.title, "Missing Information");
        assert!(body.notify);

        for update in [
            json!({"field": "batting_team", "value": "Rajasthan Royals"}),
            json!({"field": "bowling_team", "value": "DC"}),
            json!({"field": "current_runs", "value": 60}),
            json!({"field": "current_wickets", "value": 9}),
            json!({"field": "overs_completed", "value": 10}),
            json!({"field": "is_second_innings", "value": true}),
        ] {
            let resp = client.patch(&url).json(&update).send().await.unwrap();
            assert!(resp.status().is_success(), "{}", update);
        }

        // Chase without target → Missing Target
        let resp = client
            .post(format!("{}/predict", url))
            .send()
            .await
            .unwrap();
        let body: ErrorBody = resp.json().await.unwrap();
        assert_eq!(body.title, "Missing Target");

        client
            .patch(&url)
            .json(&json!({"field": "target_score", "value": 160}))
            .send()
            .await
            .unwrap();
        let resp = client
            .post(format!("{}/predict", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);

        let view = wait_for_prediction(&client, &url).await;
        assert_eq!(view["prediction"]["batting_team_win_probability"], 10);
        assert_eq!(view["prediction"]["bowling_team_win_probability"], 90);
        assert_eq!(view["breakdown"]["required_run_rate"], "10.00");
        assert_eq!(view["breakdown"]["favorite"]["team"], "Delhi Capitals");
        assert_eq!(view["breakdown"]["scoreline"], "60/9");

        // Any edit clears the stored outcome
        let view: Value = client
            .patch(&url)
            .json(&json!({"field": "current_runs", "value": 61}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(view["prediction"].is_null());
        assert!(view["breakdown"].is_null());
    }

    #[tokio::test]
    async fn live_update_rejects_bad_values() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();
        let view: Value = client
            .post(format!("{}/api/live/sessions", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let url = format!("{}/api/live/sessions/{}", base, view["id"]);

        let resp = client
            .patch(&url)
            .json(&json!({"field": "balls_in_current_over", "value": 6}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

        let resp = client
            .get(format!("{}/api/live/sessions/9999", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn undecodable_bodies_use_error_body() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();
        let view: Value = client
            .post(format!("{}/api/live/sessions", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let url = format!("{}/api/live/sessions/{}", base, view["id"]);

        let resp = client
            .patch(&url)
            .json(&json!({"field": "current_runs", "value": -1}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
        assert_eq!(body.title, "Invalid Input");
        assert!(body.notify);

        let resp = client
            .post(format!("{}/api/estimate/live", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: ErrorBody = resp.json().await.unwrap();
        assert_eq!(body.title, "Invalid Input");
    }

    #[tokio::test]
    async fn prematch_session_round_trip() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();
        let view: Value = client
            .post(format!("{}/api/prematch/sessions", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let url = format!("{}/api/prematch/sessions/{}", base, view["id"]);

        for update in [
            json!({"field": "team1", "value": "Gujarat Titans"}),
            json!({"field": "team2", "value": "Gujarat Titans"}),
            json!({"field": "venue", "value": "Narendra Modi Stadium"}),
        ] {
            client.patch(&url).json(&update).send().await.unwrap();
        }

        // Identical teams: trigger disabled, no user notification
        let view: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
        assert_eq!(view["can_predict"], false);
        let resp = client
            .post(format!("{}/predict", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
        let body: ErrorBody = resp.json().await.unwrap();
        assert!(!body.notify);

        client
            .patch(&url)
            .json(&json!({"field": "team2", "value": "LSG"}))
            .send()
            .await
            .unwrap();
        let resp = client
            .post(format!("{}/predict", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);

        let view = wait_for_prediction(&client, &url).await;
        let b = &view["breakdown"];
        assert_eq!(b["winner"], "Gujarat Titans");
        let p1 = b["team1"]["percent"].as_u64().unwrap();
        let p2 = b["team2"]["percent"].as_u64().unwrap();
        assert_eq!(p1 + p2, 100);
        assert!((60..=90).contains(&p1));
        assert_eq!(b["venue"], "Narendra Modi Stadium, Ahmedabad");
    }

    #[tokio::test]
    async fn estimate_endpoints() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let p: LivePrediction = client
            .post(format!("{}/api/estimate/live", base))
            .json(&json!({
                "batting_team": "MI",
                "bowling_team": "SRH",
                "current_runs": 80,
                "current_wickets": 2,
                "overs_completed": 10,
                "balls_in_current_over": 0,
                "target_score": null,
                "is_second_innings": false
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(p.batting_team_win_probability, 42);
        assert_eq!(p.required_run_rate, None);

        let resp = client
            .post(format!("{}/api/estimate/prematch", base))
            .json(&json!({"team1": "MI", "team2": "SRH", "venue": "Lord's"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

        let p: PreMatchPrediction = client
            .post(format!("{}/api/estimate/prematch", base))
            .json(&json!({"team1": "MI", "team2": "SRH", "venue": "Wankhede Stadium"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(p.winner, "Mumbai Indians");
    }
}
