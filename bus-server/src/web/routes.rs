//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::{TripId, Vote};
use crate::matcher::{MatchError, MatchedTrip};
use crate::service::{LoadExport, LoadedRoute, VoteResult};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/trips", get(search_trips))
        .route("/api/stops", get(list_stops))
        .route("/api/routes/:label", get(routes_by_label))
        .route("/api/load", get(load_routes))
        .route("/api/trips/:id/like", post(like_trip))
        .route("/api/trips/:id/dislike", post(dislike_trip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Trips from origin to destination, optionally on a given day.
async fn search_trips(
    State(state): State<AppState>,
    Query(req): Query<TripSearchRequest>,
) -> Result<Json<Vec<MatchedTrip>>, AppError> {
    let (query, date) = req
        .parse()
        .map_err(|message| AppError::BadRequest { message })?;

    let trips = state.schedule.find_trips(query, date).await?;
    Ok(Json(trips))
}

async fn list_stops(State(state): State<AppState>) -> Json<Vec<StopResult>> {
    let stops = state.schedule.stops().await;
    Json(stops.iter().map(StopResult::from).collect())
}

/// Curated routes whose label contains the path segment.
async fn routes_by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Json<Vec<LoadedRoute>> {
    Json(state.schedule.routes_by_label(&label).await)
}

/// Offline export of every curated route.
async fn load_routes(State(state): State<AppState>) -> Json<LoadExport> {
    Json(state.schedule.load_routes().await)
}

async fn like_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(req): Query<VoteRequest>,
) -> Result<Json<VoteResult>, AppError> {
    vote(&state, TripId(id), Vote::Like, req.switch).await
}

async fn dislike_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(req): Query<VoteRequest>,
) -> Result<Json<VoteResult>, AppError> {
    vote(&state, TripId(id), Vote::Dislike, req.switch).await
}

async fn vote(
    state: &AppState,
    id: TripId,
    vote: Vote,
    switching: bool,
) -> Result<Json<VoteResult>, AppError> {
    state
        .schedule
        .vote(id, vote, switching)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No trip with id {id}"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::InvalidQuery(message) => AppError::BadRequest { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };
        debug!(%status, %message, "request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CachedDirections};
    use crate::directions::{DirectionsBackend, MockDirectionsClient, fixtures};
    use crate::domain::{DayType, StopSequence, TripDraft};
    use crate::ingest::IngestConfig;
    use crate::matcher::MatcherConfig;
    use crate::service::ScheduleService;
    use crate::store::Catalog;
    use chrono::Utc;
    use serde_json::Value;

    async fn serve(external: bool) -> (String, Catalog) {
        let catalog = Catalog::new();
        let provider = CachedDirections::new(
            DirectionsBackend::Mock(MockDirectionsClient::new().always(fixtures::route_4())),
            &CacheConfig::default(),
        );
        let service = ScheduleService::new(
            catalog.clone(),
            MatcherConfig::default(),
            provider,
            IngestConfig::default(),
        )
        .with_external_lookups(external);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = create_router(AppState::new(service));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), catalog)
    }

    async fn seed(catalog: &Catalog) -> TripId {
        let stops = StopSequence::parse([
            ("Ponta Delgada", "08h00"),
            ("Lagoa", "08h20"),
            ("Ribeira Grande", "08h45"),
        ])
        .unwrap();
        catalog
            .trips
            .insert_if_absent(TripDraft::curated("4", stops, DayType::Weekday), Utc::now())
            .await
            .id
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (base, _) = serve(false).await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn search_returns_matches() {
        let (base, catalog) = serve(false).await;
        seed(&catalog).await;

        let trips: Value = reqwest::get(format!(
            "{base}/api/trips?origin=Lagoa&destination=Ribeira%20Grande&day=2024-06-03&start=08h00"
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

        assert_eq!(trips.as_array().unwrap().len(), 1);
        assert_eq!(trips[0]["start_time"], "08h20");
        assert_eq!(trips[0]["end_time"], "08h45");
    }

    #[tokio::test]
    async fn search_without_day_spans_day_types() {
        let (base, catalog) = serve(false).await;
        let stops = StopSequence::parse([("Lagoa", "09h00"), ("Furnas", "09h40")]).unwrap();
        catalog
            .trips
            .insert_if_absent(TripDraft::curated("6", stops, DayType::Sunday), Utc::now())
            .await;

        let url = format!("{base}/api/trips?origin=Lagoa&destination=Furnas");
        let trips: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(trips.as_array().unwrap().len(), 1);
        assert_eq!(trips[0]["day_type"], "SUNDAY");

        let monday: Value = reqwest::get(format!("{url}&day=2024-06-03"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(monday.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_origin_is_bad_request() {
        let (base, _) = serve(false).await;
        let response = reqwest::get(format!("{base}/api/trips?destination=Lagoa&day=2024-06-03"))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("origin"));
    }

    #[tokio::test]
    async fn bad_day_is_bad_request() {
        let (base, _) = serve(false).await;
        let response = reqwest::get(format!(
            "{base}/api/trips?origin=Lagoa&destination=Furnas&day=tomorrow"
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn discovery_registers_stops() {
        let (base, _) = serve(true).await;
        let trips: Value = reqwest::get(format!(
            "{base}/api/trips?origin=Lagoa&destination=Ribeira%20Grande&day=2024-06-03"
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
        assert_eq!(trips[0]["kind"], "discovered");

        let stops: Value = reqwest::get(format!("{base}/api/stops"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stops.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn routes_and_load() {
        let (base, catalog) = serve(false).await;
        seed(&catalog).await;

        let routes: Value = reqwest::get(format!("{base}/api/routes/4"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(routes[0]["route"], "4");
        assert_eq!(routes[0]["times"][0], "08h00");

        let load: Value = reqwest::get(format!("{base}/api/load"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(load["routes"].as_array().unwrap().len(), 1);
        assert!(load["holidays"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn voting() {
        let (base, catalog) = serve(false).await;
        let id = seed(&catalog).await;
        let client = reqwest::Client::new();

        let votes: Value = client
            .post(format!("{base}/api/trips/{id}/like"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(votes["likes_percent"], 100);

        let votes: Value = client
            .post(format!("{base}/api/trips/{id}/dislike?switch=true"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(votes["likes"], 0);
        assert_eq!(votes["dislikes"], 1);

        let missing = client
            .post(format!("{base}/api/trips/999/like"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
