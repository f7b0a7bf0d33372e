use crate::app::tracking_use_case::TrackingUseCase;
use crate::common::constants::FETCH_FAILED_MESSAGE;
use crate::common::error::MovebankError;
use crate::domain::{Study, StudyEvent};
use crate::observability::metrics;
use crate::presentation::{study_markers, track_line, StudyMarker, TrackLine};
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub tracking: TrackingUseCase,
}

/// Any pipeline failure: logged in full, answered with a generic 500.
pub struct ApiError {
    route: &'static str,
    error: MovebankError,
}

impl ApiError {
    fn at(route: &'static str) -> impl FnOnce(MovebankError) -> Self {
        move |error| Self { route, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(route = self.route, kind = self.error.kind(), "Error fetching data from Movebank: {}", self.error);
        metrics::server::failure(self.route, self.error.kind());
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": FETCH_FAILED_MESSAGE })),
        )
            .into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "movebank-tracker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_text() -> impl IntoResponse {
    match metrics::render() {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

async fn list_studies(State(state): State<AppState>) -> Result<Json<Vec<Study>>, ApiError> {
    const ROUTE: &str = "/api/movebank-data";
    metrics::server::request(ROUTE);
    let studies = state.tracking.fetch_studies().await.map_err(ApiError::at(ROUTE))?;
    Ok(Json(studies))
}

async fn study_events(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> Result<Json<Vec<StudyEvent>>, ApiError> {
    const ROUTE: &str = "/api/movebank-data/:study_id";
    metrics::server::request(ROUTE);
    let events = state
        .tracking
        .fetch_study_events(&study_id)
        .await
        .map_err(ApiError::at(ROUTE))?;
    Ok(Json(events))
}

async fn map_markers(State(state): State<AppState>) -> Result<Json<Vec<StudyMarker>>, ApiError> {
    const ROUTE: &str = "/api/map/markers";
    metrics::server::request(ROUTE);
    let studies = state.tracking.fetch_studies().await.map_err(ApiError::at(ROUTE))?;
    Ok(Json(study_markers(&studies)))
}

async fn map_track(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> Result<Json<TrackLine>, ApiError> {
    const ROUTE: &str = "/api/map/track/:study_id";
    metrics::server::request(ROUTE);
    let events = state
        .tracking
        .fetch_study_events(&study_id)
        .await
        .map_err(ApiError::at(ROUTE))?;
    Ok(Json(track_line(&study_id, &events)))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/api/movebank-data", get(list_studies))
        .route("/api/movebank-data/:study_id", get(study_events))
        .route("/api/map/markers", get(map_markers))
        .route("/api/map/track/:study_id", get(map_track))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors))
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server is running on port {}", port);
    info!("Studies: http://localhost:{}/api/movebank-data", port);

    axum::serve(listener, app).await?;
    Ok(())
}
