mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::FakeMovebank;
use movebank_tracker::app::TrackingUseCase;
use movebank_tracker::config::MovebankConfig;
use movebank_tracker::server::{create_router, AppState};
use movebank_tracker::EntityQueryClient;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router_for(config: &MovebankConfig) -> Result<axum::Router> {
    let client = EntityQueryClient::from_config(config)?;
    let tracking = TrackingUseCase::new(client, config.reduction_profile.clone());
    Ok(create_router(AppState { tracking }))
}

async fn get(router: axum::Router, uri: &str) -> Result<(StatusCode, String)> {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

#[tokio::test]
async fn studies_endpoint_returns_projected_records() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let router = router_for(&upstream.valid_config())?;

    let (status, body) = get(router, "/api/movebank-data").await?;

    assert_eq!(status, StatusCode::OK);
    let studies: Value = serde_json::from_str(&body)?;
    assert_eq!(
        studies[0],
        json!({
            "id": "1",
            "name": "Fox Study",
            "main_location_lat": "51.5072000",
            "main_location_long": "-0.1276000"
        })
    );
    assert_eq!(studies.as_array().map(Vec::len), Some(3));
    assert!(studies[0].get("number_of_individuals").is_none());
    Ok(())
}

#[tokio::test]
async fn study_events_endpoint_returns_track_records() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let router = router_for(&upstream.valid_config())?;

    let (status, body) = get(router, "/api/movebank-data/2911040").await?;

    assert_eq!(status, StatusCode::OK);
    let events: Value = serde_json::from_str(&body)?;
    assert_eq!(events[1]["location_lat"], "47.7623");
    assert_eq!(events[1]["individual_id"], "1001");

    let requests = upstream.recorded.all().await;
    assert_eq!(requests[0].get("study_id").map(String::as_str), Some("2911040"));
    assert_eq!(requests[0].get("event_reduction_profile").map(String::as_str), Some("EURING_01"));
    Ok(())
}

#[tokio::test]
async fn upstream_401_becomes_generic_500() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let router = router_for(&upstream.config("ada", "wrong"))?;

    let (status, body) = get(router, "/api/movebank-data").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let payload: Value = serde_json::from_str(&body)?;
    assert_eq!(payload, json!({ "error": "Failed to fetch data from Movebank" }));
    assert!(!body.contains("wrong"));
    assert!(!body.contains("Unauthorized"));
    Ok(())
}

#[tokio::test]
async fn map_markers_skip_unparsable_locations() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let router = router_for(&upstream.valid_config())?;

    let (status, body) = get(router, "/api/map/markers").await?;

    assert_eq!(status, StatusCode::OK);
    let markers: Value = serde_json::from_str(&body)?;
    let ids: Vec<&str> = markers
        .as_array()
        .map(|m| m.iter().filter_map(|v| v["id"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["1", "2"]);
    Ok(())
}

#[tokio::test]
async fn map_track_lists_lat_lon_pairs() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let router = router_for(&upstream.valid_config())?;

    let (status, body) = get(router, "/api/map/track/2911040").await?;

    assert_eq!(status, StatusCode::OK);
    let track: Value = serde_json::from_str(&body)?;
    assert_eq!(track["study_id"], "2911040");
    assert_eq!(track["points"][0], json!([47.7501, 8.9876]));
    Ok(())
}

#[tokio::test]
async fn health_reports_service() -> Result<()> {
    let router = router_for(&MovebankConfig::default())?;

    let (status, body) = get(router, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("movebank-tracker"));
    Ok(())
}
