mod common;

use anyhow::Result;
use common::{FakeMovebank, LICENSE_MD5, LICENSE_TEXT, SESSION_COOKIE};
use movebank_tracker::client::license::RawResponse;
use movebank_tracker::common::error::FetchCause;
use movebank_tracker::domain::query::{EntityQuery, EntityType};
use movebank_tracker::EntityQueryClient;

#[tokio::test]
async fn license_is_acknowledged_with_md5_of_whole_notice() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let client = EntityQueryClient::from_config(&upstream.valid_config())?;

    let records = client.query(&EntityQuery::new(EntityType::Study)).await?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["name"], "Owls, Barn");

    let requests = upstream.recorded.all().await;
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].contains_key("license-md5"));
    assert_eq!(requests[1].get("license-md5").map(String::as_str), Some(LICENSE_MD5));
    assert_eq!(requests[1].get("entity_type").map(String::as_str), Some("study"));
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_scoped_to_one_handshake() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let client = EntityQueryClient::from_config(&upstream.valid_config())?;

    client.query(&EntityQuery::new(EntityType::Study)).await?;
    client.query(&EntityQuery::new(EntityType::Event)).await?;

    let cookies = upstream.recorded.cookies().await;
    assert_eq!(cookies, vec![None, Some(SESSION_COOKIE.to_string()), None]);
    Ok(())
}

#[tokio::test]
async fn stubborn_notice_is_passed_through_after_one_retry() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let client = EntityQueryClient::from_config(&upstream.valid_config())?;

    let raw = client.fetch_raw(&EntityQuery::new(EntityType::TagType)).await?;

    assert_eq!(raw, RawResponse::LicenseNotice(LICENSE_TEXT.to_string()));
    assert_eq!(upstream.recorded.all().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn data_without_license_needs_one_request_and_keeps_filters() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let client = EntityQueryClient::from_config(&upstream.valid_config())?;
    let query = EntityQuery::new(EntityType::Event)
        .filter("study_id", "2911040")
        .filter("attributes", "timestamp,location_long,location_lat,individual_id");

    let records = client.query(&query).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["individual_id"], "1001");
    let requests = upstream.recorded.all().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get("study_id").map(String::as_str), Some("2911040"));
    assert_eq!(
        requests[0].get("attributes").map(String::as_str),
        Some("timestamp,location_long,location_lat,individual_id")
    );
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_fail_with_upstream_fetch_error() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let client = EntityQueryClient::from_config(&upstream.config("ada", "wrong"))?;

    let err = client
        .fetch_raw(&EntityQuery::new(EntityType::Study))
        .await
        .expect_err("401 must fail");

    assert_eq!(err.entity_type, EntityType::Study);
    assert_eq!(err.cause, FetchCause::Status { status: 401 });
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_failure() -> Result<()> {
    let upstream = FakeMovebank::start().await?;
    let mut config = upstream.valid_config();
    // port 9 (discard) is not listening locally
    config.base_url = "http://127.0.0.1:9/movebank/service".to_string();
    let client = EntityQueryClient::from_config(&config)?;

    let err = client
        .fetch_raw(&EntityQuery::new(EntityType::Event))
        .await
        .expect_err("connection must fail");

    assert!(matches!(err.cause, FetchCause::Transport(_)));
    Ok(())
}
