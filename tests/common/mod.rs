//! In-process stand-in for the Movebank `direct-read` endpoint.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use movebank_tracker::config::{MovebankConfig, MovebankCredentials};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "s3cret";
/// base64("ada:s3cret")
const EXPECTED_AUTH: &str = "Basic YWRhOnMzY3JldA==";

pub const LICENSE_TEXT: &str = "Terms of use.\nLicense Terms: You must cite the data owners.\n";
/// md5(LICENSE_TEXT), lowercase hex
pub const LICENSE_MD5: &str = "931ca8ee55a2d9a64eed34c68df1991d";

/// Handed out with every reply, like the upstream servlet session.
pub const SESSION_COOKIE: &str = "JSESSIONID=abc";

pub const STUDIES_CSV: &str = "id,name,main_location_lat,main_location_long,number_of_individuals\n\
1,Fox Study,51.5072000,-0.1276000,4\n\
2,\"Owls, Barn\",48.8566000,2.3522000,7\n\
3,Gull Study,not-a-number,12.5,1\n";

pub const EVENTS_CSV: &str = "timestamp,location_long,location_lat,individual_id\n\
2015-03-01 06:00:00.000,8.9876,47.7501,1001\n\
2015-03-02 06:00:00.000,9.0012,47.7623,1001\n";

#[derive(Clone, Default)]
pub struct Recorded {
    pub requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub cookies: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    pub async fn all(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().await.clone()
    }

    /// `Cookie` header of each request, in arrival order.
    pub async fn cookies(&self) -> Vec<Option<String>> {
        self.cookies.lock().await.clone()
    }
}

async fn direct_read(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorded.requests.lock().await.push(params.clone());
    let cookie = headers.get(COOKIE).and_then(|v| v.to_str().ok()).map(str::to_string);
    recorded.cookies.lock().await.push(cookie);

    let (status, body) = answer(&headers, &params);
    (status, [(SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))], body).into_response()
}

fn answer(headers: &HeaderMap, params: &HashMap<String, String>) -> (StatusCode, String) {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized: bad credentials for ada".to_string());
    }

    let acknowledged = params.get("license-md5").map(String::as_str) == Some(LICENSE_MD5);
    match params.get("entity_type").map(String::as_str) {
        // licensed study list
        Some("study") if acknowledged => (StatusCode::OK, STUDIES_CSV.to_string()),
        Some("study") => (StatusCode::OK, LICENSE_TEXT.to_string()),
        // terms that never accept the acknowledgement
        Some("tag_type") => (StatusCode::OK, LICENSE_TEXT.to_string()),
        Some("event") => (StatusCode::OK, EVENTS_CSV.to_string()),
        _ => (StatusCode::BAD_REQUEST, "unknown entity type".to_string()),
    }
}

pub struct FakeMovebank {
    pub addr: SocketAddr,
    pub recorded: Recorded,
}

impl FakeMovebank {
    pub async fn start() -> anyhow::Result<Self> {
        let recorded = Recorded::default();
        let app = Router::new()
            .route("/movebank/service/direct-read", get(direct_read))
            .with_state(recorded.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { addr, recorded })
    }

    pub fn config(&self, username: &str, password: &str) -> MovebankConfig {
        MovebankConfig {
            base_url: format!("http://{}/movebank/service", self.addr),
            credentials: MovebankCredentials::new(username, password),
            request_timeout_secs: Some(10),
            ..MovebankConfig::default()
        }
    }

    pub fn valid_config(&self) -> MovebankConfig {
        self.config(USERNAME, PASSWORD)
    }
}
