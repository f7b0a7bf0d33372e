pub mod license;

use crate::app::ports::{UpstreamReply, UpstreamTransport};
use crate::common::constants::PARAM_LICENSE_MD5;
use crate::common::error::{FetchCause, Result, UpstreamFetchError};
use crate::config::MovebankConfig;
use crate::domain::query::EntityQuery;
use crate::domain::NormalizedRecord;
use crate::infra::http_client::ReqwestTransport;
use crate::observability::metrics;
use crate::parser::csv::normalize;
use license::{is_license_notice, LicenseAcknowledgement, RawResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Executes entity queries against Movebank, satisfying the license handshake
/// transparently. Holds no per-query state and can be shared across tasks.
#[derive(Clone)]
pub struct EntityQueryClient {
    transport: Arc<dyn UpstreamTransport>,
}

impl EntityQueryClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &MovebankConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)
            .map_err(|e| crate::common::error::MovebankError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Fetch the raw body for `query`.
    ///
    /// At most two requests are issued. A notice that survives the
    /// acknowledgement comes back as `RawResponse::LicenseNotice`.
    #[instrument(skip(self), fields(entity_type = %query.entity_type()))]
    pub async fn fetch_raw(&self, query: &EntityQuery) -> std::result::Result<RawResponse, UpstreamFetchError> {
        let mut params = query.to_params();
        let first = self.send(query, &params, None).await?;

        if !is_license_notice(&first.body) {
            return Ok(RawResponse::Data(first.body));
        }

        info!("License terms need to be accepted");
        metrics::client::license_handshake(query.entity_type().as_str());
        let ack = LicenseAcknowledgement::from_terms(&first.body);
        params.push((PARAM_LICENSE_MD5.to_string(), ack.as_str().to_string()));

        // only the notice's session cookie is replayed, and only on this retry
        let second = self.send(query, &params, first.session_cookie.as_deref()).await?;
        let response = RawResponse::classify(second.body);
        if response.is_license_notice() {
            warn!("License notice still present after acknowledgement; passing it through");
            metrics::client::license_unresolved(query.entity_type().as_str());
        }
        Ok(response)
    }

    /// Fetch and normalize `query` into ordered records.
    pub async fn query(&self, query: &EntityQuery) -> Result<Vec<NormalizedRecord>> {
        let raw = self.fetch_raw(query).await?;
        let records = normalize(raw.text())?;
        info!(
            entity_type = %query.entity_type(),
            "Normalized {} records",
            records.len()
        );
        Ok(records)
    }

    async fn send(
        &self,
        query: &EntityQuery,
        params: &[(String, String)],
        cookie: Option<&str>,
    ) -> std::result::Result<UpstreamReply, UpstreamFetchError> {
        let entity_type = query.entity_type();
        let started = Instant::now();
        let outcome = self.transport.get(params, cookie).await;
        metrics::client::request_duration(started.elapsed().as_secs_f64());

        let reply: UpstreamReply = outcome.map_err(|e| {
            metrics::client::request_error(entity_type.as_str());
            UpstreamFetchError {
                entity_type,
                cause: FetchCause::Transport(e),
            }
        })?;

        if !reply.is_success() {
            metrics::client::request_error(entity_type.as_str());
            return Err(UpstreamFetchError {
                entity_type,
                cause: FetchCause::Status { status: reply.status },
            });
        }

        metrics::client::request_success(entity_type.as_str());
        metrics::client::payload_bytes(reply.body.len());
        Ok(reply)
    }
}
