use crate::app::ports::{UpstreamReply, UpstreamTransport};
use crate::common::constants::DIRECT_READ_PATH;
use crate::config::MovebankConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use std::time::Duration;

/// reqwest-backed transport for `{base_url}/direct-read` with basic auth.
///
/// There is no cookie store on the client: every request starts without
/// session state unless the caller hands one in.
pub struct ReqwestTransport {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl ReqwestTransport {
    pub fn new(config: &MovebankConfig) -> Result<Self, reqwest::Error> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("movebank_tracker/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: format!("{}/{}", config.base_url.trim_end_matches('/'), DIRECT_READ_PATH),
            username: config.credentials.username.clone(),
            password: config.credentials.password.clone(),
        })
    }
}

/// Reduce `Set-Cookie` headers to a `Cookie` header value (attributes dropped).
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn get(&self, params: &[(String, String)], cookie: Option<&str>) -> Result<UpstreamReply, String> {
        tracing::debug!("HTTP GET request to: {} ({} params)", self.url, params.len());
        let mut request = self
            .client
            .get(&self.url)
            .query(params)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let resp = request.send().await.map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let session_cookie = session_cookie(resp.headers());
        let body = resp.text().await.map_err(|e| e.to_string())?;
        tracing::debug!("HTTP response: status={}, size={} bytes", status, body.len());
        Ok(UpstreamReply {
            status,
            body,
            session_cookie,
        })
    }
}
