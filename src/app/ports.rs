use async_trait::async_trait;

/// Outbound seam to the upstream `direct-read` endpoint. Implementations attach
/// credentials and perform exactly one HTTP GET per call.
///
/// `cookie` is sent as the `Cookie` header when present. Implementations keep
/// no cookie jar; session state only travels through this argument.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, params: &[(String, String)], cookie: Option<&str>) -> Result<UpstreamReply, String>;
}

#[derive(Clone, Debug, Default)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
    /// `name=value` pairs from the reply's `Set-Cookie` headers, joined with `; `.
    pub session_cookie: Option<String>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
