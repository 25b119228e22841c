pub mod assistant;
pub mod news;
pub mod weather;

pub use assistant::{Assistant, OpenAiAssistant};
pub use weather::WeatherService;

use thiserror::Error;

/// Failures talking to a third-party provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Shared outbound client with the configured timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turn a non-2xx response into [`UpstreamError::Status`].
pub(crate) async fn check_status(
    resp: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}
