use anyhow::{anyhow, bail, Context as _, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn new_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Error response from one of the remote APIs
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

impl std::error::Error for ApiError {}

/// Fails with an [ApiError] for non-2xx responses, otherwise parses the body as JSON
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| anyhow!("Failed to read response from {url}"))?;
    if !status.is_success() {
        bail!(ApiError { status, body });
    }
    serde_json::from_str(&body).with_context(|| anyhow!("Failed to parse response from {url}"))
}
