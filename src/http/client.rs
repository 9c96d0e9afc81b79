//! Ping client used by the demo driver.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bad response: {0}")]
    BadStatus(StatusCode),
}

/// Issues `GET /ping` against one server. Any non-2xx status is an error.
#[derive(Debug, Clone)]
pub struct PingClient {
    client: reqwest::Client,
    url: String,
}

impl PingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/ping", base_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::BadStatus(status));
        }
        Ok(())
    }
}
