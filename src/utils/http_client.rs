use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{AppResult, SourceError, SourceResult};

/// JSON-over-HTTP client shared by every job source
///
/// Errors are reported without the request URL's query string, since the
/// search aggregator carries its API key there.
#[derive(Debug, Clone)]
pub struct StandardHttpClient {
    client: Client,
    timeout: Duration,
}

impl StandardHttpClient {
    /// Create a client with a default per-request timeout
    pub fn new(timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the body as JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> SourceResult<T> {
        self.fetch_json_with_query(url, &[], None).await
    }

    /// GET `url` with query parameters and an optional timeout override
    pub async fn fetch_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> SourceResult<T> {
        debug!("Fetching JSON from: {}", url);

        let mut request = self.client.get(url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| map_request_error(url, e))?;
        let response = check_status(url, response)?;

        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(url, e))?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        decode_json(url, &body)
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, body: &[u8]) -> SourceResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| SourceError::parse_error(url, format!("Invalid JSON payload: {e}")))
}

fn check_status(url: &str, response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn map_request_error(url: &str, err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::timeout(url)
    } else {
        SourceError::request(url, err.without_url().to_string())
    }
}
