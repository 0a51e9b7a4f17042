use reqwest::Client;
use url::Url;

use super::SearchError;

const USER_AGENT: &str = "gitsearch-proxy/0.1.0 (https://github.com/tacogips/gitsearch-proxy)";

/// Raw answer from the code search endpoint
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin HTTP client for the GitHub code search endpoint
///
/// Requests are unauthenticated and use the platform default timeouts. There is
/// no retry; a failed request is reported to the caller as-is.
#[derive(Debug, Clone)]
pub struct CodeSearchClient {
    client: Client,
    api_url: Url,
}

impl CodeSearchClient {
    /// Creates a client for the search endpoint at `api_url`
    pub fn new(api_url: Url) -> Self {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(client: Client, api_url: Url) -> Self {
        Self { client, api_url }
    }

    /// The configured search endpoint, without any query
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Sends a GET to `url` and returns the status and body
    ///
    /// A non-success status is not an error at this level, because GitHub
    /// reports validation problems in the body of 4xx responses.
    pub async fn fetch(&self, url: Url) -> Result<UpstreamResponse, SearchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            tracing::warn!("GitHub code search answered with status {}", status);
        }

        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
