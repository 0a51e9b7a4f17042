use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use url::form_urlencoded;

use crate::config::{ProxyConfig, RepositoryAllowList};
use crate::gitsearch::{CodeSearchClient, SearchError, SearchRequest, SearchResponse};
use crate::services;

/// State shared read-only by every request
pub struct AppState {
    pub repos: RepositoryAllowList,
    pub client: CodeSearchClient,
}

impl AppState {
    pub fn new(repos: RepositoryAllowList, client: CodeSearchClient) -> Self {
        Self { repos, client }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            config.repos.clone(),
            CodeSearchClient::new(config.api_url.clone()),
        )
    }
}

/// Body of every error response
///
/// `Error` is always true so clients can check a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: bool,
    #[serde(rename = "Message")]
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// Failures of the `/search` endpoint
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("incorrect request method {0}, only the GET method is allowed")]
    MethodNotAllowed(Method),

    #[error(
        "no search term was found, query string must have a 'q' parameter which must be at least 1 character long"
    )]
    MissingSearchTerm,

    #[error("search query could not be completed, {0}")]
    Search(#[from] SearchError),
}

impl ApiError {
    /// Filtering and query length failures are reported as server errors even
    /// though they come from client input; existing clients rely on the 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingSearchTerm => StatusCode::BAD_REQUEST,
            ApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Search request failed: {}", self);
        } else {
            tracing::warn!("Rejected search request: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Builds the router serving `/search`
///
/// The route accepts every method so that non-GET requests still receive the
/// JSON error body.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", any(search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Returns the first value of `name` in a raw query string, or an empty string
fn query_param(raw_query: Option<&str>, name: &str) -> String {
    raw_query
        .and_then(|query| {
            form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

async fn search(
    State(state): State<Arc<AppState>>,
    method: Method,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<SearchResponse>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed(method));
    }

    let search_term = query_param(raw_query.as_deref(), "q");
    if search_term.is_empty() {
        return Err(ApiError::MissingSearchTerm);
    }
    let owner = query_param(raw_query.as_deref(), "user");

    tracing::info!(query = %search_term, user = %owner, "Handling search request");

    let request = SearchRequest::new(search_term, owner);
    let response = services::perform_code_search(&state.client, &state.repos, &request).await?;

    Ok(Json(response))
}

/// HTTP server exposing the search proxy
pub struct SearchProxyApp {
    bind_addr: SocketAddr,
    state: Arc<AppState>,
}

impl SearchProxyApp {
    pub fn new(bind_addr: SocketAddr, state: AppState) -> Self {
        Self {
            bind_addr,
            state: Arc::new(state),
        }
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        tracing::info!("starting service on {}", listener.local_addr()?);

        // Wait for Ctrl+C signal to gracefully shutdown
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_takes_first_value() {
        assert_eq!(query_param(Some("q=a&q=b"), "q"), "a");
        assert_eq!(query_param(Some("q=fn+main%28%29"), "q"), "fn main()");
        assert_eq!(query_param(Some("user=bja"), "q"), "");
        assert_eq!(query_param(None, "q"), "");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MethodNotAllowed(Method::POST).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::MissingSearchTerm.status_code(),
            StatusCode::BAD_REQUEST
        );
        let filtered = ApiError::from(SearchError::NoMatchingRepositories {
            owner: "bja".to_string(),
        });
        assert_eq!(filtered.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            filtered.to_string(),
            "search query could not be completed, no repositories were found belonging to the user bja"
        );
    }

    #[test]
    fn test_error_response_shape() {
        assert_eq!(
            serde_json::to_string(&ErrorResponse::new("boom")).unwrap(),
            r#"{"Error":true,"Message":"boom"}"#
        );
    }
}
