//! End-to-end tests for the `/search` endpoint
//!
//! Each test starts the proxy router on an ephemeral port, backed by a mock
//! GitHub code search endpoint, and talks to it over real HTTP.

use std::sync::Arc;

use gitsearch_proxy::config::RepositoryAllowList;
use gitsearch_proxy::gitsearch::CodeSearchClient;
use gitsearch_proxy::transport::http_server::{AppState, router};
use mockito::Matcher;
use serde_json::Value;
use url::Url;

/// Starts the proxy against `api_url` and returns its base URL
async fn spawn_proxy(api_url: &str, repos: &[&str]) -> String {
    let repos = RepositoryAllowList::new(repos.iter().map(|r| r.to_string()).collect())
        .expect("valid allow-list");
    let client = CodeSearchClient::new(Url::parse(api_url).expect("valid url"));
    let state = Arc::new(AppState::new(repos, client));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("proxy server failed");
    });

    format!("http://{}", addr)
}

fn assert_json(response: &reqwest::Response) {
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "application/json");
}

#[tokio::test]
async fn test_missing_search_term_is_bad_request() {
    let server = mockito::Server::new_async().await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["a/b"]).await;

    for path in ["/search", "/search?q=", "/search?user=a"] {
        let response = reqwest::get(format!("{}{}", base, path)).await.unwrap();
        assert_eq!(response.status().as_u16(), 400, "path {}", path);
        assert_json(&response);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["Error"], Value::Bool(true));
        assert!(body["Message"].as_str().unwrap().contains("'q' parameter"));
    }
}

#[tokio::test]
async fn test_non_get_method_is_rejected() {
    let server = mockito::Server::new_async().await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["a/b"]).await;

    let response = reqwest::Client::new()
        .post(format!("{}/search?q=foo", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 405);
    assert_json(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["Error"], Value::Bool(true));
    assert!(body["Message"].as_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn test_unmatched_user_is_server_error_naming_owner() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/code")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["bja/x", "bjatkin/y"]).await;

    let response = reqwest::get(format!("{}/search?q=foo&user=octocat", base))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert_json(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["Error"], Value::Bool(true));
    assert!(body["Message"].as_str().unwrap().contains("octocat"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_successful_search_returns_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/code")
        .match_query(Matcher::UrlEncoded("q".into(), "fn main repo:bja/x".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"total_count":1,"items":[{"html_url":"https://github.com/bja/x/blob/main/a.rs","repository":{"full_name":"bja/x"}}]}"#,
        )
        .create_async()
        .await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["bja/x", "bjatkin/y"]).await;

    let response = reqwest::get(format!("{}/search?q=fn+main&user=bja", base))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_json(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "Results": [
                {"FileURL": "https://github.com/bja/x/blob/main/a.rs", "Repo": "bja/x"}
            ]
        })
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_errors_are_wrapped() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/code")
        .match_query(Matcher::Any)
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Validation Failed","errors":[{"message":"bad qualifier"}]}"#)
        .create_async()
        .await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["a/b"]).await;

    let response = reqwest::get(format!("{}/search?q=foo", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    let message = body["Message"].as_str().unwrap();
    assert!(message.starts_with("search query could not be completed"));
    assert!(message.contains("bad qualifier"));
}

#[tokio::test]
async fn test_empty_upstream_result_is_empty_list() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/code")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"total_count":0,"incomplete_results":false,"items":[]}"#)
        .create_async()
        .await;
    let base = spawn_proxy(&format!("{}/search/code", server.url()), &["a/b"]).await;

    let response = reqwest::get(format!("{}/search?q=foo", base)).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"Results": []}));
}
