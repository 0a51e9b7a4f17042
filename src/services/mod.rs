use crate::config::RepositoryAllowList;
use crate::gitsearch::{
    CodeSearchClient, SearchError, SearchRequest, SearchResponse, build_search_url,
    translate_envelope,
};

/// Runs a code search restricted to the allow-listed repositories
///
/// This pure function handles the entire search:
/// 1. Builds the upstream URL from the request and the allow-list
/// 2. Sends it to GitHub through the provided client
/// 3. Translates the GitHub payload into a [`SearchResponse`]
///
/// All dependencies are passed explicitly, so the HTTP handler and the CLI share
/// it and tests can point the client at a mock server.
///
/// # Errors
///
/// This function returns an error if:
/// - No allow-listed repository matches the owner filter, or the query is too
///   long (no request is sent in either case)
/// - The request to GitHub fails
/// - GitHub reports errors in the body, or the body cannot be decoded
/// - GitHub answers with a non-success status without an `errors` array
pub async fn perform_code_search(
    client: &CodeSearchClient,
    allow_list: &RepositoryAllowList,
    request: &SearchRequest,
) -> Result<SearchResponse, SearchError> {
    let url = build_search_url(client.api_url(), request, allow_list)?;

    let upstream = client.fetch(url).await?;

    // The errors array carries the most specific message, so it is checked before the status
    let translated = match translate_envelope(&upstream.body) {
        Err(SearchError::Decode(_)) if !upstream.is_success() => {
            return Err(SearchError::UpstreamStatus {
                status: upstream.status,
                message: upstream.body.trim().to_string(),
            });
        }
        other => other?,
    };

    if !upstream.is_success() {
        return Err(SearchError::UpstreamStatus {
            status: upstream.status,
            message: translated
                .message
                .unwrap_or_else(|| "no message in response".to_string()),
        });
    }

    tracing::debug!(
        "Code search for '{}' returned {} results",
        request.search_term,
        translated.response.results.len()
    );

    Ok(translated.response)
}
