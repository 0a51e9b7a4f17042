use url::{Url, form_urlencoded};

use super::SearchError;
use crate::config::RepositoryAllowList;

/// Maximum length of the encoded query string accepted by GitHub code search
pub const MAX_QUERY_LENGTH: usize = 256;

/// A client search request after parameter extraction
///
/// `owner` is empty when no `user` filter was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text search term, never empty
    pub search_term: String,
    /// Repository owner to restrict the search to
    pub owner: String,
}

impl SearchRequest {
    pub fn new(search_term: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            owner: owner.into(),
        }
    }
}

/// Returns true if `repo` belongs to `owner`
///
/// The owner must be followed by the `/` separator, so `bja` matches `bja/x`
/// but not `bjatkin/x`. An empty owner matches every repository.
pub fn owner_matches(repo: &str, owner: &str) -> bool {
    match repo.strip_prefix(owner) {
        Some(rest) => owner.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Builds the encoded `q=...` query string for a code search
///
/// Every allow-listed repository belonging to `owner` is added as a
/// `repo:owner/name` qualifier after the free-text term, and the whole clause is
/// form-urlencoded into a single `q` parameter.
///
/// # Errors
///
/// - [`SearchError::NoMatchingRepositories`] if no repository matches `owner`
/// - [`SearchError::QueryTooLong`] if the encoded query exceeds [`MAX_QUERY_LENGTH`]
///
/// # Examples
///
/// ```
/// use gitsearch_proxy::config::RepositoryAllowList;
/// use gitsearch_proxy::gitsearch::build_query;
///
/// let repos = RepositoryAllowList::new(vec!["bja/x".to_string(), "bjatkin/y".to_string()]).unwrap();
/// let query = build_query("fn main", "bja", &repos).unwrap();
/// assert_eq!(query, "q=fn+main+repo%3Abja%2Fx");
/// ```
pub fn build_query(
    search_term: &str,
    owner: &str,
    allow_list: &RepositoryAllowList,
) -> Result<String, SearchError> {
    let mut clauses = vec![search_term.to_string()];
    clauses.extend(
        allow_list
            .iter()
            .filter(|repo| owner_matches(repo, owner))
            .map(|repo| format!("repo:{}", repo)),
    );

    // The allow-list is never empty, so no match means the owner filter excluded everything
    if clauses.len() == 1 {
        return Err(SearchError::NoMatchingRepositories {
            owner: owner.to_string(),
        });
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &clauses.join(" "))
        .finish();

    if query.len() > MAX_QUERY_LENGTH {
        return Err(SearchError::QueryTooLong {
            limit: MAX_QUERY_LENGTH,
            length: query.len(),
            query,
        });
    }

    Ok(query)
}

/// Builds the full upstream URL for `request` against `api_url`
///
/// Any query already present on `api_url` is replaced.
pub fn build_search_url(
    api_url: &Url,
    request: &SearchRequest,
    allow_list: &RepositoryAllowList,
) -> Result<Url, SearchError> {
    let query = build_query(&request.search_term, &request.owner, allow_list)?;

    let mut url = api_url.clone();
    url.set_query(Some(&query));

    tracing::debug!("Constructed code search URL: {}", url);

    Ok(url)
}
