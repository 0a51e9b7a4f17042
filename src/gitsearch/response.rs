use serde::{Deserialize, Serialize};

use super::SearchError;

/// GitHub code search response envelope
///
/// Only the fields the proxy forwards are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Default, Deserialize)]
struct GitHubCodeSearchResponse {
    /// Top-level message GitHub sends alongside error statuses
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<GitHubApiError>>,
    #[serde(default)]
    items: Option<Vec<GitHubCodeItem>>,
}

#[derive(Debug, Deserialize)]
struct GitHubApiError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubCodeItem {
    #[serde(default)]
    html_url: Option<String>,
    /// API URL of the file, used only when `html_url` is missing
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    repository: Option<GitHubCodeRepository>,
}

#[derive(Debug, Default, Deserialize)]
struct GitHubCodeRepository {
    #[serde(default)]
    full_name: Option<String>,
}

/// A single file matched by a code search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Browser URL of the matching file
    #[serde(rename = "FileURL")]
    pub file_url: String,
    /// Repository the file belongs to, as `owner/name`
    #[serde(rename = "Repo")]
    pub repository: String,
}

/// Normalized code search response returned to clients
///
/// # Format
///
/// ```json
/// {"Results": [{"FileURL": "https://github.com/o/r/blob/main/src/lib.rs", "Repo": "o/r"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matches in the order GitHub returned them
    #[serde(rename = "Results")]
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn add_result(&mut self, result: SearchResult) {
        self.results.push(result);
    }
}

/// Translation outcome that keeps the upstream `message` for status handling
#[derive(Debug)]
pub(crate) struct TranslatedResponse {
    pub response: SearchResponse,
    pub message: Option<String>,
}

/// Translates a raw GitHub code search body into a [`SearchResponse`]
///
/// # Errors
///
/// - [`SearchError::Decode`] if the body is not a JSON object of the expected shape
/// - [`SearchError::UpstreamReported`] if the body carries a non-empty `errors`
///   array, regardless of any `items`
pub fn translate(raw_body: &str) -> Result<SearchResponse, SearchError> {
    translate_envelope(raw_body).map(|translated| translated.response)
}

pub(crate) fn translate_envelope(raw_body: &str) -> Result<TranslatedResponse, SearchError> {
    let value: serde_json::Value = serde_json::from_str(raw_body)?;
    // Arrays would otherwise decode into an all-default envelope
    if !value.is_object() {
        return Err(SearchError::Decode(serde::de::Error::custom(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        ))));
    }
    let envelope: GitHubCodeSearchResponse = serde_json::from_value(value)?;

    let errors = envelope.errors.unwrap_or_default();
    if !errors.is_empty() {
        let messages = errors
            .iter()
            .map(|e| e.message.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SearchError::UpstreamReported(messages));
    }

    let items = envelope.items.unwrap_or_default();
    let mut response = SearchResponse {
        results: Vec::with_capacity(items.len()),
    };
    for item in items {
        response.add_result(SearchResult {
            file_url: item.html_url.or(item.url).unwrap_or_default(),
            repository: item
                .repository
                .and_then(|repository| repository.full_name)
                .unwrap_or_default(),
        });
    }

    Ok(TranslatedResponse {
        response,
        message: envelope.message,
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
