/// Errors raised while building, sending or translating a code search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The owner filter matched none of the configured repositories
    #[error("no repositories were found belonging to the user {owner}")]
    NoMatchingRepositories { owner: String },

    /// The encoded query exceeds the GitHub search limit
    #[error("query must be {limit} characters or less, calculated query was {query} ({length} characters)")]
    QueryTooLong {
        limit: usize,
        length: usize,
        query: String,
    },

    /// Transport level failure talking to GitHub
    #[error("GitHub request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// GitHub answered with a non-success status and no error list
    #[error("GitHub API error {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// GitHub answered with a non-empty `errors` array
    #[error("there were one or more errors with the API request: {0}")]
    UpstreamReported(String),

    #[error("failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),
}
