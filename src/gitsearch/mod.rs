//! GitHub code search scoped to an allow-list of repositories
//!
//! This module holds the three stages of a proxied search:
//! - [`build_query`] / [`build_search_url`]: turn a term and an owner filter into
//!   a bounded-length GitHub query
//! - [`CodeSearchClient`]: send the query to the code search endpoint
//! - [`translate`]: reshape the GitHub payload into a [`SearchResponse`]
//!
//! The stages are composed by [`crate::services::perform_code_search`].

mod client;
mod error;
mod query;
mod response;

pub use client::{CodeSearchClient, UpstreamResponse};
pub use error::SearchError;
pub use query::{MAX_QUERY_LENGTH, SearchRequest, build_query, build_search_url, owner_matches};
pub use response::{SearchResponse, SearchResult, translate};

pub(crate) use response::translate_envelope;
