//! GitSearch proxy library
//!
//! A small HTTP service that forwards code searches to the GitHub code search
//! API, restricted to a configured allow-list of repositories.
//!
//! ## Features
//!
//! - `GET /search?q=<term>&user=<owner>` searches every allow-listed repository,
//!   or only those belonging to `owner`
//! - Queries are bounded to GitHub's 256 character limit and are never truncated
//! - GitHub payloads are reshaped into `{"Results":[{"FileURL":..,"Repo":..}]}`
//! - Every failure is answered with `{"Error":true,"Message":..}`
//!
//! ## Configuration
//!
//! ```yaml
//! port: 8000
//! repos:
//!   - tacogips/gitcodes-mcp
//!   - rust-lang/rust
//! ```
//!
//! ## Limitations
//!
//! Requests to GitHub are unauthenticated, unpaginated and uncached. No timeout
//! is set on the outbound call beyond the HTTP client's defaults. There is no
//! explicit cancellation propagation, but when a client disconnects the server
//! drops its handler future, and the in-flight upstream request is dropped with
//! it instead of running to completion.
//!
//! ## Usage
//!
//! This library can be used in several ways:
//! - As an HTTP server (`gitsearch-proxy serve config.yaml`)
//! - As a one-shot CLI search (`gitsearch-proxy search "fn main" --user tacogips`)
//! - Directly as a Rust library through [`services::perform_code_search`]

pub mod config;
pub mod gitsearch;
pub mod services;
pub mod transport;
