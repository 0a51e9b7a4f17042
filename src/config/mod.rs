//! Startup configuration for the proxy
//!
//! The configuration is a small YAML document read once when the process starts:
//!
//! ```yaml
//! port: 8000
//! repos:
//!   - tacogips/gitcodes-mcp
//!   - rust-lang/rust
//! # optional, defaults to the public GitHub code search endpoint
//! api_url: https://api.github.com/search/code
//! ```
//!
//! Any problem found here is fatal: the server never starts with a configuration
//! that has no repositories to search.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

/// Port used when the configuration omits `port` or sets it to zero
pub const DEFAULT_PORT: u16 = 8000;

/// GitHub code search endpoint used when `api_url` is not configured
pub const DEFAULT_API_URL: &str = "https://api.github.com/search/code";

/// Errors raised while loading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(
        "no git repos were configured in the yaml config file, at least one repo must be listed for the service to query"
    )]
    NoRepositories,

    #[error("repository '{0}' is not of the form owner/name")]
    InvalidRepository(String),

    #[error("invalid api_url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Raw shape of the YAML document before validation
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    port: u16,
    #[serde(default)]
    repos: Vec<String>,
    #[serde(default)]
    api_url: Option<String>,
}

/// Ordered, non-empty list of `owner/name` repositories the proxy may search
///
/// The list can only be constructed through [`RepositoryAllowList::new`], which
/// rejects an empty list and malformed entries. Request handling relies on that
/// and never re-checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryAllowList(Vec<String>);

impl RepositoryAllowList {
    pub fn new(repos: Vec<String>) -> Result<Self, ConfigError> {
        if repos.is_empty() {
            return Err(ConfigError::NoRepositories);
        }

        for repo in &repos {
            let valid = match repo.split_once('/') {
                Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
                None => false,
            };
            if !valid {
                return Err(ConfigError::InvalidRepository(repo.clone()));
            }
        }

        Ok(Self(repos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list holds no repositories
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated proxy configuration
///
/// Built once at startup and shared read-only with every request handler.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Repositories searches are scoped to
    pub repos: RepositoryAllowList,
    /// Upstream code search endpoint
    pub api_url: Url,
}

impl ProxyConfig {
    /// Reads and validates the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&yaml)
    }

    /// Parses and validates a configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map
        let raw: RawConfig = if yaml.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        let port = if raw.port == 0 {
            tracing::info!(
                "no port specified in the yaml config file, defaulting to {}",
                DEFAULT_PORT
            );
            DEFAULT_PORT
        } else {
            raw.port
        };

        let repos = RepositoryAllowList::new(raw.repos)?;

        let api_url = raw.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(api_url).map_err(|source| ConfigError::InvalidApiUrl {
            url: api_url.to_string(),
            source,
        })?;

        Ok(Self {
            port,
            repos,
            api_url,
        })
    }
}
