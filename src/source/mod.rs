//! Host sources
//!
//! Resolve a search query (and optional role) into a flat list of host names,
//! either from the uptime inventory API or from a directory of
//! configuration-management node files.

pub mod nodes;
pub mod uptime;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Settings, SourceKind};

pub use nodes::NodeDirectory;
pub use uptime::UptimeClient;

/// Failures while fetching hosts. All of them are fatal to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} is not configured (set it in the config file or environment)")]
    NotConfigured(&'static str),

    #[error("request to inventory failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inventory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed inventory response: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed node file {path:?}: {source}")]
    Node {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// What to search for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostQuery {
    pub query: String,
    pub role: Option<String>,
}

impl HostQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A configured host source
#[derive(Debug, Clone)]
pub enum HostSource {
    Uptime(UptimeClient),
    Nodes(NodeDirectory),
}

impl HostSource {
    /// Build the source selected in the settings
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        match settings.source.kind {
            SourceKind::Uptime => {
                let addr = settings
                    .source
                    .addr
                    .as_deref()
                    .ok_or(FetchError::NotConfigured("UPTIME_ADDR"))?;
                let key = settings
                    .source
                    .key
                    .as_deref()
                    .ok_or(FetchError::NotConfigured("UPTIME_KEY"))?;
                let timeout = Duration::from_secs(settings.source.timeout_secs);
                Ok(HostSource::Uptime(UptimeClient::new(addr, key, timeout)?))
            }
            SourceKind::Nodes => {
                let dir = settings
                    .source
                    .node_dir
                    .as_deref()
                    .ok_or(FetchError::NotConfigured("source.node_dir"))?;
                let dir = PathBuf::from(shellexpand::tilde(dir).as_ref());
                Ok(HostSource::Nodes(NodeDirectory::new(dir)))
            }
        }
    }

    /// Fetch host names matching `query`
    pub async fn fetch(&self, query: &HostQuery) -> Result<Vec<String>, FetchError> {
        match self {
            HostSource::Uptime(client) => client.search(query).await,
            HostSource::Nodes(dir) => dir.search(query).await,
        }
    }
}

/// Fetch hosts, optionally sorted for display
pub async fn fetch_hosts(
    source: &HostSource,
    query: &HostQuery,
    sort: bool,
) -> Result<Vec<String>, FetchError> {
    let mut hosts = source.fetch(query).await?;
    if sort {
        hosts.sort();
    }
    Ok(hosts)
}
