//! Uptime inventory API client

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FetchError, HostQuery};

/// Search response body
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    fqdn: String,
}

/// Escape a raw query for the search path.
///
/// The API decodes the path once, so a literal `%` has to travel as `%25`.
pub fn escape_query(query: &str) -> String {
    query.replace('%', "%25")
}

/// `<base>/servers/search/<query>/<key>`
pub fn search_url(base: &str, query: &str, key: &str) -> String {
    format!(
        "{}/servers/search/{}/{}",
        base.trim_end_matches('/'),
        escape_query(query),
        key
    )
}

/// Extract host names from a search response body
pub fn parse_response(body: &str) -> Result<Vec<String>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(FetchError::Payload)?;
    if !response.message.is_empty() {
        debug!(message = %response.message, "inventory message");
    }
    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.fqdn)
        .collect())
}

/// HTTP client for the uptime inventory
#[derive(Debug, Clone)]
pub struct UptimeClient {
    base: String,
    key: String,
    client: reqwest::Client,
}

impl UptimeClient {
    pub fn new(base: &str, key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: base.to_string(),
            key: key.to_string(),
            client,
        })
    }

    /// Run a search; the API has no notion of roles, so a role filter is ignored
    pub async fn search(&self, query: &HostQuery) -> Result<Vec<String>, FetchError> {
        if let Some(ref role) = query.role {
            warn!(%role, "uptime source does not support role filters, ignoring");
        }

        let url = search_url(&self.base, &query.query, &self.key);
        debug!(base = %self.base, query = %query.query, "searching inventory");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let hosts = parse_response(&body)?;
        debug!(count = hosts.len(), "inventory search finished");
        Ok(hosts)
    }
}
