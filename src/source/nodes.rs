//! Configuration-management node directory
//!
//! Reads one JSON document per node (the layout of a chef-repo `nodes/`
//! directory) and applies `hostname:*query*` / `role:*value*` style matching.

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{FetchError, HostQuery};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeFile {
    name: String,
    run_list: Vec<String>,
    automatic: AutomaticAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AutomaticAttributes {
    fqdn: Option<String>,
    hostname: Option<String>,
    roles: Vec<String>,
}

/// A node as far as host selection cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Name used to connect
    pub fqdn: String,
    /// Name matched against the query
    pub hostname: String,
    pub roles: Vec<String>,
}

impl Node {
    fn from_file(file: NodeFile) -> Self {
        let fqdn = file
            .automatic
            .fqdn
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| file.name.clone());
        let hostname = file
            .automatic
            .hostname
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| file.name.clone());

        let mut roles = file.automatic.roles;
        for entry in &file.run_list {
            if let Some(role) = entry
                .strip_prefix("role[")
                .and_then(|r| r.strip_suffix(']'))
            {
                if !roles.iter().any(|r| r == role) {
                    roles.push(role.to_string());
                }
            }
        }

        Self {
            fqdn,
            hostname,
            roles,
        }
    }
}

/// Compile a search term into a `*term*` match.
///
/// `*` and `?` inside the term keep their wildcard meaning; everything else
/// is literal.
pub fn wildcard(term: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("(?i)^.*");
    let mut literal = String::new();
    for c in term.chars() {
        match c {
            '*' | '?' => {
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                pattern.push_str(if c == '*' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }
    pattern.push_str(&regex::escape(&literal));
    pattern.push_str(".*$");
    Regex::new(&pattern)
}

/// Directory of node JSON files
#[derive(Debug, Clone)]
pub struct NodeDirectory {
    path: PathBuf,
}

impl NodeDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every `*.json` node, ordered by file name
    pub async fn load(&self) -> Result<Vec<Node>, FetchError> {
        let io_err = |source| FetchError::Io {
            path: self.path.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.path).await.map_err(io_err)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut nodes = Vec::with_capacity(files.len());
        for path in files {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?;
            let file: NodeFile = serde_json::from_str(&content)
                .map_err(|source| FetchError::Node { path: path.clone(), source })?;
            if file.name.is_empty() && file.automatic.fqdn.is_none() {
                debug!(?path, "skipping node without a name");
                continue;
            }
            nodes.push(Node::from_file(file));
        }

        debug!(path = ?self.path, count = nodes.len(), "loaded node directory");
        Ok(nodes)
    }

    /// Names of nodes matching `hostname:*query*` and, if given, `role:*role*`
    pub async fn search(&self, query: &HostQuery) -> Result<Vec<String>, FetchError> {
        let hostname = wildcard(&query.query)?;
        let role = query.role.as_deref().map(wildcard).transpose()?;

        let hosts = self
            .load()
            .await?
            .into_iter()
            .filter(|node| hostname.is_match(&node.hostname))
            .filter(|node| match &role {
                Some(role) => node.roles.iter().any(|r| role.is_match(r)),
                None => true,
            })
            .map(|node| node.fqdn)
            .collect();

        Ok(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_node(dir: &Path, file: &str, body: &str) {
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn test_wildcard_matches_substring() {
        let re = wildcard("web").unwrap();
        assert!(re.is_match("web1"));
        assert!(re.is_match("prod-web-02"));
        assert!(re.is_match("WEB3"));
        assert!(!re.is_match("db1"));
    }

    #[test]
    fn test_wildcard_keeps_wildcards_and_escapes_the_rest() {
        let re = wildcard("web?.prod").unwrap();
        assert!(re.is_match("web1.prod"));
        assert!(!re.is_match("web1xprod"));

        let re = wildcard("a*z").unwrap();
        assert!(re.is_match("abcz"));
        assert!(!re.is_match("zebra"));
    }

    #[test]
    fn test_empty_wildcard_matches_everything() {
        let re = wildcard("").unwrap();
        assert!(re.is_match(""));
        assert!(re.is_match("anything"));
    }

    #[test]
    fn test_node_from_file_prefers_automatic_attributes() {
        let file: NodeFile = serde_json::from_str(
            r#"{
                "name": "web1",
                "run_list": ["recipe[base]", "role[frontend]", "role[web]"],
                "automatic": {"fqdn": "web1.example.com", "hostname": "web1", "roles": ["web"]}
            }"#,
        )
        .unwrap();
        let node = Node::from_file(file);
        assert_eq!(node.fqdn, "web1.example.com");
        assert_eq!(node.hostname, "web1");
        assert_eq!(node.roles, vec!["web", "frontend"]);
    }

    #[tokio::test]
    async fn test_search_by_hostname_and_role() {
        let dir = tempdir().unwrap();
        write_node(
            dir.path(),
            "web1.json",
            r#"{"name": "web1", "run_list": ["role[frontend]"], "automatic": {"fqdn": "web1.example.com"}}"#,
        );
        write_node(
            dir.path(),
            "web2.json",
            r#"{"name": "web2", "run_list": ["role[backend]"], "automatic": {"fqdn": "web2.example.com"}}"#,
        );
        write_node(
            dir.path(),
            "db1.json",
            r#"{"name": "db1", "run_list": ["role[database]"]}"#,
        );
        write_node(dir.path(), "README.md", "not a node");

        let nodes = NodeDirectory::new(dir.path());

        let all = nodes.search(&HostQuery::new("")).await.unwrap();
        assert_eq!(all, vec!["db1", "web1.example.com", "web2.example.com"]);

        let web = nodes.search(&HostQuery::new("web")).await.unwrap();
        assert_eq!(web, vec!["web1.example.com", "web2.example.com"]);

        let front = nodes
            .search(&HostQuery::new("web").with_role("front"))
            .await
            .unwrap();
        assert_eq!(front, vec!["web1.example.com"]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let nodes = NodeDirectory::new("/nonexistent/upssh/nodes");
        let err = nodes.search(&HostQuery::new("web")).await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_node_is_an_error() {
        let dir = tempdir().unwrap();
        write_node(dir.path(), "broken.json", "{ nope");
        let err = NodeDirectory::new(dir.path())
            .search(&HostQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Node { .. }));
    }
}
