//! Settings configuration
//!
//! TOML-based settings for upssh, with environment overrides on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::engine::SelectionMode;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where host names come from
    pub source: SourceSettings,

    /// Remote shell, copy and multiplexer programs
    pub ssh: SshSettings,

    /// UI settings
    pub ui: UiSettings,
}

/// Which host source to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Uptime inventory HTTP API
    #[default]
    Uptime,
    /// Directory of configuration-management node files
    Nodes,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Uptime => write!(f, "uptime"),
            SourceKind::Nodes => write!(f, "nodes"),
        }
    }
}

/// Host source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Base address of the inventory API
    pub addr: Option<String>,
    /// API secret appended to search requests
    pub key: Option<String>,
    /// Node directory for the `nodes` source
    pub node_dir: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Uptime,
            addr: None,
            key: None,
            node_dir: Some("~/chef-repo/nodes".to_string()),
            timeout_secs: 10,
        }
    }
}

/// Session launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    /// Remote username, falls back to `$USER`
    pub user: Option<String>,
    pub ssh_program: String,
    /// Extra arguments placed before the target
    pub ssh_args: Vec<String>,
    /// Program that opens one pane per host
    pub multiplexer: String,
    pub multiplexer_args: Vec<String>,
    pub copy_program: String,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: None,
            ssh_program: "ssh".to_string(),
            ssh_args: Vec::new(),
            multiplexer: "cssh".to_string(),
            multiplexer_args: Vec::new(),
            copy_program: "scp".to_string(),
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Theme name
    pub theme: String,
    /// Fixed number of host rows; follows the terminal height when unset
    pub rows: Option<usize>,
    /// Sort host names before display
    pub sort_hosts: bool,
    pub selection: SelectionMode,
    /// Ask before connecting
    pub confirm: bool,
    /// How long status messages stay up
    pub status_timeout_ms: u64,
    /// Redraw interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            rows: None,
            sort_hosts: true,
            selection: SelectionMode::Index,
            confirm: false,
            status_timeout_ms: 3000,
            tick_rate_ms: 250,
        }
    }
}

impl Settings {
    /// Load settings from file
    pub fn load(custom_path: Option<&str>) -> Result<Self> {
        let path = if let Some(p) = custom_path {
            PathBuf::from(shellexpand::tilde(p).as_ref())
        } else {
            Self::default_config_path()
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .context(format!("Failed to read config file: {:?}", path))?;
            let settings: Settings =
                toml::from_str(&content).context("Failed to parse config file")?;
            debug!(?path, "loaded settings");
            Ok(settings)
        } else {
            // Return defaults if no config exists
            Ok(Self::default())
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("upssh").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/upssh/config.toml"))
    }

    /// Apply `UPTIME_*` and `UPSSH_*` variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(addr) = lookup("UPTIME_ADDR") {
            self.source.addr = Some(addr);
        }
        if let Some(key) = lookup("UPTIME_KEY") {
            self.source.key = Some(key);
        }
        if let Some(user) = lookup("UPTIME_USER") {
            self.ssh.user = Some(user);
        }
        if let Some(theme) = lookup("UPSSH_THEME") {
            self.ui.theme = theme;
        }
        if let Some(rows) = lookup("UPSSH_ROWS") {
            match rows.parse::<usize>() {
                Ok(rows) if rows > 0 => self.ui.rows = Some(rows),
                _ => warn!(%rows, "ignoring invalid UPSSH_ROWS"),
            }
        }
        if self.ssh.user.is_none() {
            self.ssh.user = lookup("USER");
        }
    }

    /// Remote username, if any source provided one
    pub fn user(&self) -> Option<&str> {
        self.ssh.user.as_deref()
    }

    /// Save settings to file
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(p).as_ref())
        } else {
            Self::default_config_path()
        };

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Generate default config file
    pub fn generate_default_config() -> String {
        let settings = Self::default();
        toml::to_string_pretty(&settings).unwrap_or_default()
    }
}
