//! upssh - search an inventory for hosts and ssh into them
//!
//! Fetches matching host names, lets the operator pick one or more in a
//! terminal list, then opens a shell, copies a file, or starts a
//! multiplexed session.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upssh::config::{Settings, SourceKind};
use upssh::engine::SelectionMode;
use upssh::source::{fetch_hosts, HostQuery, HostSource};
use upssh::{App, Launcher};

/// Pick hosts from an inventory and connect to them
#[derive(Parser, Debug)]
#[command(name = "upssh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Search string sent to the host source
    pub query: Option<String>,

    /// Only hosts with a matching role (node source)
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Copy FILE to the chosen host instead of opening a shell
    #[arg(long, value_name = "FILE")]
    pub scp: Option<String>,

    /// Host source to query
    #[arg(short, long, value_enum)]
    pub source: Option<SourceArg>,

    /// Number of host rows to show (default: fit the terminal)
    #[arg(long, value_name = "N")]
    pub rows: Option<usize>,

    /// Color theme (dark, light)
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Mark hosts with space instead of typing row numbers
    #[arg(short, long)]
    pub toggle: bool,

    /// Ask before connecting
    #[arg(long)]
    pub confirm: bool,

    /// Print the chosen hosts instead of connecting
    #[arg(short, long)]
    pub print: bool,

    /// Custom config file path
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum SourceArg {
    Uptime,
    Nodes,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Uptime => SourceKind::Uptime,
            SourceArg::Nodes => SourceKind::Nodes,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print matching hosts without the picker
    List {
        /// Search string
        query: Option<String>,

        /// Only hosts with a matching role
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Print the default configuration file
    Config,
}

impl Cli {
    /// Command-line flags win over the file and the environment
    fn apply(&self, settings: &mut Settings) {
        if let Some(source) = self.source {
            settings.source.kind = source.into();
        }
        if let Some(rows) = self.rows.filter(|&rows| rows > 0) {
            settings.ui.rows = Some(rows);
        }
        if let Some(ref theme) = self.theme {
            settings.ui.theme = theme.clone();
        }
        if self.toggle {
            settings.ui.selection = SelectionMode::Toggle;
        }
        if self.confirm {
            settings.ui.confirm = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        init_logging()?;
    }

    // Load configuration
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env();
    cli.apply(&mut settings);

    match cli.command {
        Some(Commands::List {
            ref query,
            ref role,
        }) => cmd_list(&settings, query.as_deref(), role.as_deref()).await,
        Some(Commands::Config) => {
            print!("{}", Settings::generate_default_config());
            Ok(())
        }
        None => run_picker(&settings, &cli).await,
    }
}

/// Log to a file; the terminal belongs to the picker
fn init_logging() -> Result<()> {
    let dir = dirs::cache_dir()
        .map(|d| d.join("upssh"))
        .context("No cache directory for the debug log")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("upssh=debug"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn build_query(query: Option<&str>, role: Option<&str>) -> HostQuery {
    let query = HostQuery::new(query.unwrap_or_default());
    match role {
        Some(role) => query.with_role(role),
        None => query,
    }
}

async fn load_hosts(settings: &Settings, query: &HostQuery) -> Result<Vec<String>> {
    let source = HostSource::from_settings(settings)?;
    let hosts = fetch_hosts(&source, query, settings.ui.sort_hosts)
        .await
        .with_context(|| format!("Failed to fetch hosts from the {} source", settings.source.kind))?;
    info!(count = hosts.len(), "fetched hosts");
    Ok(hosts)
}

/// Interactive pick, then connect
async fn run_picker(settings: &Settings, cli: &Cli) -> Result<()> {
    let query = build_query(cli.query.as_deref(), cli.role.as_deref());
    let hosts = load_hosts(settings, &query).await?;
    if hosts.is_empty() {
        bail!("No hosts match '{}'", query.query);
    }

    // Fail before the picker if there is nobody to log in as
    let launcher = if cli.print {
        None
    } else {
        Some(Launcher::from_settings(settings)?)
    };

    let mut app = App::new(hosts, settings);
    let targets = app.run().await?;

    match launcher {
        None => {
            for target in &targets {
                println!("{}", target);
            }
        }
        Some(launcher) => launcher.launch(&targets, cli.scp.as_deref()).await?,
    }

    Ok(())
}

/// List hosts without the picker
async fn cmd_list(settings: &Settings, query: Option<&str>, role: Option<&str>) -> Result<()> {
    let query = build_query(query, role);
    let hosts = load_hosts(settings, &query).await?;

    if hosts.is_empty() {
        println!("No hosts found.");
        return Ok(());
    }
    for (i, host) in hosts.iter().enumerate() {
        println!("[{}] {}", i + 1, host);
    }

    Ok(())
}
