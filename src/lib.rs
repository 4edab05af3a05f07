//! upssh - pick hosts from an inventory and connect to them
//!
//! This library provides the host sources, the interactive selection engine,
//! its terminal front end, and the session launcher.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod launch;
pub mod source;
pub mod status;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use config::{Settings, SourceKind};
pub use engine::{Engine, EngineOptions, InputEvent, Mode, SelectionMode, Step, View};
pub use launch::{LaunchError, Launcher};
pub use source::{fetch_hosts, FetchError, HostQuery, HostSource};
