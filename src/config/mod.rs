//! Configuration module
//!
//! Handles loading the settings file and environment overrides.

pub mod settings;

pub use settings::{Settings, SourceKind};
