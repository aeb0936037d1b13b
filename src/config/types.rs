//! Configuration data model.
//!
//! This module holds struct definitions plus default values. Source discovery
//! and precedence live in `sources`, `env` and `loader`.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{DEFAULT_BASE_URL, DEFAULT_GREETING, DEFAULT_TIMEOUT_SECS};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub playground: PlaygroundConfig,
    pub display: DisplayConfig,
}

/// Where and how to reach the agent backend.
///
/// Passed explicitly to the API client at construction; nothing reads the
/// base URL from process-wide state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Request target; every endpoint path is joined onto this.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Chat playground settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Model id to send with each turn. Falls back to the backend default.
    pub model: Option<String>,
    /// Start new sessions in auto tool mode instead of with no tools.
    pub auto_tools: bool,
    /// Assistant line seeded into a new transcript; empty disables it.
    pub greeting: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            model: None,
            auto_tools: false,
            greeting: DEFAULT_GREETING.into(),
        }
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Loaded config plus the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source_path: Option<PathBuf>,
}
