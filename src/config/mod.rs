//! Configuration loading from TOML files and environment variables.
//!
//! Config is resolved in this order of precedence (highest wins):
//! 1. CLI flags (`--base-url`, `--model`, `--no-color`)
//! 2. Environment variables (`RUNLENS_BASE_URL`, `RUNLENS_MODEL`,
//!    `RUNLENS_TIMEOUT_SECS`)
//! 3. TOML file given via `--config`
//! 4. `./runlens.toml` in the current directory
//! 5. `$XDG_CONFIG_HOME/runlens/runlens.toml` (or `~/.config/runlens/runlens.toml`)
//! 6. Built-in defaults

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use loader::{load_config, validate};
pub use types::{BackendConfig, Config, DisplayConfig, LoadedConfig, PlaygroundConfig};

use crate::error::ConfigError;

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub no_color: bool,
}

/// Apply CLI flags on top of a loaded config and re-validate.
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(url) = &overrides.base_url {
        config.backend.base_url = url.trim().to_string();
    }
    if let Some(model) = &overrides.model {
        config.playground.model = Some(model.trim().to_string());
    }
    if overrides.no_color {
        config.display.color = false;
    }
    validate(config)
}
