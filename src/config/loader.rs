//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::apply_runtime_env_overrides;
use super::sources::{config_root_dir, read_config_text_with_sources};
use super::{Config, LoadedConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    tracing::debug!(source = ?source, base_url = %config.backend.base_url, "config loaded");

    Ok(LoadedConfig {
        config,
        source_path: source.path(),
    })
}

/// Reject settings the client cannot act on.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.backend.base_url.trim();
    let parsed = reqwest::Url::parse(base_url).map_err(|err| {
        ConfigError::Invalid(format!("backend.base_url `{base_url}` is not a URL: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "backend.base_url `{base_url}` must use http or https"
        )));
    }
    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "backend.timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
