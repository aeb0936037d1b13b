//! Environment variable overrides.
//!
//! `RUNLENS_*` variables override file values so one-off invocations can
//! point at another backend without editing config.

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_BASE_URL: &str = "RUNLENS_BASE_URL";
pub(super) const ENV_MODEL: &str = "RUNLENS_MODEL";
pub(super) const ENV_TIMEOUT_SECS: &str = "RUNLENS_TIMEOUT_SECS";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_blank(env_lookup, ENV_BASE_URL) {
        config.backend.base_url = url;
    }
    if let Some(model) = non_blank(env_lookup, ENV_MODEL) {
        config.playground.model = Some(model);
    }
    if let Some(timeout) = non_blank(env_lookup, ENV_TIMEOUT_SECS) {
        // Clamp to at least 1 second to avoid "no-timeout" accidental behavior.
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_TIMEOUT_SECS} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        config.backend.timeout_secs = parsed.max(1);
    }
    Ok(())
}

fn non_blank<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
