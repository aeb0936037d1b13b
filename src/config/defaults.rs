//! Default configuration constants.

/// Base URL of a locally running backend, including its API prefix.
pub(super) const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Default timeout for backend requests. Chat turns run the whole agent loop
/// server-side, so this is generous.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Assistant line seeded into a fresh playground transcript.
pub(super) const DEFAULT_GREETING: &str = "Ready. Type a message, or /help for commands.";
/// Local config file name, also used under the global config root.
pub(super) const CONFIG_FILE_NAME: &str = "runlens.toml";
/// Directory under the global config root.
pub(super) const CONFIG_DIR_NAME: &str = "runlens";
