//! Error types for the backend client and configuration loader.
//!
//! The console never shows raw transport errors to the operator directly.
//! Fetchers classify every [`ApiError`] into a [`FailureKind`] so views can
//! tell "the backend is unreachable" apart from "the backend answered with
//! something we could not read".

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the backend.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
    /// A 2xx response whose body does not match the expected shape.
    InvalidResponse(String),
    /// The request URL could not be built from the configured base URL.
    InvalidUrl(String),
}

impl ApiError {
    /// Build a status error from response parts.
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(_) | Self::InvalidResponse(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Server-provided `Retry-After` hint in seconds.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            Self::Http(_) | Self::InvalidResponse(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Classify this error for operator-facing state.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Http(inner) if inner.is_decode() => FailureKind::MalformedResponse,
            Self::Http(_) | Self::Status { .. } | Self::InvalidUrl(_) => {
                FailureKind::NetworkUnavailable
            }
            Self::InvalidResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "status {code}")
                } else {
                    write!(f, "status {code}: {body}")
                }
            }
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Failure taxonomy
// ---------------------------------------------------------------------------

/// Why a fetch did not produce data.
///
/// "No data yet" is deliberately not a variant: an empty result is a valid
/// state and lives in [`crate::state::Loadable::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request could not be sent or completed.
    NetworkUnavailable,
    /// A response arrived but could not be parsed into the expected shape.
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(f, "backend unavailable"),
            Self::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// Displayable failure carried by `Unavailable` load states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&ApiError> for FetchFailure {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.failure_kind(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for FetchFailure {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
