//! Wire model for the agent backend's JSON API.
//!
//! These types serialize/deserialize directly to/from the payloads served
//! under the configured base URL. Typed views over them (steps, runs) live in
//! `trace` and `runs`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Operator text for this turn.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Explicit tool ids. Absent means "let the backend choose".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

/// Response body from `POST /chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Final agent answer.
    pub response: String,
    /// Id of the run the backend created for this turn.
    pub run_id: String,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Lifecycle state of a run.
///
/// Parsed case-insensitively: the list endpoint capitalizes (`Completed`)
/// while the detail endpoint does not. Unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Other(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    /// True while the backend may still append steps.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One row of `GET /runs`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: RunStatus,
    /// Display timestamp, already formatted by the backend.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub user_query: String,
}

/// Filters accepted by `GET /runs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunQuery {
    /// Page size; the backend accepts 1..=100.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<RunStatus>,
}

impl RunQuery {
    /// Query-string pairs for the request, clamping `limit` into range.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.clamp(1, 100).to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// One raw trace record as stored by the backend.
///
/// `content` is left untyped: its shape depends on `kind` and upstream
/// producers disagree on nesting. `trace::step` owns the normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    #[serde(
        default,
        deserialize_with = "deserialize_loose_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(
        default,
        deserialize_with = "deserialize_loose_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_loose_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

/// Metadata labels: strings pass through, numbers are stringified, anything
/// else is dropped. Only `type` decides whether a record is a step.
fn deserialize_loose_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Integral orders only; `1.0` counts, `1.5` and `"1"` are dropped.
fn deserialize_loose_order<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Number(number) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    }))
}

impl RawStep {
    pub fn new(kind: impl Into<String>, content: Value) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            content,
            timestamp: None,
            order: None,
        }
    }
}

/// Body of `GET /runs/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunDetail {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub user_query: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_steps")]
    pub steps: Vec<RawStep>,
}

/// Keep every step record that parses and drop the rest.
fn deserialize_lenient_steps<'de, D>(deserializer: D) -> Result<Vec<RawStep>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = values.len();
    let steps: Vec<RawStep> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if steps.len() < total {
        tracing::debug!(
            dropped = total - steps.len(),
            "dropped unparseable step records"
        );
    }
    Ok(steps)
}

/// Body of `DELETE /runs/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteRunResponse {
    #[serde(default)]
    pub message: String,
}

/// Body of `GET /runs/stats/summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RunStats {
    pub total: u64,
    pub running: u64,
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
}

impl RunStats {
    /// Completed share of all runs in percent; zero when there are no runs.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tools and models
// ---------------------------------------------------------------------------

/// Capability the agent may invoke. Fetched, never mutated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "icon", default)]
    pub icon_ref: Option<String>,
    /// Parameter JSON schema. Only the detail endpoint includes it.
    #[serde(default)]
    pub schema: Option<Value>,
}

fn default_enabled() -> bool {
    true
}

/// Body of `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<String>,
    pub default: String,
}

impl ModelCatalog {
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}
