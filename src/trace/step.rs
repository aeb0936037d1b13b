//! Typed trace steps and raw-record normalization.
//!
//! Producers are inconsistent about nesting text payloads: some store the
//! whole step record as `content` (so the text sits at `content.content`),
//! others store the text directly. Both shapes must be accepted, so text
//! extraction goes through [`normalize_text`] rather than reading one path.

use crate::types::RawStep;
use serde_json::{json, Map, Value};

/// Closed set of step kinds the inspector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    UserRequest,
    AgentThought,
    ToolCall,
    ToolResult,
    AgentResponse,
}

impl StepKind {
    pub const ALL: [StepKind; 5] = [
        StepKind::UserRequest,
        StepKind::AgentThought,
        StepKind::ToolCall,
        StepKind::ToolResult,
        StepKind::AgentResponse,
    ];

    /// Resolve a wire tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
    }

    /// Wire tag used by the backend.
    pub fn tag(self) -> &'static str {
        match self {
            Self::UserRequest => "user-request",
            Self::AgentThought => "agent-thought",
            Self::ToolCall => "tool-call",
            Self::ToolResult => "tool-result",
            Self::AgentResponse => "agent-response",
        }
    }

    /// Heading shown above the step in the inspector.
    pub fn title(self) -> &'static str {
        match self {
            Self::UserRequest => "User Request",
            Self::AgentThought => "Thinking",
            Self::ToolCall => "Tool Call",
            Self::ToolResult => "Tool Output",
            Self::AgentResponse => "Final Response",
        }
    }
}

/// Kind-specific payload of a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    UserRequest { text: String },
    AgentThought { text: String },
    ToolCall { tool_name: String, params: Value },
    ToolResult { tool_name: String, result: String },
    AgentResponse { text: String },
}

/// One immutable entry of a run trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub body: StepBody,
}

impl Step {
    /// Build a step from a raw record, or `None` for an unrecognized kind.
    pub fn from_raw(raw: &RawStep) -> Option<Self> {
        let kind = StepKind::from_tag(&raw.kind)?;
        let content = &raw.content;
        let body = match kind {
            StepKind::UserRequest => StepBody::UserRequest {
                text: normalize_text(content),
            },
            StepKind::AgentThought => StepBody::AgentThought {
                text: normalize_text(content),
            },
            StepKind::AgentResponse => StepBody::AgentResponse {
                text: normalize_text(content),
            },
            StepKind::ToolCall => StepBody::ToolCall {
                tool_name: tool_name(content),
                params: match content.get("params") {
                    Some(Value::Null) | None => Value::Object(Map::new()),
                    Some(params) => params.clone(),
                },
            },
            StepKind::ToolResult => StepBody::ToolResult {
                tool_name: tool_name(content),
                result: content.get("result").map(value_text).unwrap_or_default(),
            },
        };
        Some(Self {
            id: raw.id.clone(),
            timestamp: raw.timestamp.clone(),
            body,
        })
    }

    pub fn kind(&self) -> StepKind {
        match &self.body {
            StepBody::UserRequest { .. } => StepKind::UserRequest,
            StepBody::AgentThought { .. } => StepKind::AgentThought,
            StepBody::ToolCall { .. } => StepKind::ToolCall,
            StepBody::ToolResult { .. } => StepKind::ToolResult,
            StepBody::AgentResponse { .. } => StepKind::AgentResponse,
        }
    }

    /// Free text for text-bearing kinds.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            StepBody::UserRequest { text }
            | StepBody::AgentThought { text }
            | StepBody::AgentResponse { text } => Some(text),
            StepBody::ToolCall { .. } | StepBody::ToolResult { .. } => None,
        }
    }

    /// Project back to the nested wire shape the backend records.
    ///
    /// `Step::from_raw(&step.to_raw())` reproduces `step` exactly.
    pub fn to_raw(&self) -> RawStep {
        let kind = self.kind();
        let content = match &self.body {
            StepBody::UserRequest { text }
            | StepBody::AgentThought { text }
            | StepBody::AgentResponse { text } => json!({
                "type": kind.tag(),
                "content": text,
            }),
            StepBody::ToolCall { tool_name, params } => json!({
                "type": kind.tag(),
                "toolName": tool_name,
                "params": params,
            }),
            StepBody::ToolResult { tool_name, result } => json!({
                "type": kind.tag(),
                "toolName": tool_name,
                "result": result,
            }),
        };
        RawStep {
            id: self.id.clone(),
            kind: kind.tag().to_string(),
            content,
            timestamp: self.timestamp.clone(),
            order: None,
        }
    }
}

/// Extract display text from a text-bearing payload.
///
/// Prefers a non-null `content.content`, then `content` itself. Strings are
/// used as-is, `null` becomes empty, anything else renders as compact JSON.
pub fn normalize_text(content: &Value) -> String {
    match content.get("content") {
        Some(nested) if !nested.is_null() => value_text(nested),
        _ => value_text(content),
    }
}

fn tool_name(content: &Value) -> String {
    content
        .get("toolName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
