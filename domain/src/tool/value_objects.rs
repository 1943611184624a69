//! Tool domain value objects — invocation outputs and fallback causes
//!
//! Every successful [`ToolGateway`] call yields a [`ToolOutput`]. Outputs
//! carry a [`Provenance`]: `Live` when a tool server answered, `Fallback`
//! when a registered handler synthesized a schema-compatible stand-in.
//!
//! [`ToolGateway`]: ../../../advisor_infrastructure/gateway/index.html

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys probed, in order, when pulling text out of an object-shaped result
const TEXT_FIELDS: &[&str] = &["content", "text", "result", "answer", "description", "body"];

/// Who produced a tool output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &str {
        match self {
            Provenance::Live => "live",
            Provenance::Fallback => "fallback",
        }
    }
}

/// Why a call was routed to a fallback handler.
///
/// | Code | Cause |
/// |------|-------|
/// | `FALLBACK_MODE` | Tool runtime unavailable for the server |
/// | `SERVER_UNUSABLE` | Latest probe failed, timed out or found no tools |
/// | `NOT_FOUND` | Tool not advertised by the server |
/// | `TIMEOUT` | Enumeration or invocation exceeded its timeout |
/// | `EXECUTION_FAILED` | Connector returned an error |
/// | `EMPTY_RESULT` | Tool answered with nothing useful |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    FallbackMode,
    ServerUnusable(String),
    NotFound,
    Timeout,
    ExecutionFailed(String),
    EmptyResult,
}

impl FallbackReason {
    pub fn code(&self) -> &str {
        match self {
            FallbackReason::FallbackMode => "FALLBACK_MODE",
            FallbackReason::ServerUnusable(_) => "SERVER_UNUSABLE",
            FallbackReason::NotFound => "NOT_FOUND",
            FallbackReason::Timeout => "TIMEOUT",
            FallbackReason::ExecutionFailed(_) => "EXECUTION_FAILED",
            FallbackReason::EmptyResult => "EMPTY_RESULT",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::ServerUnusable(detail) | FallbackReason::ExecutionFailed(detail) => {
                write!(f, "[{}] {}", self.code(), detail)
            }
            _ => write!(f, "[{}]", self.code()),
        }
    }
}

/// Metadata about how an output was produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutputMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

/// Result of a gateway invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub server_name: String,
    pub tool_name: String,
    pub content: Value,
    pub provenance: Provenance,
    #[serde(default)]
    pub metadata: ToolOutputMetadata,
}

impl ToolOutput {
    /// Output produced by a live tool server
    pub fn live(server_name: impl Into<String>, tool_name: impl Into<String>, content: Value) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            content,
            provenance: Provenance::Live,
            metadata: ToolOutputMetadata::default(),
        }
    }

    /// Output synthesized by a fallback handler
    pub fn fallback(
        server_name: impl Into<String>,
        tool_name: impl Into<String>,
        content: Value,
        reason: FallbackReason,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            content,
            provenance: Provenance::Fallback,
            metadata: ToolOutputMetadata {
                duration_ms: None,
                fallback_reason: Some(reason),
            },
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_live(&self) -> bool {
        self.provenance == Provenance::Live
    }

    /// Best-effort text view of the content, whatever its shape
    pub fn text(&self) -> String {
        content_text(&self.content)
    }
}

/// Whether a tool answer carries anything worth using
pub fn is_useful(content: &Value) -> bool {
    match content {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Flatten heterogeneous tool answers to text.
///
/// Handles plain strings, protocol content blocks (`[{"type": "text", "text": ...}]`),
/// objects with a well-known text field, and falls back to compact JSON.
pub fn content_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(content_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => TEXT_FIELDS
            .iter()
            .find_map(|field| map.get(*field).filter(|v| is_useful(v)))
            .map(content_text)
            .unwrap_or_else(|| content.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
