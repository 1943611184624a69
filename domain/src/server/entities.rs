//! Tool server descriptors and connection state

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Launch description of an out-of-process tool server.
///
/// Created from configuration at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerDescriptor {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub disabled: bool,
}

impl ToolServerDescriptor {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            disabled: false,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Connection status recorded by the latest probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Configured,
    Connecting,
    Connected,
    ConnectedNoTools,
    Timeout,
    Failed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionStatus::Configured => "configured",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::ConnectedNoTools => "connected_no_tools",
            ConnectionStatus::Timeout => "timeout",
            ConnectionStatus::Failed => "failed",
        }
    }

    /// The latest probe reached the server but could not use it
    pub fn is_unusable(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::ConnectedNoTools | ConnectionStatus::Timeout | ConnectionStatus::Failed
        )
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-server state owned by the registry.
///
/// Transitions return a new value; the registry swaps the whole value in so
/// readers never see a half-updated state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolServerState {
    pub descriptor: ToolServerDescriptor,
    pub status: ConnectionStatus,
    pub initialized: bool,
    /// Tool runtime missing; every call is routed to fallback handlers
    pub fallback_mode: bool,
    pub available_tools: IndexSet<String>,
    pub last_attempt: Option<SystemTime>,
    pub last_error: Option<String>,
}

impl ToolServerState {
    pub fn configured(descriptor: ToolServerDescriptor) -> Self {
        Self {
            descriptor,
            status: ConnectionStatus::Configured,
            initialized: false,
            fallback_mode: false,
            available_tools: IndexSet::new(),
            last_attempt: None,
            last_error: None,
        }
    }

    /// Usable without a live connection: calls go straight to fallbacks.
    pub fn fallback(descriptor: ToolServerDescriptor) -> Self {
        Self {
            initialized: true,
            fallback_mode: true,
            ..Self::configured(descriptor)
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn connecting(&self, at: SystemTime) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            last_attempt: Some(at),
            ..self.clone()
        }
    }

    /// Enumeration succeeded. Zero tools leaves the server unusable.
    pub fn connected<I, S>(&self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let available_tools: IndexSet<String> = tools.into_iter().map(Into::into).collect();
        let has_tools = !available_tools.is_empty();
        Self {
            status: if has_tools {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::ConnectedNoTools
            },
            initialized: has_tools,
            fallback_mode: false,
            available_tools,
            last_error: None,
            ..self.clone()
        }
    }

    /// Probe timed out. Tools from an earlier successful probe are kept.
    pub fn timed_out(&self) -> Self {
        Self {
            status: ConnectionStatus::Timeout,
            last_error: Some("tool enumeration timed out".to_string()),
            ..self.clone()
        }
    }

    /// Probe failed. Tools from an earlier successful probe are kept.
    pub fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Failed,
            last_error: Some(error.into()),
            ..self.clone()
        }
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.available_tools.contains(tool_name)
    }
}
