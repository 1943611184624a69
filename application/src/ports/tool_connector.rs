//! Tool connector port
//!
//! Defines the interface to the tool-invocation protocol: enumerate the tools
//! of a set of servers and invoke one of them. The gateway never implements
//! the transport itself; a connector library is adapted behind this trait.

use advisor_domain::{RemoteTool, ToolServerDescriptor};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to tool servers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectorError {
    #[error("Tool runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Failed to start server: {0}")]
    Spawn(String),

    #[error("Timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Tool error: {0}")]
    Tool(String),
}

impl ConnectorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectorError::Timeout)
    }
}

/// Connector for out-of-process tool servers
///
/// Both operations may suspend on process spawn and I/O and may fail. Callers
/// wrap every call in their own timeout.
#[async_trait]
pub trait ToolConnector: Send + Sync {
    /// Whether the tool-invocation runtime exists at all.
    ///
    /// `false` puts every configured server into fallback mode.
    fn is_available(&self) -> bool;

    /// Enumerate the tools of `servers`.
    ///
    /// A batched call may aggregate failures across servers; callers retry
    /// servers one by one when it does.
    async fn list_tools(&self, servers: &[ToolServerDescriptor]) -> Result<Vec<RemoteTool>, ConnectorError>;

    /// Invoke `tool` on `server` with keyword `arguments` (a JSON object)
    async fn call_tool(
        &self,
        server: &ToolServerDescriptor,
        tool: &RemoteTool,
        arguments: &Value,
    ) -> Result<Value, ConnectorError>;
}
