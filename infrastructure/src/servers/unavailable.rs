//! Connector used when no tool runtime is installed

use advisor_application::{ConnectorError, ToolConnector};
use advisor_domain::{RemoteTool, ToolServerDescriptor};
use async_trait::async_trait;
use serde_json::Value;

/// Reports the tool runtime as missing, so every server runs in fallback mode
#[derive(Debug, Clone, Default)]
pub struct UnavailableConnector {
    reason: String,
}

impl UnavailableConnector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ToolConnector for UnavailableConnector {
    fn is_available(&self) -> bool {
        false
    }

    async fn list_tools(&self, _servers: &[ToolServerDescriptor]) -> Result<Vec<RemoteTool>, ConnectorError> {
        Err(ConnectorError::RuntimeUnavailable(self.reason.clone()))
    }

    async fn call_tool(
        &self,
        _server: &ToolServerDescriptor,
        _tool: &RemoteTool,
        _arguments: &Value,
    ) -> Result<Value, ConnectorError> {
        Err(ConnectorError::RuntimeUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_unavailable() {
        let connector = UnavailableConnector::new("no tool runtime installed");
        assert!(!connector.is_available());
        let err = connector.list_tools(&[]).await.unwrap_err();
        assert_eq!(
            err,
            ConnectorError::RuntimeUnavailable("no tool runtime installed".into())
        );
    }
}
