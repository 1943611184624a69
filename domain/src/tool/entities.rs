//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tool advertised by a connected tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTool {
    /// Tool name (e.g., "get_pricing_from_api")
    pub name: String,
    /// Owning server, when the protocol exposes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl RemoteTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: None,
            description: String::new(),
        }
    }

    pub fn on_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn belongs_to(&self, server: &str) -> bool {
        self.server.as_deref() == Some(server)
    }
}

/// Pick the callable tool for `(server, tool_name)` among enumerated tools.
///
/// A tool whose server affinity matches wins. When no candidate with the
/// requested name carries affinity metadata, the first name match is used.
/// Candidates pinned to a different server are never chosen.
pub fn locate_tool<'a>(tools: &'a [RemoteTool], server: &str, tool_name: &str) -> Option<&'a RemoteTool> {
    let candidates: Vec<&RemoteTool> = tools.iter().filter(|t| t.name == tool_name).collect();

    if let Some(exact) = candidates.iter().find(|t| t.belongs_to(server)) {
        return Some(exact);
    }
    if candidates.iter().all(|t| t.server.is_none()) {
        return candidates.first().copied();
    }
    None
}

/// A call to a named tool on a named server, with keyword arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub server_name: String,
    pub tool_name: String,
    pub arguments: BTreeMap<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(server_name: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Add an argument only when a value is present
    pub fn with_optional_arg(self, key: impl Into<String>, value: Option<impl Into<serde_json::Value>>) -> Self {
        match value {
            Some(v) => self.with_arg(key, v),
            None => self,
        }
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Arguments as a JSON object
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let call = ToolInvocation::new("awslabs.cost-analysis-mcp-server", "get_pricing_from_api")
            .with_arg("service_code", "AmazonEC2")
            .with_optional_arg("instance_type", None::<String>)
            .with_optional_arg("region", Some("us-east-1"));

        assert_eq!(call.get_string("service_code"), Some("AmazonEC2"));
        assert_eq!(call.get_string("region"), Some("us-east-1"));
        assert!(!call.arguments.contains_key("instance_type"));
        assert_eq!(call.arguments_json()["service_code"], "AmazonEC2");
    }

    #[test]
    fn test_locate_prefers_server_affinity() {
        let tools = vec![
            RemoteTool::new("search_documentation").on_server("other"),
            RemoteTool::new("search_documentation").on_server("docs"),
        ];
        let found = locate_tool(&tools, "docs", "search_documentation").unwrap();
        assert!(found.belongs_to("docs"));
    }

    #[test]
    fn test_locate_without_affinity_takes_first_name_match() {
        let tools = vec![
            RemoteTool::new("generate_terraform").with_description("first"),
            RemoteTool::new("generate_terraform").with_description("second"),
        ];
        let found = locate_tool(&tools, "terraform", "generate_terraform").unwrap();
        assert_eq!(found.description, "first");
    }

    #[test]
    fn test_locate_rejects_tool_pinned_elsewhere() {
        let tools = vec![RemoteTool::new("search_documentation").on_server("other")];
        assert!(locate_tool(&tools, "docs", "search_documentation").is_none());
        assert!(locate_tool(&tools, "docs", "missing").is_none());
    }
}
