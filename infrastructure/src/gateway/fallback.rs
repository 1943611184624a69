//! Fallback handlers keyed by `(server, tool)`
//!
//! When a live call is impossible or yields nothing useful, the gateway asks
//! this registry for a schema-compatible substitute. Every built-in result
//! carries `"source": "fallback"`.

use super::templates::{
    GENERAL_DOCUMENTATION_HINT, core_guidance, service_description, terraform_template,
};
use advisor_application::tool_names::{
    CORE_PROMPT_TOOL, CORE_SERVER, DOCS_SEARCH_TOOL, DOCS_SERVER, PRICING_API_TOOL,
    PRICING_SERVER, PRICING_WEB_TOOL, TERRAFORM_SERVER, TERRAFORM_TOOL,
};
use advisor_domain::DEFAULT_REGION;
use advisor_domain::ToolInvocation;
use advisor_domain::pricing::static_model::{STATIC_NOTE, static_monthly_cost};
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Marker placed in every built-in fallback result
pub const FALLBACK_SOURCE: &str = "fallback";

pub type FallbackHandler = Arc<dyn Fn(&ToolInvocation) -> Value + Send + Sync>;

/// Mismatch between handlers and configured servers, found at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackGap {
    /// A handler targets a server that is not configured
    UnknownServer { server: String, tool: String },
    /// An enabled server has no handler for any of its tools
    Unhandled { server: String },
}

impl fmt::Display for FallbackGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackGap::UnknownServer { server, tool } => {
                write!(f, "fallback for {server}/{tool} targets an unconfigured server")
            }
            FallbackGap::Unhandled { server } => {
                write!(f, "server {server} has no fallback handler")
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct FallbackRegistry {
    handlers: IndexMap<(String, String), FallbackHandler>,
}

impl fmt::Debug for FallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with handlers for the well-known AWS servers
    pub fn with_builtin_handlers() -> Self {
        Self::new()
            .with_handler(PRICING_SERVER, PRICING_API_TOOL, pricing_fallback)
            .with_handler(PRICING_SERVER, PRICING_WEB_TOOL, pricing_fallback)
            .with_handler(DOCS_SERVER, DOCS_SEARCH_TOOL, documentation_fallback)
            .with_handler(TERRAFORM_SERVER, TERRAFORM_TOOL, terraform_fallback)
            .with_handler(CORE_SERVER, CORE_PROMPT_TOOL, guidance_fallback)
    }

    pub fn with_handler<F>(mut self, server: &str, tool: &str, handler: F) -> Self
    where
        F: Fn(&ToolInvocation) -> Value + Send + Sync + 'static,
    {
        self.register(server, tool, handler);
        self
    }

    /// Add or replace the handler for `(server, tool)`
    pub fn register<F>(&mut self, server: &str, tool: &str, handler: F)
    where
        F: Fn(&ToolInvocation) -> Value + Send + Sync + 'static,
    {
        self.handlers
            .insert((server.to_string(), tool.to_string()), Arc::new(handler));
    }

    pub fn has_handler(&self, server: &str, tool: &str) -> bool {
        self.handlers
            .contains_key(&(server.to_string(), tool.to_string()))
    }

    /// Run the handler for the invocation's `(server, tool)`, if any
    pub fn handle(&self, invocation: &ToolInvocation) -> Option<Value> {
        self.handlers
            .get(&(invocation.server_name.clone(), invocation.tool_name.clone()))
            .map(|handler| handler(invocation))
    }

    /// Compare handler keys against the enabled server names
    pub fn validate(&self, configured: &[String]) -> Vec<FallbackGap> {
        let mut gaps: Vec<FallbackGap> = self
            .handlers
            .keys()
            .filter(|(server, _)| !configured.contains(server))
            .map(|(server, tool)| FallbackGap::UnknownServer {
                server: server.clone(),
                tool: tool.clone(),
            })
            .collect();

        gaps.extend(
            configured
                .iter()
                .filter(|name| !self.handlers.keys().any(|(server, _)| server == *name))
                .map(|name| FallbackGap::Unhandled {
                    server: name.clone(),
                }),
        );
        gaps
    }
}

// ==================== Built-in handlers ====================

fn pricing_fallback(invocation: &ToolInvocation) -> Value {
    let code = invocation.get_string("service_code").unwrap_or("UNKNOWN");
    let region = invocation
        .get_string("region")
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(DEFAULT_REGION);
    let instance_type = invocation.get_string("instance_type");

    let mut result = json!({
        "service_code": code,
        "region": region,
        "monthly_cost": static_monthly_cost(code, region, instance_type),
        "currency": "USD",
        "note": STATIC_NOTE,
        "source": FALLBACK_SOURCE,
    });
    if let Some(instance) = instance_type {
        result["instance_type"] = json!(instance);
    }
    if let Some(query) = invocation.get_string("query") {
        result["query"] = json!(query);
    }
    result
}

fn documentation_fallback(invocation: &ToolInvocation) -> Value {
    let query = invocation.get_string("query").unwrap_or_default();
    match service_description(query) {
        Some((service, description)) => json!({
            "service": service,
            "description": description,
            "source": FALLBACK_SOURCE,
        }),
        None => json!({
            "general": GENERAL_DOCUMENTATION_HINT,
            "source": FALLBACK_SOURCE,
        }),
    }
}

fn terraform_fallback(invocation: &ToolInvocation) -> Value {
    let requirements = invocation.get_string("requirements").unwrap_or_default();
    json!({
        "content": terraform_template(requirements),
        "source": FALLBACK_SOURCE,
    })
}

fn guidance_fallback(invocation: &ToolInvocation) -> Value {
    let prompt = invocation.get_string("prompt").unwrap_or_default();
    json!({
        "content": core_guidance(prompt),
        "source": FALLBACK_SOURCE,
    })
}
