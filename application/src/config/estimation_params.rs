//! Estimation parameters — tier wiring and cache lifetimes.
//!
//! [`EstimationParams`] groups the static parameters of
//! [`CostEstimationEngine`](crate::use_cases::estimate_cost::CostEstimationEngine).
//! Infrastructure builds them from the config file; tests use the defaults.

use advisor_domain::pricing::extraction::DEFAULT_MONTHLY_CEILING;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::tool_names::{
    DOCS_SEARCH_TOOL, DOCS_SERVER, PRICING_API_TOOL, PRICING_SERVER, PRICING_WEB_TOOL,
};

/// Estimation tier control parameters.
///
/// | Tier | Server field | Tool field | Cache TTL |
/// |------|--------------|------------|-----------|
/// | tool_api | `pricing_server` | `pricing_api_tool` | `tool_ttl` |
/// | tool_web | `pricing_server` | `pricing_web_tool` | `tool_ttl` |
/// | documentation | `docs_server` | `docs_tool` | `static_ttl` |
/// | static_fallback | — | — | `static_ttl` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationParams {
    pub pricing_server: String,
    pub pricing_api_tool: String,
    pub pricing_web_tool: String,
    pub docs_server: String,
    pub docs_tool: String,
    /// Lifetime of tool-derived prices
    pub tool_ttl: Duration,
    /// Lifetime of documentation and static estimates
    pub static_ttl: Duration,
    /// Projected monthly figures above this are read as monthly already
    pub monthly_ceiling: f64,
}

impl Default for EstimationParams {
    fn default() -> Self {
        Self {
            pricing_server: PRICING_SERVER.to_string(),
            pricing_api_tool: PRICING_API_TOOL.to_string(),
            pricing_web_tool: PRICING_WEB_TOOL.to_string(),
            docs_server: DOCS_SERVER.to_string(),
            docs_tool: DOCS_SEARCH_TOOL.to_string(),
            tool_ttl: Duration::from_secs(5 * 60),
            static_ttl: Duration::from_secs(30 * 60),
            monthly_ceiling: DEFAULT_MONTHLY_CEILING,
        }
    }
}

impl EstimationParams {
    // ==================== Builder Methods ====================

    pub fn with_pricing_server(mut self, server: impl Into<String>) -> Self {
        self.pricing_server = server.into();
        self
    }

    pub fn with_docs_server(mut self, server: impl Into<String>) -> Self {
        self.docs_server = server.into();
        self
    }

    pub fn with_tool_ttl(mut self, ttl: Duration) -> Self {
        self.tool_ttl = ttl;
        self
    }

    pub fn with_static_ttl(mut self, ttl: Duration) -> Self {
        self.static_ttl = ttl;
        self
    }

    pub fn with_monthly_ceiling(mut self, ceiling: f64) -> Self {
        self.monthly_ceiling = ceiling;
        self
    }
}
