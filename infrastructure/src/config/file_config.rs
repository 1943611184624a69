//! Raw configuration data types
//!
//! These structs mirror the TOML config file exactly. Every section has
//! defaults, so a missing or partial file still yields a usable config.
//!
//! ```toml
//! [cache]
//! default_ttl_secs = 300
//!
//! [catalog]
//! validity_hours = 24
//! substring_policy = "first_match"
//!
//! [gateway]
//! servers_file = "config/mcp_config.json"
//! invocation_timeout_secs = 120
//!
//! [gateway.tool_timeouts]
//! generate_terraform = 300
//!
//! [estimation]
//! tool_ttl_secs = 300
//! monthly_ceiling = 5000.0
//!
//! [logging]
//! verbosity = 1
//! invocation_log = "logs/invocations.jsonl"
//! ```

use super::error::ConfigValidationError;
use advisor_application::EstimationParams;
use advisor_application::tool_names::{
    DOCS_SEARCH_TOOL, DOCS_SERVER, PRICING_API_TOOL, PRICING_SERVER, PRICING_WEB_TOOL,
};
use advisor_domain::SubstringPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Public AWS Price List offer index
pub const DEFAULT_CATALOG_URL: &str = "https://pricing.us-east-1.amazonaws.com/offers/v1.0/aws/index.json";

/// Request cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub default_ttl_secs: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self { default_ttl_secs: 300 }
    }
}

/// Service catalog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCatalogConfig {
    pub url: String,
    pub fetch_timeout_secs: u64,
    pub validity_hours: u64,
    /// Skip the remote fetch and use the curated table only
    pub offline: bool,
    pub substring_policy: SubstringPolicy,
}

impl Default for FileCatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            fetch_timeout_secs: 30,
            validity_hours: 24,
            offline: false,
            substring_policy: SubstringPolicy::FirstMatch,
        }
    }
}

/// Tool server and gateway settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Tool server definitions (`mcpServers` JSON or `[servers]` TOML)
    pub servers_file: Option<PathBuf>,
    pub enumeration_timeout_secs: u64,
    pub invocation_timeout_secs: u64,
    /// Per-tool invocation timeout overrides, in seconds
    pub tool_timeouts: BTreeMap<String, u64>,
    /// Require each server's launcher on PATH before spawning it
    pub check_launchers: bool,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            servers_file: None,
            enumeration_timeout_secs: 10,
            invocation_timeout_secs: 120,
            tool_timeouts: BTreeMap::new(),
            check_launchers: true,
        }
    }
}

impl FileGatewayConfig {
    pub fn enumeration_timeout(&self) -> Duration {
        Duration::from_secs(self.enumeration_timeout_secs)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }

    pub fn tool_timeouts(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.tool_timeouts
            .iter()
            .map(|(tool, secs)| (tool.as_str(), Duration::from_secs(*secs)))
    }
}

/// Estimation tier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEstimationConfig {
    pub pricing_server: String,
    pub pricing_api_tool: String,
    pub pricing_web_tool: String,
    pub docs_server: String,
    pub docs_tool: String,
    pub tool_ttl_secs: u64,
    pub static_ttl_secs: u64,
    pub monthly_ceiling: f64,
}

impl Default for FileEstimationConfig {
    fn default() -> Self {
        Self {
            pricing_server: PRICING_SERVER.to_string(),
            pricing_api_tool: PRICING_API_TOOL.to_string(),
            pricing_web_tool: PRICING_WEB_TOOL.to_string(),
            docs_server: DOCS_SERVER.to_string(),
            docs_tool: DOCS_SEARCH_TOOL.to_string(),
            tool_ttl_secs: 300,
            static_ttl_secs: 1800,
            monthly_ceiling: 5000.0,
        }
    }
}

impl FileEstimationConfig {
    pub fn to_params(&self) -> EstimationParams {
        EstimationParams {
            pricing_server: self.pricing_server.clone(),
            pricing_api_tool: self.pricing_api_tool.clone(),
            pricing_web_tool: self.pricing_web_tool.clone(),
            docs_server: self.docs_server.clone(),
            docs_tool: self.docs_tool.clone(),
            tool_ttl: Duration::from_secs(self.tool_ttl_secs),
            static_ttl: Duration::from_secs(self.static_ttl_secs),
            monthly_ceiling: self.monthly_ceiling,
        }
    }
}

/// Diagnostic and structured logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// 0 = warn, 1 = info, 2 = debug, 3+ = trace
    pub verbosity: u8,
    /// Explicit `EnvFilter` directives; overrides `verbosity`
    pub filter: Option<String>,
    /// Directory for daily rolling log files; stderr only when unset
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// JSONL file recording every tool invocation and estimate
    pub invocation_log: Option<PathBuf>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            filter: None,
            directory: None,
            file_prefix: "aws-advisor.log".to_string(),
            invocation_log: None,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub cache: FileCacheConfig,
    pub catalog: FileCatalogConfig,
    pub gateway: FileGatewayConfig,
    pub estimation: FileEstimationConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let durations = [
            ("cache.default_ttl_secs", self.cache.default_ttl_secs),
            ("catalog.fetch_timeout_secs", self.catalog.fetch_timeout_secs),
            ("catalog.validity_hours", self.catalog.validity_hours),
            ("gateway.enumeration_timeout_secs", self.gateway.enumeration_timeout_secs),
            ("gateway.invocation_timeout_secs", self.gateway.invocation_timeout_secs),
            ("estimation.tool_ttl_secs", self.estimation.tool_ttl_secs),
            ("estimation.static_ttl_secs", self.estimation.static_ttl_secs),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigValidationError::ZeroDuration { field });
        }
        if self.gateway.tool_timeouts.values().any(|secs| *secs == 0) {
            return Err(ConfigValidationError::ZeroDuration {
                field: "gateway.tool_timeouts",
            });
        }

        if !(self.estimation.monthly_ceiling.is_finite() && self.estimation.monthly_ceiling > 0.0) {
            return Err(ConfigValidationError::InvalidCeiling);
        }

        let names = [
            ("estimation.pricing_server", &self.estimation.pricing_server),
            ("estimation.pricing_api_tool", &self.estimation.pricing_api_tool),
            ("estimation.pricing_web_tool", &self.estimation.pricing_web_tool),
            ("estimation.docs_server", &self.estimation.docs_server),
            ("estimation.docs_tool", &self.estimation.docs_tool),
        ];
        if let Some((field, _)) = names.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyName { field });
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.default_ttl_secs)
    }
}
