//! Application layer for aws-advisor-gateway
//!
//! This crate contains the cost estimation use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EstimationParams, tool_names};
pub use ports::{
    catalog_source::{CatalogError, CatalogSource},
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    service_lookup::ServiceCodeLookup,
    tool_connector::{ConnectorError, ToolConnector},
    tool_gateway::ToolGatewayPort,
};
pub use use_cases::estimate_cost::{CostEstimationEngine, ESTIMATE_OPERATION};
