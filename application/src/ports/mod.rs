//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod catalog_source;
pub mod invocation_logger;
pub mod service_lookup;
pub mod tool_connector;
pub mod tool_gateway;
