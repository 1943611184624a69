//! Infrastructure layer for aws-advisor-gateway
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration loading, the tool server registry, the
//! tool gateway with its fallback handlers, the service catalog resolver,
//! logging, and the [`CostAdvisor`] facade that wires them together.

pub mod catalog;
pub mod config;
pub mod facade;
pub mod gateway;
pub mod logging;
pub mod runtime;
pub mod servers;

// Re-export commonly used types
pub use catalog::{HttpCatalogSource, ServiceCodeResolver};
pub use config::{
    ConfigError, ConfigLoader, ConfigValidationError, FileCacheConfig, FileCatalogConfig,
    FileConfig, FileEstimationConfig, FileGatewayConfig, FileLoggingConfig,
};
pub use facade::CostAdvisor;
pub use gateway::{FallbackGap, FallbackRegistry, ToolGateway};
pub use logging::{JsonlInvocationLogger, init_tracing, invocation_logger};
pub use runtime::{BridgeError, block_on_isolated};
pub use servers::{ToolServerRegistry, UnavailableConnector};
