//! Tool gateway: live tool calls with per-tool fallback handlers

pub mod fallback;
pub mod templates;
pub mod tool_gateway;

pub use fallback::{FALLBACK_SOURCE, FallbackGap, FallbackHandler, FallbackRegistry};
pub use tool_gateway::{DEFAULT_INVOCATION_TIMEOUT, ToolGateway};
