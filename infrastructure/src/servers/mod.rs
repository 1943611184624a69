//! Tool server lifecycle: configuration, probing and per-server state

pub mod registry;
pub mod unavailable;

pub use registry::{DEFAULT_ENUMERATION_TIMEOUT, ToolServerRegistry};
pub use unavailable::UnavailableConnector;
