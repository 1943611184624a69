//! Tool gateway port
//!
//! Defines the synchronous call surface estimation code uses to reach tool
//! servers.

use advisor_domain::{ToolInvocation, ToolOutput};

/// Port for invoking named tools
///
/// Implementations never fail: a broken or missing tool is answered by a
/// fallback handler. `None` means neither a live tool nor a handler exists
/// for the `(server, tool)` pair.
pub trait ToolGatewayPort: Send + Sync {
    /// Invoke a tool, blocking until it completes or times out
    fn invoke(&self, invocation: &ToolInvocation) -> Option<ToolOutput>;
}
