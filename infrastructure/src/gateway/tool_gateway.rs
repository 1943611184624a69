//! Tool gateway
//!
//! Synchronous entry point for every tool call. A call is attempted live
//! when the target server is usable and the tool was enumerated; anything
//! else (fallback mode, missing tool, error, timeout, empty answer) is
//! answered by the [`FallbackRegistry`]. Failures are logged, never raised.

use super::fallback::{FallbackGap, FallbackRegistry};
use crate::runtime::block_on_isolated;
use crate::servers::ToolServerRegistry;
use advisor_application::{InvocationEvent, InvocationLogger, NoInvocationLogger, ToolGatewayPort};
use advisor_domain::core::string::truncate_json;
use advisor_domain::tool::value_objects::is_useful;
use advisor_domain::{FallbackReason, ToolInvocation, ToolOutput, locate_tool};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default per-call timeout
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(120);

const LOGGED_PARAMS_LEN: usize = 200;

pub struct ToolGateway {
    registry: Arc<ToolServerRegistry>,
    fallbacks: FallbackRegistry,
    logger: Arc<dyn InvocationLogger>,
    default_timeout: Duration,
    tool_timeouts: HashMap<String, Duration>,
}

impl ToolGateway {
    pub fn new(registry: Arc<ToolServerRegistry>, fallbacks: FallbackRegistry) -> Self {
        Self {
            registry,
            fallbacks,
            logger: Arc::new(NoInvocationLogger),
            default_timeout: DEFAULT_INVOCATION_TIMEOUT,
            tool_timeouts: HashMap::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Override the timeout for one tool name
    pub fn with_tool_timeout(mut self, tool: impl Into<String>, timeout: Duration) -> Self {
        self.tool_timeouts.insert(tool.into(), timeout);
        self
    }

    pub fn registry(&self) -> &Arc<ToolServerRegistry> {
        &self.registry
    }

    pub fn timeout_for(&self, tool: &str) -> Duration {
        self.tool_timeouts
            .get(tool)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    /// Check handlers against the configured servers and log every gap
    pub fn validate_fallbacks(&self) -> Vec<FallbackGap> {
        let gaps = self.fallbacks.validate(&self.registry.server_names());
        for gap in &gaps {
            warn!(gap = %gap, "Fallback handler mismatch");
        }
        gaps
    }

    /// Invoke a tool live, degrading to its fallback handler.
    ///
    /// `None` only when the call failed and no handler exists.
    pub fn invoke(&self, invocation: &ToolInvocation) -> Option<ToolOutput> {
        let started = Instant::now();
        let live = self.call_live(invocation);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let output = match live {
            Ok(content) => {
                debug!(
                    server = %invocation.server_name,
                    tool = %invocation.tool_name,
                    duration_ms,
                    "Tool call succeeded"
                );
                Some(
                    ToolOutput::live(&invocation.server_name, &invocation.tool_name, content)
                        .with_duration(duration_ms),
                )
            }
            Err(reason) => {
                warn!(
                    server = %invocation.server_name,
                    tool = %invocation.tool_name,
                    params = %truncate_json(&invocation.arguments_json(), LOGGED_PARAMS_LEN),
                    reason = %reason,
                    "Tool call degraded to fallback"
                );
                let output = self.fallbacks.handle(invocation).map(|content| {
                    ToolOutput::fallback(
                        &invocation.server_name,
                        &invocation.tool_name,
                        content,
                        reason.clone(),
                    )
                });
                if output.is_none() {
                    warn!(
                        server = %invocation.server_name,
                        tool = %invocation.tool_name,
                        "No fallback handler registered"
                    );
                }
                output
            }
        };

        self.record(invocation, output.as_ref(), duration_ms);
        output
    }

    fn call_live(&self, invocation: &ToolInvocation) -> Result<Value, FallbackReason> {
        let server = invocation.server_name.as_str();
        let state = self
            .registry
            .state(server)
            .ok_or_else(|| FallbackReason::ServerUnusable("not configured".to_string()))?;

        if state.fallback_mode {
            return Err(FallbackReason::FallbackMode);
        }
        if !state.initialized {
            return Err(FallbackReason::ServerUnusable(state.status.to_string()));
        }

        let tools = self.registry.tools();
        let tool = locate_tool(&tools, server, &invocation.tool_name).ok_or(FallbackReason::NotFound)?;

        let connector = self.registry.connector();
        let arguments = invocation.arguments_json();
        let timeout = self.timeout_for(&invocation.tool_name);
        // The timer must be created inside the private runtime
        let call = async {
            tokio::time::timeout(
                timeout,
                connector.call_tool(&state.descriptor, tool, &arguments),
            )
            .await
        };

        let content = match block_on_isolated(call) {
            Err(e) => return Err(FallbackReason::ExecutionFailed(e.to_string())),
            Ok(Err(_elapsed)) => return Err(FallbackReason::Timeout),
            Ok(Ok(Err(e))) if e.is_timeout() => return Err(FallbackReason::Timeout),
            Ok(Ok(Err(e))) => return Err(FallbackReason::ExecutionFailed(e.to_string())),
            Ok(Ok(Ok(content))) => content,
        };

        if is_useful(&content) {
            Ok(content)
        } else {
            Err(FallbackReason::EmptyResult)
        }
    }

    fn record(&self, invocation: &ToolInvocation, output: Option<&ToolOutput>, duration_ms: u64) {
        let payload = json!({
            "server": invocation.server_name,
            "tool": invocation.tool_name,
            "arguments": invocation.arguments_json(),
            "provenance": output.map(|o| o.provenance.as_str()),
            "fallback_reason": output.and_then(|o| o.metadata.fallback_reason.as_ref()),
            "duration_ms": duration_ms,
        });
        self.logger.log(InvocationEvent::new("tool_invocation", payload));
    }
}

impl ToolGatewayPort for ToolGateway {
    fn invoke(&self, invocation: &ToolInvocation) -> Option<ToolOutput> {
        ToolGateway::invoke(self, invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servers::UnavailableConnector;
    use advisor_application::tool_names::{DOCS_SEARCH_TOOL, DOCS_SERVER};
    use advisor_application::{ConnectorError, ToolConnector};
    use advisor_domain::{Provenance, RemoteTool, ToolServerDescriptor};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Behavior {
        Answer(Value),
        Fail(ConnectorError),
        Hang,
    }

    /// Every server advertises `tools`; calls answer per tool name.
    struct FakeConnector {
        tools: Vec<&'static str>,
        behaviors: HashMap<&'static str, Behavior>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ToolConnector for FakeConnector {
        fn is_available(&self) -> bool {
            true
        }

        async fn list_tools(&self, servers: &[ToolServerDescriptor]) -> Result<Vec<RemoteTool>, ConnectorError> {
            Ok(servers
                .iter()
                .flat_map(|s| self.tools.iter().map(|t| RemoteTool::new(*t).on_server(&s.name)))
                .collect())
        }

        async fn call_tool(
            &self,
            _server: &ToolServerDescriptor,
            tool: &RemoteTool,
            _arguments: &Value,
        ) -> Result<Value, ConnectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviors.get(tool.name.as_str()).cloned() {
                Some(Behavior::Answer(value)) => Ok(value),
                Some(Behavior::Fail(e)) => Err(e),
                Some(Behavior::Hang) => std::future::pending().await,
                None => Err(ConnectorError::Tool("unknown tool".into())),
            }
        }
    }

    #[derive(Default)]
    struct CapturingLogger {
        events: Mutex<Vec<(String, Value)>>,
    }

    impl InvocationLogger for CapturingLogger {
        fn log(&self, event: InvocationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type.to_string(), event.payload));
        }
    }

    fn gateway_with(behaviors: Vec<(&'static str, Behavior)>) -> (ToolGateway, Arc<FakeConnector>) {
        let connector = Arc::new(FakeConnector {
            tools: behaviors.iter().map(|(name, _)| *name).collect(),
            behaviors: behaviors.into_iter().collect(),
            calls: AtomicUsize::new(0),
        });
        let registry = ToolServerRegistry::new(connector.clone())
            .with_launcher_check(false)
            .with_servers([ToolServerDescriptor::new(DOCS_SERVER, "uvx")]);
        assert!(registry.initialize());

        let gateway = ToolGateway::new(Arc::new(registry), FallbackRegistry::with_builtin_handlers())
            .with_default_timeout(Duration::from_millis(50));
        (gateway, connector)
    }

    fn docs_query(query: &str) -> ToolInvocation {
        ToolInvocation::new(DOCS_SERVER, DOCS_SEARCH_TOOL).with_arg("query", query)
    }

    #[test]
    fn test_live_call() {
        let (gateway, connector) = gateway_with(vec![(
            DOCS_SEARCH_TOOL,
            Behavior::Answer(json!({"content": "EC2 is billed per second"})),
        )]);

        let output = gateway.invoke(&docs_query("ec2 billing")).unwrap();
        assert_eq!(output.provenance, Provenance::Live);
        assert_eq!(output.text(), "EC2 is billed per second");
        assert!(output.metadata.duration_ms.is_some());
        assert!(output.metadata.fallback_reason.is_none());
        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_result_uses_fallback() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Answer(json!({})))]);

        let output = gateway.invoke(&docs_query("lambda limits")).unwrap();
        assert_eq!(output.provenance, Provenance::Fallback);
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::EmptyResult));
        assert_eq!(output.content["service"], "lambda");
        assert_eq!(output.content["source"], "fallback");
    }

    #[test]
    fn test_errors_and_timeouts_use_fallback() {
        let (gateway, _) = gateway_with(vec![(
            DOCS_SEARCH_TOOL,
            Behavior::Fail(ConnectorError::Tool("boom".into())),
        )]);
        let output = gateway.invoke(&docs_query("s3")).unwrap();
        assert!(matches!(
            output.metadata.fallback_reason,
            Some(FallbackReason::ExecutionFailed(ref msg)) if msg.contains("boom")
        ));

        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Hang)]);
        let output = gateway.invoke(&docs_query("s3")).unwrap();
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::Timeout));

        let (gateway, _) = gateway_with(vec![(
            DOCS_SEARCH_TOOL,
            Behavior::Fail(ConnectorError::Timeout),
        )]);
        let output = gateway.invoke(&docs_query("s3")).unwrap();
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::Timeout));
    }

    #[test]
    fn test_per_tool_timeout_overrides_default() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Hang)]);
        let gateway = gateway
            .with_default_timeout(Duration::from_secs(30))
            .with_tool_timeout(DOCS_SEARCH_TOOL, Duration::from_millis(20));
        assert_eq!(gateway.timeout_for(DOCS_SEARCH_TOOL), Duration::from_millis(20));
        assert_eq!(gateway.timeout_for("read_page"), Duration::from_secs(30));

        let started = Instant::now();
        let output = gateway.invoke(&docs_query("ec2")).unwrap();
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_live_call_from_plain_thread() {
        let (gateway, _) = gateway_with(vec![(
            DOCS_SEARCH_TOOL,
            Behavior::Answer(json!("Lambda is billed per request")),
        )]);

        let output = std::thread::spawn(move || gateway.invoke(&docs_query("lambda")))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(output.provenance, Provenance::Live);
        assert_eq!(output.text(), "Lambda is billed per request");
    }

    #[test]
    fn test_unenumerated_tool_is_not_found() {
        let (gateway, connector) = gateway_with(vec![(
            "read_documentation",
            Behavior::Answer(json!("page")),
        )]);
        let output = gateway.invoke(&docs_query("rds")).unwrap();
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::NotFound));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_handler_returns_none() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Answer(json!("x")))]);
        let call = ToolInvocation::new(DOCS_SERVER, "read_documentation");
        assert!(gateway.invoke(&call).is_none());

        let call = ToolInvocation::new("unconfigured", "anything");
        assert!(gateway.invoke(&call).is_none());
    }

    #[test]
    fn test_fallback_mode_never_calls_connector() {
        let registry = ToolServerRegistry::new(Arc::new(UnavailableConnector::new("missing")))
            .with_servers([ToolServerDescriptor::new(DOCS_SERVER, "uvx")]);
        assert!(registry.initialize());
        let gateway = ToolGateway::new(Arc::new(registry), FallbackRegistry::with_builtin_handlers());

        let output = gateway.invoke(&docs_query("ec2")).unwrap();
        assert_eq!(output.metadata.fallback_reason, Some(FallbackReason::FallbackMode));
        assert_eq!(output.content["service"], "ec2");
    }

    #[test]
    fn test_invocations_are_logged() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Answer(json!("ok")))]);
        let logger = Arc::new(CapturingLogger::default());
        let gateway = gateway.with_logger(logger.clone());

        gateway.invoke(&docs_query("ec2"));
        gateway.invoke(&ToolInvocation::new(DOCS_SERVER, "read_documentation"));

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "tool_invocation");
        assert_eq!(events[0].1["provenance"], "live");
        assert_eq!(events[0].1["arguments"]["query"], "ec2");
        assert!(events[1].1["provenance"].is_null());
        assert_eq!(events[1].1["fallback_reason"], Value::Null);
    }

    #[test]
    fn test_validate_fallbacks_reports_unconfigured_builtins() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Answer(json!("ok")))]);
        let gaps = gateway.validate_fallbacks();
        assert!(!gaps.is_empty());
        assert!(gaps.iter().all(|gap| matches!(gap, FallbackGap::UnknownServer { .. })));
        assert!(!gaps.iter().any(|gap| matches!(
            gap,
            FallbackGap::UnknownServer { server, .. } if server == DOCS_SERVER
        )));
    }

    #[tokio::test]
    async fn test_invoke_from_async_context() {
        let (gateway, _) = gateway_with(vec![(DOCS_SEARCH_TOOL, Behavior::Answer(json!("ok")))]);
        let output = gateway.invoke(&docs_query("ec2")).unwrap();
        assert!(output.is_live());
    }
}
