//! Tool server registry
//!
//! Owns the configured [`ToolServerDescriptor`]s, the per-server
//! [`ToolServerState`] learned by probing, and the flat list of enumerated
//! tools. All public operations are synchronous; enumeration runs on a
//! private runtime through [`block_on_isolated`].

use crate::config::load_server_file;
use crate::runtime::block_on_isolated;
use advisor_application::{ConnectorError, ToolConnector};
use advisor_domain::{RemoteTool, ToolServerDescriptor, ToolServerState};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Default timeout for enumerating a server's tools
pub const DEFAULT_ENUMERATION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ToolServerRegistry {
    connector: Arc<dyn ToolConnector>,
    descriptors: RwLock<IndexMap<String, ToolServerDescriptor>>,
    states: RwLock<IndexMap<String, ToolServerState>>,
    tools: RwLock<Vec<RemoteTool>>,
    /// Serializes initialize / probe_all
    probe_lock: Mutex<()>,
    enumeration_timeout: Duration,
    check_launchers: bool,
}

impl ToolServerRegistry {
    pub fn new(connector: Arc<dyn ToolConnector>) -> Self {
        Self {
            connector,
            descriptors: RwLock::new(IndexMap::new()),
            states: RwLock::new(IndexMap::new()),
            tools: RwLock::new(Vec::new()),
            probe_lock: Mutex::new(()),
            enumeration_timeout: DEFAULT_ENUMERATION_TIMEOUT,
            check_launchers: true,
        }
    }

    pub fn with_enumeration_timeout(mut self, timeout: Duration) -> Self {
        self.enumeration_timeout = timeout;
        self
    }

    /// Require each server's launcher on PATH before spawning it
    pub fn with_launcher_check(mut self, enabled: bool) -> Self {
        self.check_launchers = enabled;
        self
    }

    pub fn with_servers(self, servers: impl IntoIterator<Item = ToolServerDescriptor>) -> Self {
        self.register_servers(servers);
        self
    }

    /// Load server definitions from `path`, replacing the current set.
    ///
    /// A missing or malformed file is logged and yields an empty map.
    pub fn load_config(&self, path: &Path) -> IndexMap<String, ToolServerDescriptor> {
        let descriptors = match load_server_file(path) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!(error = %e, "Tool server config unusable; no servers configured");
                IndexMap::new()
            }
        };
        self.register_servers(descriptors.values().cloned());
        descriptors
    }

    /// Replace the configured servers. Disabled descriptors get no state.
    pub fn register_servers(&self, servers: impl IntoIterator<Item = ToolServerDescriptor>) {
        let mut descriptors = IndexMap::new();
        let mut states = IndexMap::new();
        for descriptor in servers {
            if descriptor.disabled {
                info!(server = %descriptor.name, "Tool server disabled; skipping");
            } else {
                states.insert(
                    descriptor.name.clone(),
                    ToolServerState::configured(descriptor.clone()),
                );
            }
            descriptors.insert(descriptor.name.clone(), descriptor);
        }
        info!(count = states.len(), "Registered tool servers");

        *self.descriptors.write().unwrap_or_else(PoisonError::into_inner) = descriptors;
        *self.states.write().unwrap_or_else(PoisonError::into_inner) = states;
        self.tools.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Bring every enabled server to a usable or diagnosed state.
    ///
    /// Returns whether at least one server is available afterwards.
    pub fn initialize(&self) -> bool {
        let _guard = self.probe_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.connector.is_available() {
            warn!("Tool runtime unavailable; all servers run in fallback mode");
            self.enter_fallback_mode();
            return !self.available_servers().is_empty();
        }

        let enabled = self.enabled_descriptors();
        if enabled.is_empty() {
            info!("No tool servers configured");
            return false;
        }

        match block_on_isolated(self.initialize_inner(enabled)) {
            Ok(()) => {}
            Err(e) => warn!(error = %e, "Tool server initialization aborted"),
        }
        let available = self.available_servers();
        info!(available = available.len(), "Tool server initialization finished");
        !available.is_empty()
    }

    /// Probe every enabled server individually, in order.
    ///
    /// Returns the number of servers that answered with at least one tool.
    pub fn probe_all(&self) -> usize {
        let _guard = self.probe_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let enabled = self.enabled_descriptors();
        match block_on_isolated(self.probe_servers(enabled)) {
            Ok(connected) => connected,
            Err(e) => {
                warn!(error = %e, "Tool server probing aborted");
                0
            }
        }
    }

    /// Snapshot of every enabled server's state
    pub fn status(&self) -> IndexMap<String, ToolServerState> {
        self.states.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn state(&self, server: &str) -> Option<ToolServerState> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server)
            .cloned()
    }

    /// Names of servers that can currently serve calls (initialized)
    pub fn available_servers(&self) -> Vec<String> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|state| state.initialized)
            .map(|state| state.name().to_string())
            .collect()
    }

    pub fn descriptor(&self, server: &str) -> Option<ToolServerDescriptor> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server)
            .cloned()
    }

    /// Names of configured, enabled servers
    pub fn server_names(&self) -> Vec<String> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// All enumerated tools, tagged with their server
    pub fn tools(&self) -> Vec<RemoteTool> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn connector(&self) -> Arc<dyn ToolConnector> {
        Arc::clone(&self.connector)
    }

    // ==================== Probing ====================

    async fn initialize_inner(&self, enabled: Vec<ToolServerDescriptor>) {
        let launchable = self.filter_launchable(enabled);
        if launchable.is_empty() {
            return;
        }

        let now = SystemTime::now();
        for descriptor in &launchable {
            self.update_state(&descriptor.name, |state| state.connecting(now));
        }

        let batch = tokio::time::timeout(
            self.enumeration_timeout,
            self.connector.list_tools(&launchable),
        )
        .await;

        match batch {
            Ok(Ok(tools)) if !tools.is_empty() && tools.iter().all(|t| t.server.is_some()) => {
                debug!(tools = tools.len(), "Batched tool enumeration succeeded");
                for descriptor in &launchable {
                    let own: Vec<RemoteTool> = tools
                        .iter()
                        .filter(|t| t.belongs_to(&descriptor.name))
                        .cloned()
                        .collect();
                    self.record_connected(&descriptor.name, own);
                }
            }
            Ok(Ok(_)) => {
                debug!("Batched enumeration lacks server affinity; probing individually");
                self.probe_servers(launchable).await;
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Batched enumeration failed; probing individually");
                self.probe_servers(launchable).await;
            }
            Err(_) => {
                debug!("Batched enumeration timed out; probing individually");
                self.probe_servers(launchable).await;
            }
        }
    }

    async fn probe_servers(&self, servers: Vec<ToolServerDescriptor>) -> usize {
        let mut connected = 0;
        for descriptor in self.filter_launchable(servers) {
            if self.probe_one(&descriptor).await {
                connected += 1;
            }
        }
        info!(connected, "Probed tool servers");
        connected
    }

    async fn probe_one(&self, descriptor: &ToolServerDescriptor) -> bool {
        let name = descriptor.name.as_str();
        self.update_state(name, |state| state.connecting(SystemTime::now()));

        let result = tokio::time::timeout(
            self.enumeration_timeout,
            self.connector.list_tools(std::slice::from_ref(descriptor)),
        )
        .await;

        match result {
            Ok(Ok(tools)) => {
                let tools: Vec<RemoteTool> = tools
                    .into_iter()
                    .map(|t| if t.server.is_some() { t } else { t.on_server(name) })
                    .filter(|t| t.belongs_to(name))
                    .collect();
                let has_tools = !tools.is_empty();
                self.record_connected(name, tools);
                has_tools
            }
            Ok(Err(ConnectorError::Timeout)) | Err(_) => {
                warn!(server = %name, timeout = ?self.enumeration_timeout, "Tool enumeration timed out");
                self.update_state(name, ToolServerState::timed_out);
                false
            }
            Ok(Err(e)) => {
                warn!(server = %name, error = %e, "Tool enumeration failed");
                self.update_state(name, |state| state.failed(e.to_string()));
                false
            }
        }
    }

    /// Marks servers whose launcher is missing as failed and drops them
    fn filter_launchable(&self, servers: Vec<ToolServerDescriptor>) -> Vec<ToolServerDescriptor> {
        if !self.check_launchers {
            return servers;
        }
        servers
            .into_iter()
            .filter(|descriptor| match which::which(&descriptor.command) {
                Ok(_) => true,
                Err(e) => {
                    warn!(
                        server = %descriptor.name,
                        command = %descriptor.command,
                        "Launcher not found; server not started"
                    );
                    let message = format!("launcher `{}` not found: {}", descriptor.command, e);
                    self.update_state(&descriptor.name, |state| {
                        state.connecting(SystemTime::now()).failed(message.clone())
                    });
                    false
                }
            })
            .collect()
    }

    fn record_connected(&self, server: &str, tools: Vec<RemoteTool>) {
        if tools.is_empty() {
            warn!(server = %server, "Tool server reported no tools");
        } else {
            info!(server = %server, tools = tools.len(), "Tool server connected");
        }
        let names: Vec<String> = tools.iter().map(|t| t.name.clone()).collect();
        self.update_state(server, |state| state.connected(names.clone()));

        let mut all = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        all.retain(|t| !t.belongs_to(server));
        all.extend(tools);
    }

    fn enter_fallback_mode(&self) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        for state in states.values_mut() {
            *state = ToolServerState::fallback(state.descriptor.clone());
        }
    }

    fn enabled_descriptors(&self) -> Vec<ToolServerDescriptor> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|state| state.descriptor.clone())
            .collect()
    }

    /// Swap in a new state value for `server`
    fn update_state(&self, server: &str, transition: impl FnOnce(&ToolServerState) -> ToolServerState) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = states.get(server) {
            let next = transition(current);
            states.insert(server.to_string(), next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_domain::ConnectionStatus;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Reply {
        Tools(Vec<&'static str>),
        Fail(ConnectorError),
        Hang,
    }

    /// Answers enumeration per server; batched calls succeed only when
    /// `batch` is set.
    struct FakeConnector {
        available: bool,
        batch: Option<Vec<RemoteTool>>,
        replies: Mutex<HashMap<String, Reply>>,
        list_calls: AtomicUsize,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self {
                available: true,
                batch: None,
                replies: Mutex::new(HashMap::new()),
                list_calls: AtomicUsize::new(0),
            }
        }

        fn reply(self, server: &str, reply: Reply) -> Self {
            self.replies.lock().unwrap().insert(server.to_string(), reply);
            self
        }

        fn set_reply(&self, server: &str, reply: Reply) {
            self.replies.lock().unwrap().insert(server.to_string(), reply);
        }
    }

    #[async_trait]
    impl ToolConnector for FakeConnector {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn list_tools(&self, servers: &[ToolServerDescriptor]) -> Result<Vec<RemoteTool>, ConnectorError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if servers.len() > 1 || self.batch.is_some() {
                return match &self.batch {
                    Some(tools) => Ok(tools.clone()),
                    None => Err(ConnectorError::Protocol("batch unsupported".into())),
                };
            }
            let reply = self.replies.lock().unwrap().get(&servers[0].name).cloned();
            match reply {
                Some(Reply::Tools(names)) => Ok(names.into_iter().map(RemoteTool::new).collect()),
                Some(Reply::Fail(e)) => Err(e),
                Some(Reply::Hang) => std::future::pending().await,
                None => Err(ConnectorError::ConnectionClosed),
            }
        }

        async fn call_tool(
            &self,
            _server: &ToolServerDescriptor,
            _tool: &RemoteTool,
            _arguments: &Value,
        ) -> Result<Value, ConnectorError> {
            Err(ConnectorError::ConnectionClosed)
        }
    }

    fn server(name: &str) -> ToolServerDescriptor {
        ToolServerDescriptor::new(name, "uvx").with_arg(format!("{name}@latest"))
    }

    fn registry(connector: FakeConnector, names: &[&str]) -> ToolServerRegistry {
        ToolServerRegistry::new(Arc::new(connector))
            .with_launcher_check(false)
            .with_enumeration_timeout(Duration::from_millis(50))
            .with_servers(names.iter().map(|n| server(n)))
    }

    #[test]
    fn test_unavailable_runtime_enters_fallback_mode() {
        let connector = FakeConnector {
            available: false,
            ..FakeConnector::new()
        };
        let registry = ToolServerRegistry::new(Arc::new(connector))
            .with_servers([server("pricing"), server("docs"), server("off").disabled()]);

        assert!(registry.initialize());
        assert_eq!(registry.available_servers(), vec!["pricing", "docs"]);
        let status = registry.status();
        assert!(status.values().all(|s| s.fallback_mode && s.initialized));
        assert!(!status.contains_key("off"));
        assert!(registry.descriptor("off").is_some());
    }

    #[test]
    fn test_initialize_falls_back_to_individual_probes() {
        let connector = FakeConnector::new()
            .reply("pricing", Reply::Tools(vec!["get_pricing_from_api", "get_pricing_from_web"]))
            .reply("docs", Reply::Tools(vec![]))
            .reply("terraform", Reply::Fail(ConnectorError::Spawn("exit 1".into())))
            .reply("core", Reply::Hang);
        let registry = registry(connector, &["pricing", "docs", "terraform", "core"]);

        assert!(registry.initialize());
        assert_eq!(registry.available_servers(), vec!["pricing"]);

        let status = registry.status();
        assert_eq!(status["pricing"].status, ConnectionStatus::Connected);
        assert!(status["pricing"].has_tool("get_pricing_from_web"));
        assert_eq!(status["docs"].status, ConnectionStatus::ConnectedNoTools);
        assert!(!status["docs"].initialized);
        assert_eq!(status["terraform"].status, ConnectionStatus::Failed);
        assert!(status["terraform"].last_error.as_deref().unwrap().contains("exit 1"));
        assert_eq!(status["core"].status, ConnectionStatus::Timeout);
        assert!(status.values().all(|s| s.last_attempt.is_some()));

        let tools = registry.tools();
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.belongs_to("pricing")));
    }

    #[test]
    fn test_initialize_uses_batched_enumeration_with_affinity() {
        let connector = FakeConnector {
            batch: Some(vec![
                RemoteTool::new("get_pricing_from_api").on_server("pricing"),
                RemoteTool::new("search_documentation").on_server("docs"),
            ]),
            ..FakeConnector::new()
        };
        let connector = Arc::new(connector);
        let registry = ToolServerRegistry::new(connector.clone())
            .with_launcher_check(false)
            .with_servers([server("pricing"), server("docs"), server("core")]);

        assert!(registry.initialize());
        assert_eq!(connector.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.available_servers(), vec!["pricing", "docs"]);
        assert_eq!(
            registry.state("core").unwrap().status,
            ConnectionStatus::ConnectedNoTools
        );
    }

    #[test]
    fn test_failed_reprobe_keeps_earlier_tools() {
        let connector = Arc::new(
            FakeConnector::new().reply("pricing", Reply::Tools(vec!["get_pricing_from_api"])),
        );
        let registry = ToolServerRegistry::new(connector.clone())
            .with_launcher_check(false)
            .with_servers([server("pricing")]);
        assert_eq!(registry.probe_all(), 1);

        connector.set_reply("pricing", Reply::Fail(ConnectorError::ConnectionClosed));
        assert_eq!(registry.probe_all(), 0);

        let state = registry.state("pricing").unwrap();
        assert_eq!(state.status, ConnectionStatus::Failed);
        assert!(state.initialized);
        assert!(state.has_tool("get_pricing_from_api"));
        assert_eq!(registry.tools().len(), 1);
        assert_eq!(registry.available_servers(), vec!["pricing"]);
    }

    #[test]
    fn test_missing_launcher_fails_without_spawning() {
        let connector = Arc::new(FakeConnector::new());
        let registry = ToolServerRegistry::new(connector.clone()).with_servers([
            ToolServerDescriptor::new("ghost", "definitely-not-a-real-launcher-7f3a"),
        ]);

        assert!(!registry.initialize());
        assert_eq!(connector.list_calls.load(Ordering::SeqCst), 0);
        let state = registry.state("ghost").unwrap();
        assert_eq!(state.status, ConnectionStatus::Failed);
        assert!(state.last_error.unwrap().contains("not found"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"mcpServers": {{"pricing": {{"command": "uvx", "args": ["pricing@latest"]}}}}}}"#
        )
        .unwrap();

        let registry = ToolServerRegistry::new(Arc::new(FakeConnector::new()));
        let loaded = registry.load_config(file.path());
        assert_eq!(loaded.len(), 1);
        assert_eq!(registry.server_names(), vec!["pricing"]);
        assert_eq!(
            registry.state("pricing").unwrap().status,
            ConnectionStatus::Configured
        );
    }

    #[test]
    fn test_load_config_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolServerRegistry::new(Arc::new(FakeConnector::new()))
            .with_servers([server("stale")]);
        let loaded = registry.load_config(&dir.path().join("absent.json"));
        assert!(loaded.is_empty());
        assert!(registry.server_names().is_empty());
        assert!(!registry.initialize());
    }

    #[tokio::test]
    async fn test_initialize_from_async_context() {
        let connector = FakeConnector::new().reply("docs", Reply::Tools(vec!["search_documentation"]));
        let registry = registry(connector, &["docs"]);
        assert!(registry.initialize());
        assert_eq!(registry.available_servers(), vec!["docs"]);
    }
}
