//! Caller-facing entry point
//!
//! [`CostAdvisor`] wires the cache, resolver, tool server registry, gateway
//! and estimation engine together from a [`FileConfig`]. The only piece the
//! host supplies is the [`ToolConnector`] that speaks the tool protocol.

use crate::catalog::{HttpCatalogSource, ServiceCodeResolver};
use crate::config::FileConfig;
use crate::gateway::{FallbackGap, FallbackRegistry, ToolGateway};
use crate::logging::invocation_logger;
use crate::servers::ToolServerRegistry;
use advisor_application::{CostEstimationEngine, ToolConnector};
use advisor_domain::{
    CacheStats, CostEstimate, RequestCache, ServiceConfig, ToolInvocation, ToolOutput,
    ToolServerState,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct CostAdvisor {
    cache: Arc<RequestCache>,
    registry: Arc<ToolServerRegistry>,
    resolver: Arc<ServiceCodeResolver>,
    gateway: Arc<ToolGateway>,
    engine: CostEstimationEngine,
}

impl CostAdvisor {
    /// Build every component from configuration.
    ///
    /// Server definitions are loaded, but no server is contacted until
    /// [`initialize`](Self::initialize).
    pub fn from_config(config: &FileConfig, connector: Arc<dyn ToolConnector>) -> Self {
        let logger = invocation_logger(&config.logging);
        let cache = Arc::new(RequestCache::with_ttl(config.cache_ttl()));

        let registry = ToolServerRegistry::new(connector)
            .with_enumeration_timeout(config.gateway.enumeration_timeout())
            .with_launcher_check(config.gateway.check_launchers);
        if let Some(path) = &config.gateway.servers_file {
            registry.load_config(path);
        }
        let registry = Arc::new(registry);

        let gateway = config.gateway.tool_timeouts().fold(
            ToolGateway::new(Arc::clone(&registry), FallbackRegistry::with_builtin_handlers())
                .with_logger(Arc::clone(&logger))
                .with_default_timeout(config.gateway.invocation_timeout()),
            |gateway, (tool, timeout)| gateway.with_tool_timeout(tool, timeout),
        );
        let gateway = Arc::new(gateway);

        let resolver = Arc::new(
            Self::resolver_for(config)
                .with_policy(config.catalog.substring_policy)
                .with_validity(Duration::from_secs(config.catalog.validity_hours * 60 * 60))
                .with_fetch_timeout(Duration::from_secs(config.catalog.fetch_timeout_secs)),
        );

        let engine = CostEstimationEngine::new(
            Arc::clone(&cache),
            resolver.clone(),
            gateway.clone(),
            config.estimation.to_params(),
        )
        .with_logger(logger);

        Self {
            cache,
            registry,
            resolver,
            gateway,
            engine,
        }
    }

    fn resolver_for(config: &FileConfig) -> ServiceCodeResolver {
        if config.catalog.offline {
            return ServiceCodeResolver::offline();
        }
        let timeout = Duration::from_secs(config.catalog.fetch_timeout_secs);
        match HttpCatalogSource::new(&config.catalog.url, timeout) {
            Ok(source) => ServiceCodeResolver::new(Arc::new(source)),
            Err(e) => {
                warn!(error = %e, "Catalog source unavailable; using static catalog");
                ServiceCodeResolver::offline()
            }
        }
    }

    /// Probe the tool servers and report fallback handler gaps.
    ///
    /// Returns whether any server is available.
    pub fn initialize(&self) -> bool {
        let available = self.registry.initialize();
        let gaps: Vec<FallbackGap> = self.gateway.validate_fallbacks();
        info!(available, fallback_gaps = gaps.len(), "Cost advisor initialized");
        available
    }

    /// Monthly cost estimate for one service. Never fails.
    pub fn estimate(
        &self,
        service: &str,
        region: &str,
        instance_type: Option<&str>,
        usage_details: Option<&str>,
    ) -> CostEstimate {
        let mut config = ServiceConfig::new(service, region);
        if let Some(instance_type) = instance_type {
            config = config.with_instance_type(instance_type);
        }
        if let Some(usage_details) = usage_details {
            config = config.with_usage_details(usage_details);
        }
        self.engine.estimate(&config)
    }

    pub fn estimate_config(&self, config: &ServiceConfig) -> CostEstimate {
        self.engine.estimate(config)
    }

    /// Call a tool by server and tool name with keyword parameters
    pub fn invoke(&self, server: &str, tool: &str, params: Map<String, Value>) -> Option<ToolOutput> {
        let invocation = params
            .into_iter()
            .fold(ToolInvocation::new(server, tool), |call, (key, value)| {
                call.with_arg(key, value)
            });
        self.gateway.invoke(&invocation)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn server_status(&self) -> IndexMap<String, ToolServerState> {
        self.registry.status()
    }

    pub fn available_servers(&self) -> Vec<String> {
        self.registry.available_servers()
    }

    pub fn resolver(&self) -> &ServiceCodeResolver {
        &self.resolver
    }
}
