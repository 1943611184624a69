//! Estimate Cost use case.
//!
//! [`CostEstimationEngine`] produces a [`CostEstimate`] for any well-formed
//! [`ServiceConfig`] by escalating through tiers until one succeeds:
//!
//! ```text
//! cache ─▶ resolve code ─▶ tool_api ─▶ tool_web ─▶ documentation ─▶ static_fallback
//!               │                                        ▲
//!               └──── unresolved (pseudo-code) ──────────┘
//! ```
//!
//! Each tier is strictly less authoritative than the one before it. The
//! static tier is pure computation, so `estimate` always returns.

use crate::config::EstimationParams;
use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};
use crate::ports::service_lookup::ServiceCodeLookup;
use crate::ports::tool_gateway::ToolGatewayPort;
use advisor_domain::core::string::truncate;
use advisor_domain::pricing::extraction::{HOURS_PER_MONTH, project_monthly};
use advisor_domain::pricing::normalize::{advice_from_text, reduction_from_text, structured_monthly_cost};
use advisor_domain::pricing::static_model::{static_advice, static_estimate};
use advisor_domain::{
    CacheArgs, CostEstimate, EstimateSource, PatternPriceExtractor, PriceExtractor, RequestCache,
    ServiceConfig, ToolInvocation, ToolOutput,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache operation name for estimates
pub const ESTIMATE_OPERATION: &str = "estimate_cost";

/// Pseudo-code used when the service name is blank
const UNKNOWN_SERVICE: &str = "UNKNOWN";

/// Length of tool text quoted in `detail`
const DETAIL_EXCERPT_LEN: usize = 160;

/// Use case for estimating the monthly cost of a service configuration.
pub struct CostEstimationEngine {
    cache: Arc<RequestCache>,
    lookup: Arc<dyn ServiceCodeLookup>,
    gateway: Arc<dyn ToolGatewayPort>,
    extractor: Arc<dyn PriceExtractor>,
    logger: Arc<dyn InvocationLogger>,
    params: EstimationParams,
}

impl CostEstimationEngine {
    pub fn new(
        cache: Arc<RequestCache>,
        lookup: Arc<dyn ServiceCodeLookup>,
        gateway: Arc<dyn ToolGatewayPort>,
        params: EstimationParams,
    ) -> Self {
        Self {
            cache,
            lookup,
            gateway,
            extractor: Arc::new(PatternPriceExtractor::new()),
            logger: Arc::new(NoInvocationLogger),
            params,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn PriceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &EstimationParams {
        &self.params
    }

    /// Estimate the monthly cost of `config`. Never fails.
    pub fn estimate(&self, config: &ServiceConfig) -> CostEstimate {
        let args = cache_args(config);
        if let Some(cached) = self.cache.get_as::<CostEstimate>(ESTIMATE_OPERATION, &args) {
            debug!(service = %config.service_name, source = %cached.source, "estimate served from cache");
            return cached;
        }

        let estimate = match self.lookup.find_service_code(&config.service_name) {
            Some(code) => self
                .tool_api_tier(&code, config)
                .or_else(|| self.tool_web_tier(&code, config))
                .or_else(|| self.documentation_tier(&code, config))
                .unwrap_or_else(|| static_estimate(&code, config)),
            None => {
                let pseudo = pseudo_code(&config.service_name);
                info!(
                    service = %config.service_name,
                    pseudo_code = %pseudo,
                    "service code unresolved, skipping pricing tools"
                );
                self.documentation_tier(&pseudo, config)
                    .unwrap_or_else(|| static_estimate(&pseudo, config))
            }
        };

        if estimate.source == EstimateSource::StaticFallback {
            warn!(service = %config.service_name, "all pricing tiers failed, using static estimate");
        }

        let ttl = if estimate.source.is_tool_derived() {
            self.params.tool_ttl
        } else {
            self.params.static_ttl
        };
        self.cache
            .set_serialized(ESTIMATE_OPERATION, &estimate, Some(ttl), &args);

        self.logger.log(InvocationEvent::new(
            "estimate",
            json!({
                "service": config.service_name,
                "region": config.effective_region(),
                "instance_type": config.effective_instance_type(),
                "source": estimate.source.as_str(),
                "monthly_cost": estimate.monthly_cost,
            }),
        ));
        estimate
    }

    // ==================== Tiers ====================

    /// Structured pricing API: a numeric field in the response.
    fn tool_api_tier(&self, code: &str, config: &ServiceConfig) -> Option<CostEstimate> {
        let source = EstimateSource::ToolApi;
        let invocation = ToolInvocation::new(&self.params.pricing_server, &self.params.pricing_api_tool)
            .with_arg("service_code", code)
            .with_arg("region", config.effective_region())
            .with_optional_arg("instance_type", config.effective_instance_type());

        let output = self.live_output(source, code, &invocation)?;
        let Some(cost) = structured_monthly_cost(&output.content) else {
            self.tier_failed(source, code, "no numeric cost in response");
            return None;
        };

        let detail = format!(
            "{code} in {}: ${cost:.2}/month from {}/{}",
            config.effective_region(),
            invocation.server_name,
            invocation.tool_name
        );
        Some(self.tool_estimate(source, cost, code, config, &output.text(), detail))
    }

    /// Web-search pricing: a monetary figure in free text.
    fn tool_web_tier(&self, code: &str, config: &ServiceConfig) -> Option<CostEstimate> {
        let source = EstimateSource::ToolWeb;
        let invocation = ToolInvocation::new(&self.params.pricing_server, &self.params.pricing_web_tool)
            .with_arg("query", pricing_query(config))
            .with_arg("service_code", code)
            .with_arg("region", config.effective_region());

        let output = self.live_output(source, code, &invocation)?;
        let text = output.text();
        let Some(cost) = self.extractor.monthly_price(&text) else {
            self.tier_failed(source, code, "no monetary figure in search result");
            return None;
        };

        let detail = format!(
            "{code} in {}: ${cost:.2}/month from pricing search ({})",
            config.effective_region(),
            truncate(text.trim(), DETAIL_EXCERPT_LEN)
        );
        Some(self.tool_estimate(source, cost, code, config, &text, detail))
    }

    /// Documentation search: an hourly rate projected to a month.
    fn documentation_tier(&self, code: &str, config: &ServiceConfig) -> Option<CostEstimate> {
        let source = EstimateSource::Documentation;
        let query = match config.effective_instance_type() {
            Some(instance) => format!("{code} {instance} pricing per hour {}", config.effective_region()),
            None => format!("{code} pricing per hour {}", config.effective_region()),
        };
        let invocation =
            ToolInvocation::new(&self.params.docs_server, &self.params.docs_tool).with_arg("query", query);

        let output = self.live_output(source, code, &invocation)?;
        let text = output.text();
        let Some(rate) = self.extractor.hourly_price(&text) else {
            self.tier_failed(source, code, "no rate in documentation");
            return None;
        };

        let read_as_monthly = rate * HOURS_PER_MONTH > self.params.monthly_ceiling;
        let cost = project_monthly(rate, self.params.monthly_ceiling);
        let note = if read_as_monthly {
            format!("Documented figure ${rate:.2} read as monthly; projection exceeded ${:.0}", self.params.monthly_ceiling)
        } else {
            format!("Projected from documented rate ${rate}/hour × 730 hours")
        };
        let detail = format!(
            "{code} in {}: ${cost:.2}/month derived from documentation",
            config.effective_region()
        );
        Some(
            self.tool_estimate(source, cost, code, config, &text, detail)
                .with_note(note),
        )
    }

    // ==================== Helpers ====================

    /// Invoke and accept only a live answer; fallback output is a tier failure.
    fn live_output(&self, source: EstimateSource, code: &str, invocation: &ToolInvocation) -> Option<ToolOutput> {
        match self.gateway.invoke(invocation) {
            Some(output) if output.is_live() => Some(output),
            Some(output) => {
                let reason = output
                    .metadata
                    .fallback_reason
                    .map_or_else(|| "fallback output".to_string(), |r| r.to_string());
                self.tier_failed(source, code, &reason);
                None
            }
            None => {
                self.tier_failed(source, code, "no tool or fallback handler");
                None
            }
        }
    }

    fn tier_failed(&self, source: EstimateSource, code: &str, reason: &str) {
        debug!(tier = %source, code, reason, "estimation tier failed");
        self.logger.log(InvocationEvent::new(
            "estimate_tier",
            json!({
                "tier": source.as_str(),
                "code": code,
                "outcome": "failed",
                "reason": reason,
            }),
        ));
    }

    /// Build a tool-derived estimate, preferring advice found in the tool text.
    fn tool_estimate(
        &self,
        source: EstimateSource,
        cost: f64,
        code: &str,
        config: &ServiceConfig,
        text: &str,
        detail: String,
    ) -> CostEstimate {
        let (synth_advice, synth_rate) = static_advice(code, config.effective_instance_type());
        let advice = advice_from_text(text).unwrap_or(synth_advice);
        let rate = reduction_from_text(text).unwrap_or(synth_rate);

        info!(tier = %source, code, monthly_cost = cost, "estimate produced");
        CostEstimate::new(source, cost)
            .with_detail(detail)
            .with_advice(advice, rate)
            .with_current_state(config.describe())
    }
}

/// Cache key arguments: `(service_name, instance_type, region)`
fn cache_args(config: &ServiceConfig) -> CacheArgs {
    CacheArgs::new()
        .arg(config.service_name.trim().to_lowercase())
        .kwarg("instance_type", config.effective_instance_type())
        .kwarg("region", config.effective_region())
}

fn pseudo_code(service_name: &str) -> String {
    match service_name.trim() {
        "" => UNKNOWN_SERVICE.to_string(),
        name => name.to_uppercase(),
    }
}

fn pricing_query(config: &ServiceConfig) -> String {
    format!("AWS {} pricing per month", config.describe())
}
