//! Estimation input and output types

use serde::{Deserialize, Serialize};

/// Region assumed when the caller leaves it blank
pub const DEFAULT_REGION: &str = "us-east-1";

/// Caller input for a cost estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_details: Option<String>,
}

impl ServiceConfig {
    pub fn new(service_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            region: region.into(),
            instance_type: None,
            usage_details: None,
        }
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    pub fn with_usage_details(mut self, usage_details: impl Into<String>) -> Self {
        self.usage_details = Some(usage_details.into());
        self
    }

    /// Trimmed region, or [`DEFAULT_REGION`] when blank
    pub fn effective_region(&self) -> &str {
        match self.region.trim() {
            "" => DEFAULT_REGION,
            region => region,
        }
    }

    /// Instance type with blank values treated as absent
    pub fn effective_instance_type(&self) -> Option<&str> {
        self.instance_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// One-line description used as `current_state` and in search queries
    pub fn describe(&self) -> String {
        match self.effective_instance_type() {
            Some(instance) => format!(
                "{} ({}) in {}",
                self.service_name.trim(),
                instance,
                self.effective_region()
            ),
            None => format!("{} in {}", self.service_name.trim(), self.effective_region()),
        }
    }
}

/// Which tier produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    ToolApi,
    ToolWeb,
    Documentation,
    StaticFallback,
}

impl EstimateSource {
    pub fn as_str(&self) -> &str {
        match self {
            EstimateSource::ToolApi => "tool_api",
            EstimateSource::ToolWeb => "tool_web",
            EstimateSource::Documentation => "documentation",
            EstimateSource::StaticFallback => "static_fallback",
        }
    }

    /// Prices fetched from a live pricing tool
    pub fn is_tool_derived(&self) -> bool {
        matches!(self, EstimateSource::ToolApi | EstimateSource::ToolWeb)
    }
}

impl std::fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized estimate returned by every tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub monthly_cost: f64,
    pub detail: String,
    pub optimization_advice: String,
    pub current_state: String,
    pub reduction_rate: f64,
    pub source: EstimateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CostEstimate {
    /// Start an estimate. Negative or non-finite costs clamp to zero.
    pub fn new(source: EstimateSource, monthly_cost: f64) -> Self {
        Self {
            monthly_cost: clamp_cost(monthly_cost),
            detail: String::new(),
            optimization_advice: String::new(),
            current_state: String::new(),
            reduction_rate: 0.0,
            source,
            note: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_advice(mut self, advice: impl Into<String>, reduction_rate: f64) -> Self {
        self.optimization_advice = advice.into();
        self.reduction_rate = clamp_rate(reduction_rate);
        self
    }

    pub fn with_current_state(mut self, current_state: impl Into<String>) -> Self {
        self.current_state = current_state.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Expected monthly saving if the advice is applied
    pub fn monthly_savings(&self) -> f64 {
        self.monthly_cost * self.reduction_rate
    }
}

fn clamp_cost(cost: f64) -> f64 {
    if cost.is_finite() { cost.max(0.0) } else { 0.0 }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 }
}
