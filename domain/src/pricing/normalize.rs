//! Normalization of heterogeneous pricing tool answers
//!
//! Structured pricing APIs return a number under one of several field names,
//! sometimes nested, sometimes JSON encoded inside a string, sometimes as an
//! hourly rate. [`structured_monthly_cost`] finds the first usable figure.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::extraction::{HOURS_PER_MONTH, parse_amount};
use crate::core::string::truncate;

const MONTHLY_FIELDS: &[&str] = &[
    "monthly_cost",
    "monthlyCost",
    "estimated_monthly_cost",
    "total_monthly_cost",
    "monthly",
    "cost",
    "price",
];

const HOURLY_FIELDS: &[&str] = &["hourly_cost", "hourlyCost", "price_per_hour", "hourly", "pricePerUnit"];

const NESTED_FIELDS: &[&str] = &["data", "result", "pricing", "content", "text"];

/// Deepest nesting followed before giving up
const MAX_DEPTH: usize = 4;

const ADVICE_KEYWORDS: &[&str] = &[
    "reserved",
    "savings plan",
    "spot",
    "right-siz",
    "rightsiz",
    "graviton",
    "optimi",
    "lifecycle",
    "tier",
    "reduce",
    "save",
];

const MAX_ADVICE_LEN: usize = 300;

static SAVING_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:save|saving|savings|discount|reduc\w*|lower)\D{0,40}?(\d{1,2}(?:\.\d+)?)\s*%")
        .expect("saving percent regex")
});

static SENTENCE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n+").expect("sentence regex"));

/// Monthly cost from a structured pricing answer, if one is present.
pub fn structured_monthly_cost(content: &Value) -> Option<f64> {
    cost_at_depth(content, 0)
}

fn cost_at_depth(content: &Value, depth: usize) -> Option<f64> {
    if depth > MAX_DEPTH {
        return None;
    }
    match content {
        Value::Object(map) => {
            if let Some(monthly) = MONTHLY_FIELDS.iter().find_map(|f| map.get(*f).and_then(amount)) {
                return Some(monthly);
            }
            if let Some(hourly) = HOURLY_FIELDS.iter().find_map(|f| map.get(*f).and_then(amount)) {
                return Some(hourly * HOURS_PER_MONTH);
            }
            NESTED_FIELDS
                .iter()
                .filter_map(|f| map.get(*f))
                .find_map(|nested| cost_at_depth(nested, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|item| cost_at_depth(item, depth + 1)),
        // JSON documents encoded as text
        Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(decoded @ (Value::Object(_) | Value::Array(_))) => cost_at_depth(&decoded, depth + 1),
            _ => None,
        },
        _ => None,
    }
}

/// A positive amount from a number, a numeric string or a `{"USD": ...}` object
fn amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v > 0.0),
        Value::String(s) => parse_amount(s),
        Value::Object(map) => map.get("USD").or_else(|| map.get("usd")).and_then(amount),
        _ => None,
    }
}

/// Up to two sentences of optimization advice found in tool text
pub fn advice_from_text(text: &str) -> Option<String> {
    let sentences: Vec<&str> = SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            s.len() > 10 && ADVICE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(2)
        .collect();

    if sentences.is_empty() {
        None
    } else {
        Some(truncate(&format!("{}.", sentences.join(". ")), MAX_ADVICE_LEN))
    }
}

/// Saving rate mentioned in tool text ("save up to 72%"), as a fraction
pub fn reduction_from_text(text: &str) -> Option<f64> {
    SAVING_PERCENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|pct| (pct / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_monthly_field() {
        assert_eq!(structured_monthly_cost(&json!({"monthly_cost": 61.2})), Some(61.2));
        assert_eq!(structured_monthly_cost(&json!({"cost": "$1,020.00"})), Some(1020.0));
    }

    #[test]
    fn test_hourly_field_is_projected() {
        let cost = structured_monthly_cost(&json!({"pricePerUnit": {"USD": "0.0104"}})).unwrap();
        assert!((cost - 7.592).abs() < 1e-9);
    }

    #[test]
    fn test_nested_and_encoded_answers() {
        assert_eq!(
            structured_monthly_cost(&json!({"status": "ok", "data": {"pricing": {"monthly": 12}}})),
            Some(12.0)
        );
        assert_eq!(
            structured_monthly_cost(&json!([{"type": "text", "text": "{\"monthly_cost\": 9.5}"}])),
            Some(9.5)
        );
    }

    #[test]
    fn test_unusable_answers() {
        assert_eq!(structured_monthly_cost(&json!({"monthly_cost": 0})), None);
        assert_eq!(structured_monthly_cost(&json!({"monthly_cost": "n/a"})), None);
        assert_eq!(structured_monthly_cost(&json!("Pricing varies")), None);
        assert_eq!(structured_monthly_cost(&Value::Null), None);
    }

    #[test]
    fn test_advice_from_text() {
        let text = "EC2 pricing depends on region. Consider Reserved Instances for steady workloads! \
                    Spot capacity can cut batch costs. Data transfer is billed separately.";
        let advice = advice_from_text(text).unwrap();
        assert!(advice.starts_with("Consider Reserved Instances"));
        assert!(advice.contains("Spot capacity"));
        assert!(!advice.contains("Data transfer"));
        assert_eq!(advice_from_text("Pricing is per hour"), None);
    }

    #[test]
    fn test_reduction_from_text() {
        assert_eq!(reduction_from_text("Savings Plans save up to 72% over On-Demand"), Some(0.72));
        assert_eq!(reduction_from_text("a discount of 40 % applies"), Some(0.40));
        assert_eq!(reduction_from_text("prices rose 10%"), None);
    }
}
