//! Monetary figure extraction from free-form tool text
//!
//! Pricing tools and documentation search answer in prose. The
//! [`PatternPriceExtractor`] tries a list of patterns in priority order and
//! returns the first figure found; no match is a normal outcome and callers
//! fall through to their next tier. The heuristic sits behind
//! [`PriceExtractor`] so a structured parser can replace it.

use regex::Regex;
use std::sync::LazyLock;

/// Average hours in a month, used to project hourly rates
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Projected monthly figures above this are taken to be monthly already
pub const DEFAULT_MONTHLY_CEILING: f64 = 5000.0;

const AMOUNT: &str = r"(\d[\d,]*(?:\.\d+)?)";
const MONTHLY: &str = r"(?:/\s*mo(?:nth)?\b|per\s+month|a\s+month|monthly|/\s*month)";
const HOURLY: &str = r"(?:/\s*h(?:ou)?r\b|per\s+hour|an\s+hour|hourly)";

fn pattern(source: String) -> Regex {
    Regex::new(&format!("(?i){source}")).expect("price pattern")
}

static MONTHLY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(format!(r"\$\s?{AMOUNT}\s*(?:USD\s*)?{MONTHLY}")),
        pattern(format!(r"(?:monthly|per\s+month)[^$\d\n]{{0,40}}\$\s?{AMOUNT}")),
        pattern(format!(r"{AMOUNT}\s*(?:USD|dollars)\s*{MONTHLY}")),
    ]
});

static HOURLY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(format!(r"\$\s?{AMOUNT}\s*(?:USD\s*)?{HOURLY}")),
        pattern(format!(r"{AMOUNT}\s*(?:USD|dollars)\s*{HOURLY}")),
        pattern(format!(r"(?:hourly|per\s+hour)[^$\d\n]{{0,40}}\$\s?{AMOUNT}")),
    ]
});

static CURRENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(format!(r"\$\s?{AMOUNT}")),
        pattern(format!(r"{AMOUNT}\s*(?:USD|dollars)\b")),
    ]
});

/// Pulls monetary figures out of text
pub trait PriceExtractor: Send + Sync {
    /// A monthly figure, preferring amounts tied to monthly qualifiers
    fn monthly_price(&self, text: &str) -> Option<f64>;

    /// An hourly figure, preferring amounts tied to hourly qualifiers
    fn hourly_price(&self, text: &str) -> Option<f64>;
}

/// Regex-based extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternPriceExtractor;

impl PatternPriceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PriceExtractor for PatternPriceExtractor {
    fn monthly_price(&self, text: &str) -> Option<f64> {
        first_match(&MONTHLY_PATTERNS, text).or_else(|| first_match(&CURRENCY_PATTERNS, text))
    }

    fn hourly_price(&self, text: &str) -> Option<f64> {
        first_match(&HOURLY_PATTERNS, text).or_else(|| first_match(&CURRENCY_PATTERNS, text))
    }
}

/// Project an hourly rate to a month.
///
/// A projection above `ceiling` means the figure was not hourly after all, so
/// the raw value is returned as the monthly figure.
pub fn project_monthly(hourly: f64, ceiling: f64) -> f64 {
    let projected = hourly * HOURS_PER_MONTH;
    if projected > ceiling { hourly } else { projected }
}

/// Parse "1,234.50" style amounts. Zero and negative amounts are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn first_match(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| parse_amount(m.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Extraction is heuristic; every test that expects a figure has a
    // sibling expecting `None` for text without one.

    #[test]
    fn test_monthly_qualifier_wins_over_earlier_figure() {
        let text = "Setup fee $5.00. Running cost is about $67.52 per month.";
        assert_eq!(PatternPriceExtractor.monthly_price(text), Some(67.52));
    }

    #[test]
    fn test_monthly_prefix_form() {
        let text = "Estimated monthly total: $1,204.80 for this configuration";
        assert_eq!(PatternPriceExtractor.monthly_price(text), Some(1204.80));
    }

    #[test]
    fn test_currency_suffix_form() {
        assert_eq!(PatternPriceExtractor.monthly_price("roughly 42 USD/month"), Some(42.0));
        assert_eq!(PatternPriceExtractor.monthly_price("about 18.5 dollars a month"), Some(18.5));
    }

    #[test]
    fn test_any_currency_marked_number() {
        assert_eq!(PatternPriceExtractor.monthly_price("costs $12 overall"), Some(12.0));
    }

    #[test]
    fn test_no_figure() {
        assert_eq!(PatternPriceExtractor.monthly_price("Pricing varies by usage."), None);
        assert_eq!(PatternPriceExtractor.hourly_price("t3 instances are burstable"), None);
        assert_eq!(PatternPriceExtractor.monthly_price("$0 upfront"), None);
    }

    #[test]
    fn test_hourly_extraction() {
        let text = "On-Demand: $0.0416 per hour. Storage $0.10 per GB-month.";
        assert_eq!(PatternPriceExtractor.hourly_price(text), Some(0.0416));
        assert_eq!(PatternPriceExtractor.hourly_price("0.192 USD/hr"), Some(0.192));
    }

    #[test]
    fn test_project_monthly() {
        assert!((project_monthly(0.0416, DEFAULT_MONTHLY_CEILING) - 30.368).abs() < 1e-9);
        // 25 * 730 = 18250 is implausible for an hourly rate
        assert_eq!(project_monthly(25.0, DEFAULT_MONTHLY_CEILING), 25.0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.5"), Some(1234.5));
        assert_eq!(parse_amount("$ 3"), Some(3.0));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
