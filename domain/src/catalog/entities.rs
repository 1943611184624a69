//! Service catalog entities

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::aliases::AliasTable;
use crate::core::error::DomainError;
use crate::core::string::title_case;

/// Where the active catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    /// Fetched from the remote price list index
    Remote,
    /// Curated fallback table
    Static,
}

/// How a bidirectional substring match with several candidates is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstringPolicy {
    /// First candidate in catalog insertion order wins
    #[default]
    FirstMatch,
    /// More than one candidate counts as no match
    RejectAmbiguous,
}

/// A resolved service: display name plus canonical code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub display_name: String,
    pub code: String,
    /// The caller's original input, when resolved from a lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

/// Lowercase display name -> canonical pricing code, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCatalog {
    entries: IndexMap<String, String>,
    origin: CatalogOrigin,
}

impl ServiceCatalog {
    pub fn new(origin: CatalogOrigin) -> Self {
        Self {
            entries: IndexMap::new(),
            origin,
        }
    }

    /// Builder-style insert; names are normalized to trimmed lowercase.
    pub fn with_service(mut self, name: &str, code: impl Into<String>) -> Self {
        self.insert(name, code);
        self
    }

    pub fn insert(&mut self, name: &str, code: impl Into<String>) {
        let name = name.trim().to_lowercase();
        if !name.is_empty() {
            self.entries.insert(name, code.into());
        }
    }

    /// Parse the price list offer index (`{"offers": {<key>: {"offerCode", "serviceName"}}}`).
    ///
    /// Offers missing either field are skipped. A document without an
    /// `offers` object is rejected.
    pub fn from_offer_index(document: &serde_json::Value) -> Result<Self, DomainError> {
        let offers = document
            .get("offers")
            .and_then(|o| o.as_object())
            .ok_or_else(|| DomainError::InvalidCatalog("missing `offers` object".into()))?;

        let mut catalog = Self::new(CatalogOrigin::Remote);
        for offer in offers.values() {
            let name = offer.get("serviceName").and_then(|v| v.as_str());
            let code = offer.get("offerCode").and_then(|v| v.as_str());
            if let (Some(name), Some(code)) = (name, code)
                && !code.is_empty()
            {
                catalog.insert(name, code);
            }
        }
        Ok(catalog)
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn to_map(&self) -> IndexMap<String, String> {
        self.entries.clone()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.entries.values().any(|c| c == code)
    }

    /// Resolve a service name to its canonical code.
    ///
    /// Order: exact match, bidirectional substring match, alias then exact.
    pub fn find_code(
        &self,
        name: &str,
        aliases: &AliasTable,
        policy: SubstringPolicy,
    ) -> Option<&str> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(code) = self.entries.get(&needle) {
            return Some(code);
        }

        let mut candidates = self
            .entries
            .iter()
            .filter(|(catalog_name, _)| {
                catalog_name.contains(needle.as_str()) || needle.contains(catalog_name.as_str())
            });
        match policy {
            SubstringPolicy::FirstMatch => {
                if let Some((_, code)) = candidates.next() {
                    return Some(code);
                }
            }
            SubstringPolicy::RejectAmbiguous => {
                let first = candidates.next();
                let second = candidates.next();
                match (first, second) {
                    (Some((_, code)), None) => return Some(code),
                    (Some((a, _)), Some((b, _))) => {
                        tracing::debug!(input = %needle, first = %a, second = %b, "ambiguous substring match rejected");
                    }
                    _ => {}
                }
            }
        }

        aliases
            .resolve(&needle)
            .and_then(|display| self.entries.get(display))
            .map(String::as_str)
    }

    /// Display name (title case) of the first entry carrying `code`.
    pub fn display_name_for(&self, code: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(_, c)| c.as_str() == code)
            .map(|(name, _)| title_case(name))
    }

    /// Entries whose name contains `keyword`, sorted by display name.
    pub fn search(&self, keyword: &str) -> Vec<ServiceInfo> {
        let keyword = keyword.trim().to_lowercase();
        let mut results: Vec<ServiceInfo> = self
            .entries
            .iter()
            .filter(|(name, _)| name.contains(keyword.as_str()))
            .map(|(name, code)| ServiceInfo {
                display_name: title_case(name),
                code: code.clone(),
                search_term: None,
            })
            .collect();
        results.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        results
    }
}
