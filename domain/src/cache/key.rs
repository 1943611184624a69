//! Cache key derivation
//!
//! A [`CacheKey`] is the SHA-256 digest of an operation name plus a canonical
//! serialization of its arguments. Keyword arguments live in a `BTreeMap`, so
//! the order in which callers supply them never changes the key.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Positional and keyword arguments of a cached operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CacheArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Canonical serialization: `[positional, {sorted keywords}]`.
    ///
    /// `serde_json::Map` is ordered by key, so nested objects are canonical too.
    pub fn canonical(&self) -> String {
        let keyword: serde_json::Map<String, Value> = self
            .keyword
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Array(vec![
            Value::Array(self.positional.clone()),
            Value::Object(keyword),
        ])
        .to_string()
    }
}

/// Fixed-width (64 hex chars) cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `operation` called with `args`.
    pub fn derive(operation: &str, args: &CacheArgs) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(operation.as_bytes());
        // NUL separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
        hasher.update(args.canonical().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
