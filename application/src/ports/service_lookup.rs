//! Service code lookup port

/// Resolves human-readable service names to canonical pricing codes
pub trait ServiceCodeLookup: Send + Sync {
    /// Canonical code for `name`, if it resolves
    fn find_service_code(&self, name: &str) -> Option<String>;
}
