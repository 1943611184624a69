//! Catalog source port
//!
//! Where the authoritative service catalog comes from. The resolver falls
//! back to its curated table whenever a fetch fails.

use advisor_domain::ServiceCatalog;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching the remote catalog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog fetch timed out")]
    Timeout,

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed catalog: {0}")]
    Malformed(String),
}

/// Source of the remote service catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog
    async fn fetch(&self) -> Result<ServiceCatalog, CatalogError>;
}
