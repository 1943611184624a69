//! Domain layer for aws-advisor-gateway
//!
//! This crate contains the pure types and algorithms of the tool gateway and
//! cost estimator. It has no dependencies on I/O, async runtimes or
//! configuration files.
//!
//! # Core Concepts
//!
//! ## Request cache
//!
//! [`RequestCache`] memoizes any named operation for a bounded time, keyed by
//! a digest of the operation and its arguments.
//!
//! ## Service catalog
//!
//! [`ServiceCatalog`] maps display names ("amazon ec2") to canonical pricing
//! codes ("AmazonEC2"), backed by an [`AliasTable`] for abbreviations.
//!
//! ## Tool servers and tools
//!
//! [`ToolServerState`] tracks what the latest probe learned about a server;
//! [`ToolInvocation`] and [`ToolOutput`] describe calls and their results.
//!
//! ## Pricing
//!
//! [`CostEstimate`] is the single output schema of every estimation tier.
//! The static tables in [`pricing::static_model`] guarantee an estimate can
//! always be produced.

pub mod cache;
pub mod catalog;
pub mod core;
pub mod pricing;
pub mod server;
pub mod tool;

// Re-export commonly used types
pub use cache::{
    key::{CacheArgs, CacheKey},
    store::{CacheEntry, CacheStats, RequestCache},
};
pub use catalog::{
    aliases::AliasTable,
    entities::{CatalogOrigin, ServiceCatalog, ServiceInfo, SubstringPolicy},
    fallback::static_catalog,
};
pub use core::error::DomainError;
pub use pricing::{
    entities::{CostEstimate, DEFAULT_REGION, EstimateSource, ServiceConfig},
    extraction::{PatternPriceExtractor, PriceExtractor},
};
pub use server::entities::{ConnectionStatus, ToolServerDescriptor, ToolServerState};
pub use tool::{
    entities::{RemoteTool, ToolInvocation, locate_tool},
    value_objects::{FallbackReason, Provenance, ToolOutput, ToolOutputMetadata},
};
