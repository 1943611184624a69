//! Service catalog adapters: remote price list source and the resolver

pub mod http_source;
pub mod resolver;

pub use http_source::{DEFAULT_FETCH_TIMEOUT, HttpCatalogSource, parse_offer_index};
pub use resolver::{DEFAULT_VALIDITY, ServiceCodeResolver};
