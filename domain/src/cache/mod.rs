//! Request memoization
//!
//! - [`key`] — order-independent argument canonicalization and SHA-256 keys
//! - [`store`] — the TTL-keyed [`RequestCache`](store::RequestCache)

pub mod key;
pub mod store;
