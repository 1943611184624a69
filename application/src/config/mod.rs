//! Application-level configuration.
//!
//! - [`EstimationParams`] — which tools each estimation tier calls, cache TTLs
//!   and the monthly plausibility ceiling
//! - [`tool_names`] — identifiers of the tool servers the advisor knows about

pub mod estimation_params;
pub mod tool_names;

pub use estimation_params::EstimationParams;
