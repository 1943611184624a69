//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — truncation and formatting helpers used in log lines

pub mod error;
pub mod string;
