//! Cost estimation model: inputs, outputs, text extraction and static tables
//!
//! Everything here is pure computation. The tiered strategy that decides
//! which of these helpers to use lives in the application layer.

pub mod entities;
pub mod extraction;
pub mod normalize;
pub mod static_model;
