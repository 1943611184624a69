//! Service catalog: display names, canonical pricing codes and aliases
//!
//! The catalog maps human-readable service names ("amazon ec2") to the codes
//! the pricing catalog uses ("AmazonEC2"). Lookups go through three stages:
//!
//! 1. exact, case-insensitive match
//! 2. bidirectional substring match, in catalog insertion order
//! 3. alias table ("alb" -> "elastic load balancing"), then exact match
//!
//! Population (remote fetch vs. [`fallback::static_catalog`]) is handled by the
//! resolver in the infrastructure layer.

pub mod aliases;
pub mod entities;
pub mod fallback;
