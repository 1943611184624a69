//! Tool server descriptors and per-server connection state

pub mod entities;
