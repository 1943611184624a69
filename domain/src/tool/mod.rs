//! Tool domain module
//!
//! Types that describe calls to out-of-process tool servers and what comes
//! back from them.
//!
//! ```text
//! ┌────────────────┐    ┌────────────────┐    ┌────────────────┐
//! │ RemoteTool     │───▶│ ToolInvocation │───▶│ ToolOutput     │
//! │ (enumerated)   │    │ (server, tool, │    │ (live or       │
//! │                │    │  arguments)    │    │  fallback)     │
//! └────────────────┘    └────────────────┘    └────────────────┘
//! ```
//!
//! A [`ToolOutput`] with [`Provenance::Fallback`] was synthesized by a
//! handler after the live call was skipped or failed; its
//! [`FallbackReason`] says why.

pub mod entities;
pub mod value_objects;

pub use entities::{RemoteTool, ToolInvocation, locate_tool};
pub use value_objects::{FallbackReason, Provenance, ToolOutput, ToolOutputMetadata};
