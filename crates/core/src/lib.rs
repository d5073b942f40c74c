//! # DataPilot Core
//!
//! Domain types and error definitions for the DataPilot analysis engine.
//! This crate has **zero framework dependencies** — it defines the
//! vocabulary the state store and the result compressor share: JSON
//! payload access, pipeline stage identifiers, and the error hierarchy.
//! All other crates depend inward on core.

pub mod error;
pub mod json;
pub mod stage;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, StateError};
pub use json::{JsonMap, first_of, num_field, str_field, truthy};
pub use stage::Stage;
