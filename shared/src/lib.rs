//! Shared types and models for the NovaFarm dashboard
//!
//! This crate contains the data model, input validation and the pure
//! derived-metric calculators shared between the backend and the browser
//! (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
