//! Domain layer for the task automation engine.
//!
//! This module contains core business models, the error taxonomy, and the
//! ports to external collaborators.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{EngineError, EngineResult};
