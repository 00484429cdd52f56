//! Infrastructure layer module
//!
//! This module contains the adapters that connect the engine to its host:
//! - Configuration loading (figment: defaults, YAML, environment)
//! - Logging setup (tracing-subscriber)
//! - In-memory store adapter for embedding and tests
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod memory_store;

pub use config::{ConfigError, ConfigLoader};
pub use memory_store::InMemoryStore;
