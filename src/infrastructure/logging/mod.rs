//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty log formatting per configuration
//! - `RUST_LOG`-style env filter overrides

pub mod logger;

pub use logger::init_logging;
