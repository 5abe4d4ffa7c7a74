//! Configuration for the token stream analyser
//!
//! Two layers: compile-time limits in [`constants`] and serde-backed runtime
//! preferences in [`runtime`] (environment defaults, optional TOML file).

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{AnalysisPreferences, ConfigError, LoggingPreferences, RuntimeConfig};
