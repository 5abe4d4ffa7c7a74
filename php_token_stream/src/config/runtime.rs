// RUNTIME PREFERENCES (User Experience)

use crate::logging::LogLevel;
use crate::structure::complexity::{CcnPolicy, DEFAULT_CCN_POLICY};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPreferences {
    /// Which constructs count toward cyclomatic complexity
    pub ccn_policy: CcnPolicy,

    /// Resolve every scope opener before extraction and fail the unit on
    /// the first unbalanced one
    pub strict_scopes: bool,

    /// Emit a debug event per extracted structure
    pub trace_extraction: bool,

    /// Whether closures are reported alongside named functions
    pub include_closures: bool,
}

impl Default for AnalysisPreferences {
    fn default() -> Self {
        Self {
            ccn_policy: DEFAULT_CCN_POLICY,
            strict_scopes: env::var("PTS_ANALYSIS_STRICT_SCOPES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            trace_extraction: env::var("PTS_ANALYSIS_TRACE_EXTRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_closures: env::var("PTS_ANALYSIS_INCLUDE_CLOSURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to print events to the console at all
    pub enable_console_logging: bool,

    /// Minimum level that reaches the console
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("PTS_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("PTS_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var("PTS_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub analysis: AnalysisPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections and keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [analysis]
            strict_scopes = true

            [analysis.ccn_policy]
            count_else = true
            "#,
        )
        .unwrap();

        assert!(config.analysis.strict_scopes);
        assert!(config.analysis.ccn_policy.count_else);
        assert!(!config.analysis.ccn_policy.count_default);
        assert_eq!(
            config.analysis.ccn_policy.count_coalesce,
            DEFAULT_CCN_POLICY.count_coalesce
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert_matches!(
            RuntimeConfig::from_toml_str("[analysis\nstrict_scopes = 1"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pts.toml");
        std::fs::write(&path, "[logging]\nmin_log_level = \"Debug\"\n").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);

        assert_matches!(
            RuntimeConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        );
    }
}
