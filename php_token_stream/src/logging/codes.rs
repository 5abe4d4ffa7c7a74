//! Consolidated error codes and classification system
//!
//! Single source of truth for every code the analyser emits and the
//! behavioural metadata attached to it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Whether the batch carries on with the next unit
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Token dump loading error codes
pub mod input {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_TOKEN_DUMP: Code = Code::new("E012");
}

/// Token stream construction error codes
pub mod tokens {
    use super::Code;

    pub const EMPTY_TOKEN_STREAM: Code = Code::new("E020");
    pub const UNKNOWN_LEXICAL_KIND: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E022");
    pub const LINE_ORDER_VIOLATION: Code = Code::new("E023");
    pub const INDEX_OUT_OF_RANGE: Code = Code::new("E024");
}

/// Scope resolution error codes
pub mod scope {
    use super::Code;

    pub const UNMATCHED_SCOPE: Code = Code::new("E040");
    pub const NOT_A_SCOPE_OPENER: Code = Code::new("E041");
}

/// Structure extraction error codes
pub mod extraction {
    use super::Code;

    pub const FUNCTION_EXTRACTION_FAILED: Code = Code::new("E060");
    pub const CLASS_EXTRACTION_FAILED: Code = Code::new("E061");
}

/// Batch driver error codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E080");
    pub const NO_UNITS_FOUND: Code = Code::new("E081");
    pub const WORKER_FAILURE: Code = Code::new("E082");
    pub const UNIT_ANALYSIS_FAILED: Code = Code::new("E083");
    pub const TOO_MANY_UNITS: Code = Code::new("E084");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const UNIT_ANALYSIS_COMPLETE: Code = Code::new("I006");
    pub const TOKEN_STREAM_BUILT: Code = Code::new("I020");
    pub const SCOPES_RESOLVED: Code = Code::new("I040");
    pub const STRUCTURE_EXTRACTION_COMPLETE: Code = Code::new("I060");
    pub const BATCH_COMPLETE: Code = Code::new("I080");
    pub const DISCOVERY_COMPLETE: Code = Code::new("I081");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    ErrorMetadata {
        code: "ERR001",
        category: "System",
        severity: Severity::Critical,
        recoverable: false,
        description: "Critical internal error",
        recommended_action: "File a bug report with the input that triggered it",
    },
    ErrorMetadata {
        code: "ERR002",
        category: "System",
        severity: Severity::Critical,
        recoverable: false,
        description: "Logging or runtime initialization failed",
        recommended_action: "Check that initialization runs once per process",
    },
    ErrorMetadata {
        code: "ERR003",
        category: "System",
        severity: Severity::High,
        recoverable: false,
        description: "Runtime configuration could not be loaded",
        recommended_action: "Check the TOML configuration file syntax",
    },
    ErrorMetadata {
        code: "E005",
        category: "Input",
        severity: Severity::High,
        recoverable: true,
        description: "Token dump file not found",
        recommended_action: "Verify the path and file permissions",
    },
    ErrorMetadata {
        code: "E007",
        category: "Input",
        severity: Severity::Medium,
        recoverable: true,
        description: "Token dump exceeds the maximum accepted size",
        recommended_action: "Split the source or analyse it separately",
    },
    ErrorMetadata {
        code: "E011",
        category: "Input",
        severity: Severity::High,
        recoverable: true,
        description: "I/O error while reading a token dump",
        recommended_action: "Check file system health and permissions",
    },
    ErrorMetadata {
        code: "E012",
        category: "Input",
        severity: Severity::High,
        recoverable: true,
        description: "Token dump is not a JSON array of raw tokens",
        recommended_action: "Produce dumps as [[kind, text, line], ...]",
    },
    ErrorMetadata {
        code: "E020",
        category: "Tokens",
        severity: Severity::Medium,
        recoverable: true,
        description: "Unit produced no tokens",
        recommended_action: "Check that the lexer ran on a non-empty source",
    },
    ErrorMetadata {
        code: "E021",
        category: "Tokens",
        severity: Severity::High,
        recoverable: true,
        description: "Raw token kind is not in the token catalog",
        recommended_action: "Use a lexer whose token set matches the catalog",
    },
    ErrorMetadata {
        code: "E022",
        category: "Tokens",
        severity: Severity::High,
        recoverable: true,
        description: "Unit exceeds the maximum token count",
        recommended_action: "Split the source into smaller units",
    },
    ErrorMetadata {
        code: "E023",
        category: "Tokens",
        severity: Severity::High,
        recoverable: true,
        description: "Token line numbers decrease",
        recommended_action: "Check that the dump preserves lexer order",
    },
    ErrorMetadata {
        code: "E024",
        category: "Tokens",
        severity: Severity::Critical,
        recoverable: true,
        description: "Token index outside the stream",
        recommended_action: "File a bug report with the input that triggered it",
    },
    ErrorMetadata {
        code: "E040",
        category: "Scope",
        severity: Severity::High,
        recoverable: true,
        description: "Scope opener has no matching closer",
        recommended_action: "Check the source for a missing closing brace",
    },
    ErrorMetadata {
        code: "E041",
        category: "Scope",
        severity: Severity::Medium,
        recoverable: true,
        description: "Token does not open a scope",
        recommended_action: "Resolve scopes only from scope-opening tokens",
    },
    ErrorMetadata {
        code: "E060",
        category: "Extraction",
        severity: Severity::Medium,
        recoverable: true,
        description: "A function could not be extracted",
        recommended_action: "Inspect the declaration at the reported line",
    },
    ErrorMetadata {
        code: "E061",
        category: "Extraction",
        severity: Severity::Medium,
        recoverable: true,
        description: "A class-like declaration could not be extracted",
        recommended_action: "Inspect the declaration at the reported line",
    },
    ErrorMetadata {
        code: "E080",
        category: "Batch",
        severity: Severity::High,
        recoverable: false,
        description: "Input directory not found",
        recommended_action: "Verify the directory path",
    },
    ErrorMetadata {
        code: "E081",
        category: "Batch",
        severity: Severity::Medium,
        recoverable: false,
        description: "No token dumps found",
        recommended_action: "Dump files must end in .tokens.json",
    },
    ErrorMetadata {
        code: "E082",
        category: "Batch",
        severity: Severity::Critical,
        recoverable: false,
        description: "A batch worker thread failed",
        recommended_action: "Retry with --sequential and report the failure",
    },
    ErrorMetadata {
        code: "E083",
        category: "Batch",
        severity: Severity::High,
        recoverable: true,
        description: "A unit failed analysis",
        recommended_action: "See the unit's error for details",
    },
    ErrorMetadata {
        code: "E084",
        category: "Batch",
        severity: Severity::High,
        recoverable: false,
        description: "Batch holds more units than the compile-time limit",
        recommended_action: "Split the input into smaller batches",
    },
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Low)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    if let Some(metadata) = get_error_metadata(code) {
        return metadata.category;
    }
    match code.chars().next() {
        Some('I') => "Success",
        Some('W') => "Warning",
        Some('D') => "Debug",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            input::FILE_NOT_FOUND,
            input::FILE_TOO_LARGE,
            input::IO_ERROR,
            input::INVALID_TOKEN_DUMP,
            tokens::EMPTY_TOKEN_STREAM,
            tokens::UNKNOWN_LEXICAL_KIND,
            tokens::TOO_MANY_TOKENS,
            tokens::LINE_ORDER_VIOLATION,
            tokens::INDEX_OUT_OF_RANGE,
            scope::UNMATCHED_SCOPE,
            scope::NOT_A_SCOPE_OPENER,
            extraction::FUNCTION_EXTRACTION_FAILED,
            extraction::CLASS_EXTRACTION_FAILED,
            batch::DIRECTORY_NOT_FOUND,
            batch::NO_UNITS_FOUND,
            batch::WORKER_FAILURE,
            batch::UNIT_ANALYSIS_FAILED,
            batch::TOO_MANY_UNITS,
        ];
        for code in codes {
            assert!(get_error_metadata(code.as_str()).is_some(), "{code}");
        }
        assert_eq!(get_error_registry().len(), codes.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E040"), "Scope");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(is_recoverable("E040"));
        assert!(!is_recoverable("E082"));
        assert_eq!(get_category(success::BATCH_COMPLETE.as_str()), "Success");
        assert_eq!(get_description("E999"), "Unknown error");
    }
}
