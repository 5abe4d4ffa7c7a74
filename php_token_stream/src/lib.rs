//! PHP/Hack token stream analysis
//!
//! Raw lexer output is classified into a [`TokenStream`], scopes are
//! resolved on demand by a [`ScopeResolver`], and the
//! [`FunctionStructureExtractor`] recovers functions, methods, closures and
//! classes with their cyclomatic complexity. [`batch`] drives many units
//! at once.

pub mod batch;
pub mod config;
pub mod file_processor;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod scope;
pub mod structure;
pub mod tokens;

#[cfg(test)]
mod test_support;

// Re-export key types for library consumers
pub use batch::{AnalysisUnit, BatchConfig, BatchError, BatchResults};
pub use pipeline::{analyze_unit, AnalysisError, UnitAnalysis};
pub use scope::{ScopeChain, ScopeError, ScopeResolver, ScopeSpan};
pub use structure::{
    ClassStructure, CcnPolicy, ComplexityCalculator, FunctionStructure,
    FunctionStructureExtractor, DEFAULT_CCN_POLICY,
};
pub use tokens::{RawToken, Token, TokenCategory, TokenKind, TokenStream, TokenStreamError};
