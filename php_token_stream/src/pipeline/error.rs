use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};
use crate::scope::ScopeError;
use crate::tokens::TokenStreamError;

/// Unit analysis errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Token dump loading failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Token stream construction failed: {0}")]
    TokenStream(#[from] TokenStreamError),

    #[error("Scope resolution failed: {0}")]
    Scope(#[from] ScopeError),
}

impl AnalysisError {
    pub fn code(&self) -> Code {
        match self {
            AnalysisError::FileProcessing(error) => error.error_code(),
            AnalysisError::TokenStream(error) => stream_code(error),
            AnalysisError::Scope(ScopeError::UnmatchedScope { .. }) => codes::scope::UNMATCHED_SCOPE,
            AnalysisError::Scope(ScopeError::NotAScopeOpener { .. }) => {
                codes::scope::NOT_A_SCOPE_OPENER
            }
            AnalysisError::Scope(ScopeError::Stream(error)) => stream_code(error),
        }
    }

    /// Source line the failure points at, when known
    pub fn line(&self) -> Option<u32> {
        match self {
            AnalysisError::TokenStream(TokenStreamError::UnknownLexicalKind { line, .. })
            | AnalysisError::TokenStream(TokenStreamError::LineOrderViolation { line, .. }) => {
                Some(*line)
            }
            AnalysisError::Scope(error) => error.line(),
            _ => None,
        }
    }
}

fn stream_code(error: &TokenStreamError) -> Code {
    match error {
        TokenStreamError::EmptyInput => codes::tokens::EMPTY_TOKEN_STREAM,
        TokenStreamError::UnknownLexicalKind { .. } => codes::tokens::UNKNOWN_LEXICAL_KIND,
        TokenStreamError::IndexOutOfRange { .. } => codes::tokens::INDEX_OUT_OF_RANGE,
        TokenStreamError::TooManyTokens { .. } => codes::tokens::TOO_MANY_TOKENS,
        TokenStreamError::LineOrderViolation { .. } => codes::tokens::LINE_ORDER_VIOLATION,
    }
}
