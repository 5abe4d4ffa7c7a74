use crate::tokens::{TokenKind, TokenStreamError};

/// Scope resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Unmatched {kind} opened at token {open_index} (line {line})")]
    UnmatchedScope {
        open_index: usize,
        line: u32,
        kind: TokenKind,
    },

    #[error("Token {index} ({kind}) does not open a scope")]
    NotAScopeOpener { index: usize, kind: TokenKind },

    #[error(transparent)]
    Stream(#[from] TokenStreamError),
}

impl ScopeError {
    /// Source line the error points at, when known
    pub fn line(&self) -> Option<u32> {
        match self {
            ScopeError::UnmatchedScope { line, .. } => Some(*line),
            _ => None,
        }
    }
}
