//! Scope resolution over a token stream
//!
//! Maps scope-opening tokens (delimiters and block keywords) to the index
//! of their closing token, and links the chained control constructs
//! (`if`/`elseif`/`else`, `try`/`catch`/`finally`) into one logical unit.

pub mod error;
pub mod resolver;

pub use error::ScopeError;
pub use resolver::{ControlFamily, ScopeChain, ScopeResolver, ScopeSpan};
