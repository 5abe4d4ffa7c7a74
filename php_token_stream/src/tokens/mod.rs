//! Token layer for PHP/Hack analysis
//!
//! Converts the lexer's raw `(kind, text, line)` triples into classified
//! [`Token`]s held in an indexed [`TokenStream`].
//!
//! ## Key Components
//!
//! - **[`TokenKind`]** - Closed catalog of lexical kinds with static attributes
//! - **[`TokenCategory`]** - Presentation category (keyword, operator, string, ...)
//! - **[`Token`]** - One classified token
//! - **[`TokenStream`]** - Immutable, position-addressable sequence for one unit

pub mod kind;
pub mod token;
pub mod token_stream;

pub use kind::{DelimiterClass, TokenCategory, TokenKind};
pub use token::{RawToken, Token};
pub use token_stream::{LinesOfCode, TokenStream, TokenStreamError};
