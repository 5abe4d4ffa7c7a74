//! Classified tokens and the raw triples they are built from

use super::kind::{TokenCategory, TokenKind};
use serde::{Deserialize, Serialize};

/// Lexer output for a single token: raw kind, source text, 1-based line.
///
/// A line of `0` means the lexer did not report one (single-character
/// tokens from some lexers); the stream builder fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTokenRecord", into = "RawTokenRecord")]
pub struct RawToken {
    pub kind: String,
    pub text: String,
    pub line: u32,
}

impl RawToken {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            line,
        }
    }
}

/// On-disk forms accepted for a raw token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTokenRecord {
    Triple(String, String, u32),
    Object {
        kind: String,
        text: String,
        #[serde(default)]
        line: u32,
    },
}

impl From<RawTokenRecord> for RawToken {
    fn from(record: RawTokenRecord) -> Self {
        match record {
            RawTokenRecord::Triple(kind, text, line) => RawToken { kind, text, line },
            RawTokenRecord::Object { kind, text, line } => RawToken { kind, text, line },
        }
    }
}

impl From<RawToken> for RawTokenRecord {
    fn from(raw: RawToken) -> Self {
        RawTokenRecord::Triple(raw.kind, raw.text, raw.line)
    }
}

/// A classified token. Immutable once the stream is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub category: TokenCategory,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            category: kind.category(),
            text: text.into(),
            line,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Number of line breaks inside the token text
    pub fn newline_count(&self) -> u32 {
        self.text.matches('\n').count() as u32
    }

    /// Last source line the token touches
    pub fn end_line(&self) -> u32 {
        self.line + self.newline_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_token_accepts_triples_and_objects() {
        let raw: Vec<RawToken> = serde_json::from_str(
            r#"[["T_FUNCTION", "function", 3], {"kind": "{", "text": "{"}]"#,
        )
        .unwrap();

        assert_eq!(raw[0], RawToken::new("T_FUNCTION", "function", 3));
        assert_eq!(raw[1], RawToken::new("{", "{", 0));
    }

    #[test]
    fn test_token_takes_category_from_kind() {
        let token = Token::new(TokenKind::DocComment, "/**\n * f\n */", 4);
        assert_eq!(token.category, TokenCategory::Comment);
        assert!(token.is_trivia());
        assert_eq!(token.end_line(), 6);
    }
}
