//! Indexed, immutable token stream for one source unit
//!
//! Built once from the lexer's raw triples. Every later pass (scope
//! resolution, structure extraction, complexity) addresses tokens by their
//! position in this stream, so the stream keeps every token including
//! whitespace and comments.

use super::kind::TokenKind;
use super::token::{RawToken, Token};
use crate::config::compile_time::tokens::MAX_TOKEN_COUNT;
use serde::Serialize;
use std::collections::BTreeMap;

/// Errors raised while building or addressing a token stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("Token stream is empty")]
    EmptyInput,

    #[error("Unknown lexical kind '{raw_kind}' at token {position} (line {line})")]
    UnknownLexicalKind {
        raw_kind: String,
        position: usize,
        line: u32,
    },

    #[error("Token index {index} out of range (stream has {len} tokens)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Too many tokens: {count} (max: {max})")]
    TooManyTokens { count: usize, max: usize },

    #[error("Token {index} reports line {line}, before previous token line {previous}")]
    LineOrderViolation { index: usize, line: u32, previous: u32 },
}

/// Line counts for a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinesOfCode {
    /// Physical lines
    pub loc: u32,
    /// Lines carrying comment text
    pub cloc: u32,
    /// Lines without comments
    pub ncloc: u32,
}

#[derive(Debug, Clone)]
pub struct TokenStream {
    file: String,
    tokens: Vec<Token>,
    /// Start line -> indices of tokens starting on it
    line_index: BTreeMap<u32, Vec<usize>>,
}

impl TokenStream {
    /// Classify raw lexer output into a stream.
    ///
    /// Fails on the first raw kind the catalog does not know; the stream
    /// either contains every input token or is not built at all.
    pub fn build(file: impl Into<String>, raw: Vec<RawToken>) -> Result<Self, TokenStreamError> {
        if raw.is_empty() {
            return Err(TokenStreamError::EmptyInput);
        }
        if raw.len() > MAX_TOKEN_COUNT {
            return Err(TokenStreamError::TooManyTokens {
                count: raw.len(),
                max: MAX_TOKEN_COUNT,
            });
        }

        let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
        let mut line_index: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut running_line = 1u32;
        let mut previous_line = 0u32;
        let mut previous_significant: Option<TokenKind> = None;

        for (position, raw_token) in raw.into_iter().enumerate() {
            let line = if raw_token.line == 0 {
                running_line
            } else {
                raw_token.line
            };

            let kind = TokenKind::from_raw(&raw_token.kind).ok_or_else(|| {
                TokenStreamError::UnknownLexicalKind {
                    raw_kind: raw_token.kind.clone(),
                    position,
                    line,
                }
            })?;

            if line < previous_line {
                return Err(TokenStreamError::LineOrderViolation {
                    index: position,
                    line,
                    previous: previous_line,
                });
            }

            let kind = reclassify(kind, previous_significant);
            let token = Token::new(kind, raw_token.text, line);

            running_line = token.end_line();
            previous_line = line;
            if !kind.is_trivia() {
                previous_significant = Some(kind);
            }

            line_index.entry(line).or_default().push(position);
            tokens.push(token);
        }

        let stream = Self {
            file: file.into(),
            tokens,
            line_index,
        };

        crate::log_debug!("Token stream built",
            "file" => &stream.file,
            "tokens" => stream.tokens.len()
        );

        Ok(stream)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Checked access by position
    pub fn at(&self, index: usize) -> Result<&Token, TokenStreamError> {
        self.tokens
            .get(index)
            .ok_or(TokenStreamError::IndexOutOfRange {
                index,
                len: self.tokens.len(),
            })
    }

    /// First index at or after `from` whose token satisfies `predicate`
    pub fn find<P>(&self, from: usize, predicate: P) -> Option<usize>
    where
        P: Fn(&Token) -> bool,
    {
        self.tokens
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, token)| predicate(token))
            .map(|(index, _)| index)
    }

    /// Next non-trivia token after `index`
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        self.find(index + 1, |token| !token.is_trivia())
    }

    /// Closest non-trivia token before `index`
    pub fn previous_significant(&self, index: usize) -> Option<usize> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .rposition(|token| !token.is_trivia())
    }

    /// Index of the `;` terminating the statement that starts at `index`,
    /// or `index` itself when none follows
    pub fn end_of_statement(&self, index: usize) -> usize {
        self.find(index, |token| token.is(TokenKind::Semicolon))
            .unwrap_or(index)
    }

    /// Indices of tokens starting on `line`
    pub fn tokens_on_line(&self, line: u32) -> &[usize] {
        self.line_index
            .get(&line)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of tokens in `[start, end)`
    pub fn text_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        self.tokens[start..end]
            .iter()
            .map(|token| token.text.as_str())
            .collect()
    }

    /// Reconstructed source text
    pub fn text(&self) -> String {
        self.text_between(0, self.tokens.len())
    }

    /// Physical lines are newlines in the source, plus one for an
    /// unterminated last line
    pub fn lines_of_code(&self) -> LinesOfCode {
        let newlines: u32 = self.tokens.iter().map(Token::newline_count).sum();
        let unterminated = self
            .tokens
            .iter()
            .rev()
            .find(|token| !token.text.is_empty())
            .is_some_and(|token| !token.text.ends_with('\n'));
        let loc = newlines + u32::from(unterminated);

        let mut comment_lines = std::collections::BTreeSet::new();
        for token in &self.tokens {
            if matches!(token.kind, TokenKind::Comment | TokenKind::DocComment) {
                // Line comments carry their terminating newline
                let spanned = token.text.trim_end_matches('\n').matches('\n').count() as u32;
                comment_lines.extend(token.line..=token.line + spanned);
            }
        }

        let cloc = comment_lines.len() as u32;
        LinesOfCode {
            loc,
            cloc,
            ncloc: loc.saturating_sub(cloc),
        }
    }
}

/// Context-dependent kinds that the lexer reports as their plain keyword
fn reclassify(kind: TokenKind, previous_significant: Option<TokenKind>) -> TokenKind {
    match (kind, previous_significant) {
        (TokenKind::Class, Some(TokenKind::DoubleColon)) => TokenKind::ClassNameConstant,
        (TokenKind::Function, Some(TokenKind::Use)) => TokenKind::UseFunction,
        _ => kind,
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn raw(triples: &[(&str, &str, u32)]) -> Vec<RawToken> {
        triples
            .iter()
            .map(|(kind, text, line)| RawToken::new(*kind, *text, *line))
            .collect()
    }

    #[test]
    fn test_build_preserves_count_and_order() {
        let input = raw(&[
            ("T_OPEN_TAG", "<?php\n", 1),
            ("T_VARIABLE", "$a", 2),
            ("T_WHITESPACE", " ", 2),
            ("=", "=", 0),
            ("T_WHITESPACE", " ", 2),
            ("T_LNUMBER", "1", 2),
            (";", ";", 0),
        ]);
        let expected: Vec<String> = input.iter().map(|r| r.text.clone()).collect();

        let stream = TokenStream::build("a.php", input).unwrap();

        assert_eq!(stream.len(), 7);
        let texts: Vec<String> = stream.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, expected);
        assert_eq!(stream.at(3).unwrap().kind, TokenKind::Equal);
        assert_eq!(stream.at(3).unwrap().line, 2);
        assert_eq!(stream.text(), "<?php\n$a = 1;");
    }

    #[test]
    fn test_build_rejects_empty_input() {
        assert_matches!(
            TokenStream::build("a.php", Vec::new()),
            Err(TokenStreamError::EmptyInput)
        );
    }

    #[test]
    fn test_build_rejects_unknown_kind() {
        let input = raw(&[("T_OPEN_TAG", "<?php ", 1), ("T_MATCH", "match", 1)]);
        assert_matches!(
            TokenStream::build("a.php", input),
            Err(TokenStreamError::UnknownLexicalKind { position: 1, ref raw_kind, .. }) if raw_kind == "T_MATCH"
        );
    }

    #[test]
    fn test_build_rejects_decreasing_lines() {
        let input = raw(&[("T_VARIABLE", "$a", 3), ("T_VARIABLE", "$b", 2)]);
        assert_matches!(
            TokenStream::build("a.php", input),
            Err(TokenStreamError::LineOrderViolation { index: 1, line: 2, previous: 3 })
        );
    }

    #[test]
    fn test_at_out_of_range() {
        let stream = TokenStream::build("a.php", raw(&[("T_VARIABLE", "$a", 1)])).unwrap();
        assert_matches!(
            stream.at(5),
            Err(TokenStreamError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn test_context_reclassification() {
        let input = raw(&[
            ("T_STRING", "Foo", 1),
            ("T_PAAMAYIM_NEKUDOTAYIM", "::", 1),
            ("T_CLASS", "class", 1),
            (";", ";", 1),
            ("T_USE", "use", 2),
            ("T_WHITESPACE", " ", 2),
            ("T_FUNCTION", "function", 2),
        ]);
        let stream = TokenStream::build("a.php", input).unwrap();

        assert_eq!(stream.at(2).unwrap().kind, TokenKind::ClassNameConstant);
        assert_eq!(stream.at(6).unwrap().kind, TokenKind::UseFunction);
    }

    #[test]
    fn test_navigation_helpers() {
        let input = raw(&[
            ("T_RETURN", "return", 1),
            ("T_WHITESPACE", " ", 1),
            ("T_COMMENT", "/* x */", 1),
            ("T_LNUMBER", "1", 1),
            (";", ";", 1),
        ]);
        let stream = TokenStream::build("a.php", input).unwrap();

        assert_eq!(stream.next_significant(0), Some(3));
        assert_eq!(stream.previous_significant(3), Some(0));
        assert_eq!(stream.end_of_statement(0), 4);
        assert_eq!(stream.tokens_on_line(1).len(), 5);
        assert!(stream.tokens_on_line(9).is_empty());
    }

    #[test]
    fn test_lines_of_code() {
        let input = raw(&[
            ("T_OPEN_TAG", "<?php\n", 1),
            ("T_COMMENT", "// note\n", 2),
            ("T_DOC_COMMENT", "/**\n * doc\n */", 3),
            ("T_WHITESPACE", "\n", 5),
            ("T_VARIABLE", "$a", 6),
        ]);
        let stream = TokenStream::build("a.php", input).unwrap();
        let loc = stream.lines_of_code();

        assert_eq!(loc.loc, 6);
        assert_eq!(loc.cloc, 4);
        assert_eq!(loc.ncloc, 2);
    }

    #[test]
    fn test_lines_of_code_with_trailing_newline() {
        let input = raw(&[
            ("T_OPEN_TAG", "<?php\n", 1),
            ("T_VARIABLE", "$a", 2),
            (";", ";", 2),
            ("T_WHITESPACE", "\n", 2),
        ]);
        let stream = TokenStream::build("a.php", input).unwrap();
        let loc = stream.lines_of_code();

        assert_eq!(loc.loc, 2);
        assert_eq!(loc.cloc, 0);
        assert_eq!(loc.ncloc, 2);
    }

    #[test]
    fn test_lines_of_code_trailing_line_comment() {
        let input = raw(&[
            ("T_OPEN_TAG", "<?php\n", 1),
            ("T_COMMENT", "// last\n", 2),
        ]);
        let stream = TokenStream::build("a.php", input).unwrap();
        let loc = stream.lines_of_code();

        assert_eq!(loc.loc, 2);
        assert_eq!(loc.cloc, 1);
        assert_eq!(loc.ncloc, 1);
    }
}
