//! Scope matching and chained-construct linking

use super::error::ScopeError;
use crate::tokens::{DelimiterClass, TokenKind, TokenStream};
use serde::Serialize;
use std::collections::HashMap;

/// Chained control constructs whose parts form one logical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlFamily {
    /// `if` / `elseif` / `else`
    If,
    /// `try` / `catch` / `finally`
    Try,
}

impl ControlFamily {
    pub fn of(kind: TokenKind) -> Option<ControlFamily> {
        match kind {
            TokenKind::If | TokenKind::Elseif | TokenKind::Else => Some(ControlFamily::If),
            TokenKind::Try | TokenKind::Catch | TokenKind::Finally => Some(ControlFamily::Try),
            _ => None,
        }
    }

    /// Whether another part may follow a part of this kind
    fn continues_after(self, kind: TokenKind) -> bool {
        match self {
            ControlFamily::If => matches!(kind, TokenKind::If | TokenKind::Elseif),
            ControlFamily::Try => matches!(kind, TokenKind::Try | TokenKind::Catch),
        }
    }

    fn is_continuation(self, kind: TokenKind) -> bool {
        match self {
            ControlFamily::If => matches!(kind, TokenKind::Elseif | TokenKind::Else),
            ControlFamily::Try => matches!(kind, TokenKind::Catch | TokenKind::Finally),
        }
    }
}

/// A resolved scope: opener, closer and, for keyword openers, the body brace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeSpan {
    pub open_index: usize,
    pub close_index: usize,
    pub kind: TokenKind,
    /// Opening `{` of the body; `None` when a keyword's construct ends at `;`
    pub body_open: Option<usize>,
}

impl ScopeSpan {
    pub fn contains(&self, index: usize) -> bool {
        (self.open_index..=self.close_index).contains(&index)
    }

    /// Keyword construct with no braced body (`function f();`, `if ($a) x();`)
    pub fn is_statement(&self) -> bool {
        self.body_open.is_none()
    }
}

/// Ordered parts of one logical construct; a single span for unchained scopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeChain {
    pub family: Option<ControlFamily>,
    pub spans: Vec<ScopeSpan>,
}

impl ScopeChain {
    pub fn open_index(&self) -> usize {
        self.spans.first().map(|s| s.open_index).unwrap_or_default()
    }

    pub fn close_index(&self) -> usize {
        self.spans.last().map(|s| s.close_index).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Where a keyword's construct ends up
enum Body {
    Block(usize),
    Statement(usize),
}

/// Resolves scopes on one stream, memoizing every span it computes
pub struct ScopeResolver<'a> {
    stream: &'a TokenStream,
    cache: HashMap<usize, ScopeSpan>,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(stream: &'a TokenStream) -> Self {
        Self {
            stream,
            cache: HashMap::new(),
        }
    }

    pub fn stream(&self) -> &'a TokenStream {
        self.stream
    }

    /// Resolve the scope opened at `open_index`
    pub fn resolve(&mut self, open_index: usize) -> Result<ScopeSpan, ScopeError> {
        if let Some(span) = self.cache.get(&open_index) {
            return Ok(*span);
        }

        let kind = self.stream.at(open_index)?.kind;
        if !kind.opens_scope() {
            return Err(ScopeError::NotAScopeOpener {
                index: open_index,
                kind,
            });
        }

        let span = match kind.delimiter_class() {
            Some(class) => ScopeSpan {
                open_index,
                close_index: self.match_delimiter(open_index, class)?,
                kind,
                body_open: Some(open_index),
            },
            None => self.resolve_keyword(open_index, kind)?,
        };

        self.cache.insert(open_index, span);
        Ok(span)
    }

    /// Resolve a scope and every chained continuation after it
    pub fn resolve_chain(&mut self, open_index: usize) -> Result<ScopeChain, ScopeError> {
        let first = self.resolve(open_index)?;
        let family = ControlFamily::of(first.kind);
        let mut spans = vec![first];

        if let Some(family) = family {
            let mut current = first;
            while let Some(next) = self.continuation_after(&current, family) {
                current = self.resolve(next)?;
                spans.push(current);
            }
        }

        Ok(ScopeChain { family, spans })
    }

    /// Resolve every scope in the stream.
    ///
    /// Delimiters are matched in a single pass; the returned chains cover
    /// the keyword-opened constructs in source order, with continuation
    /// keywords folded into the chain they belong to. Fails on the first
    /// opener without a closer, reported against the keyword owning that
    /// brace when there is one.
    pub fn resolve_all(&mut self) -> Result<Vec<ScopeChain>, ScopeError> {
        if let Err(error) = self.index_delimiters() {
            return Err(self.attribute_to_keyword(error));
        }

        let stream = self.stream;
        let mut chains = Vec::new();
        let mut linked = std::collections::HashSet::new();
        for (index, token) in stream.iter().enumerate() {
            if !token.kind.is_block_keyword() || linked.contains(&index) {
                continue;
            }
            let chain = self.resolve_chain(index)?;
            linked.extend(chain.spans.iter().skip(1).map(|s| s.open_index));
            chains.push(chain);
        }

        crate::log_debug!("Scopes resolved",
            "file" => self.stream.file(),
            "chains" => chains.len(),
            "spans" => self.cache.len()
        );

        Ok(chains)
    }

    /// Innermost block keyword whose body opens at the unmatched brace
    fn attribute_to_keyword(&self, error: ScopeError) -> ScopeError {
        let brace = match &error {
            ScopeError::UnmatchedScope { open_index, .. } => *open_index,
            _ => return error,
        };
        let owner = (0..brace).rev().find(|&index| {
            self.stream
                .get(index)
                .is_some_and(|token| token.kind.is_block_keyword())
                && matches!(self.find_body(index), Ok(Body::Block(open)) if open == brace)
        });
        match owner {
            Some(keyword) => self.unmatched(keyword),
            None => error,
        }
    }

    fn unmatched(&self, open_index: usize) -> ScopeError {
        let token = self.stream.get(open_index);
        ScopeError::UnmatchedScope {
            open_index,
            line: token.map(|t| t.line).unwrap_or_default(),
            kind: token.map(|t| t.kind).unwrap_or(TokenKind::BadCharacter),
        }
    }

    /// Counter walk from the opener; only same-class delimiters move it
    fn match_delimiter(&self, open_index: usize, class: DelimiterClass) -> Result<usize, ScopeError> {
        let mut depth = 1usize;
        for (index, token) in self.stream.iter().enumerate().skip(open_index + 1) {
            if token.kind.delimiter_class() != Some(class) {
                continue;
            }
            if token.kind.closes_scope() {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            } else {
                depth += 1;
            }
        }
        Err(self.unmatched(open_index))
    }

    fn resolve_keyword(&mut self, index: usize, kind: TokenKind) -> Result<ScopeSpan, ScopeError> {
        match self.find_body(index)? {
            Body::Block(brace) => {
                let body = self.resolve(brace).map_err(|_| self.unmatched(index))?;
                Ok(ScopeSpan {
                    open_index: index,
                    close_index: body.close_index,
                    kind,
                    body_open: Some(brace),
                })
            }
            Body::Statement(end) => Ok(ScopeSpan {
                open_index: index,
                close_index: end,
                kind,
                body_open: None,
            }),
        }
    }

    /// First `{` or `;` after the keyword outside any nested delimiter
    fn find_body(&self, keyword_index: usize) -> Result<Body, ScopeError> {
        let mut depth = 0usize;
        for (index, token) in self.stream.iter().enumerate().skip(keyword_index + 1) {
            let kind = token.kind;
            match kind.delimiter_class() {
                Some(DelimiterClass::Brace) if depth == 0 && kind.is_opening_delimiter() => {
                    return Ok(Body::Block(index));
                }
                Some(_) if kind.is_opening_delimiter() => depth += 1,
                Some(_) => {
                    if depth == 0 {
                        // Ran into the enclosing construct's closer
                        break;
                    }
                    depth -= 1;
                }
                None if depth == 0 && kind == TokenKind::Semicolon => {
                    return Ok(Body::Statement(index));
                }
                None => {}
            }
        }
        Err(self.unmatched(keyword_index))
    }

    fn continuation_after(&self, span: &ScopeSpan, family: ControlFamily) -> Option<usize> {
        if !family.continues_after(span.kind) {
            return None;
        }
        let next = self.stream.next_significant(span.close_index)?;
        let kind = self.stream.get(next)?.kind;
        family.is_continuation(kind).then_some(next)
    }

    /// Match all delimiters with one stack per class
    fn index_delimiters(&mut self) -> Result<(), ScopeError> {
        let stream = self.stream;
        let mut stacks: HashMap<DelimiterClass, Vec<usize>> = HashMap::new();

        for (index, token) in stream.iter().enumerate() {
            let Some(class) = token.kind.delimiter_class() else {
                continue;
            };
            if token.kind.is_opening_delimiter() {
                stacks.entry(class).or_default().push(index);
            } else if let Some(open_index) = stacks.entry(class).or_default().pop() {
                self.cache.insert(
                    open_index,
                    ScopeSpan {
                        open_index,
                        close_index: index,
                        kind: stream.tokens()[open_index].kind,
                        body_open: Some(open_index),
                    },
                );
            }
        }

        let first_unclosed = stacks.values().filter_map(|stack| stack.first()).min();
        match first_unclosed {
            Some(&open_index) => Err(self.unmatched(open_index)),
            None => Ok(()),
        }
    }
}
