//! Cyclomatic complexity over a token range

use crate::scope::{ScopeError, ScopeResolver};
use crate::tokens::{TokenKind, TokenStream, TokenStreamError};
use serde::{Deserialize, Serialize};

/// Which constructs add a decision point beyond the fixed set
/// (`if`, `elseif`, loops, `case`, `catch`, boolean operators, `?`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcnPolicy {
    /// Unconditional `else`
    pub count_else: bool,
    /// `default` in a switch
    pub count_default: bool,
    /// `??`
    pub count_coalesce: bool,
}

pub const DEFAULT_CCN_POLICY: CcnPolicy = CcnPolicy {
    count_else: false,
    count_default: false,
    count_coalesce: true,
};

impl Default for CcnPolicy {
    fn default() -> Self {
        DEFAULT_CCN_POLICY
    }
}

impl CcnPolicy {
    pub fn is_decision_point(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::If
            | TokenKind::Elseif
            | TokenKind::For
            | TokenKind::Foreach
            | TokenKind::While
            | TokenKind::Case
            | TokenKind::Catch
            | TokenKind::BooleanAnd
            | TokenKind::LogicalAnd
            | TokenKind::BooleanOr
            | TokenKind::LogicalOr
            | TokenKind::QuestionMark => true,
            TokenKind::Coalesce => self.count_coalesce,
            TokenKind::Else => self.count_else,
            TokenKind::Default => self.count_default,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityCalculator {
    policy: CcnPolicy,
}

impl ComplexityCalculator {
    pub fn new(policy: CcnPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CcnPolicy {
        self.policy
    }

    /// CCN of `[start, end]`: 1 plus one per decision point.
    ///
    /// Function declarations after `start` are skipped whole, so a nested
    /// function or closure never contributes to its enclosing function.
    pub fn calculate(
        &self,
        resolver: &mut ScopeResolver<'_>,
        start: usize,
        end: usize,
    ) -> Result<u32, ScopeError> {
        let stream = resolver.stream();
        if end >= stream.len() {
            return Err(TokenStreamError::IndexOutOfRange {
                index: end,
                len: stream.len(),
            }
            .into());
        }

        let mut ccn = 1u32;
        let mut index = start;
        while index <= end {
            let kind = stream.tokens()[index].kind;

            if kind == TokenKind::Function && index != start {
                index = resolver.resolve(index)?.close_index + 1;
                continue;
            }

            if self.policy.is_decision_point(kind)
                && !(kind == TokenKind::QuestionMark && is_nullable_marker(stream, index))
            {
                ccn += 1;
            }
            index += 1;
        }

        Ok(ccn)
    }
}

/// `?` in `?int` marks a nullable type, not a ternary
fn is_nullable_marker(stream: &TokenStream, index: usize) -> bool {
    match stream.previous_significant(index) {
        None => true,
        Some(previous) => {
            let kind = stream.tokens()[previous].kind;
            kind.is_modifier()
                || matches!(
                    kind,
                    TokenKind::OpenBracket
                        | TokenKind::LambdaOp
                        | TokenKind::Comma
                        | TokenKind::Colon
                        | TokenKind::TypelistLt
                        | TokenKind::Lt
                        | TokenKind::Var
                )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::stream;

    fn ccn_of_first_function(source: &str, policy: CcnPolicy) -> u32 {
        let stream = stream(source);
        let mut resolver = ScopeResolver::new(&stream);
        let start = stream.find(0, |t| t.is(TokenKind::Function)).unwrap();
        let end = resolver.resolve(start).unwrap().close_index;
        ComplexityCalculator::new(policy)
            .calculate(&mut resolver, start, end)
            .unwrap()
    }

    #[test]
    fn test_straight_line_code_is_one() {
        let ccn = ccn_of_first_function(
            "<?php function f($a) { $b = $a + 1; return $b; }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 1);
    }

    #[test]
    fn test_if_elseif_else() {
        let ccn = ccn_of_first_function(
            "<?php function f() { if ($a) { } elseif ($b) { } else { } }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 3);
    }

    #[test]
    fn test_else_if_matches_elseif() {
        let ccn = ccn_of_first_function(
            "<?php function f() { if ($a) { } else if ($b) { } else { } }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 3);
    }

    #[test]
    fn test_try_catch_finally_counts_catch_once() {
        let ccn = ccn_of_first_function(
            "<?php function f() { try { a(); } catch (E $e) { b(); } finally { c(); } }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 2);
    }

    #[test]
    fn test_loops_cases_and_operators() {
        let ccn = ccn_of_first_function(
            "<?php function f($a) {
                foreach ($a as $x) { while ($x && $y || $z) { } }
                for (;;) { }
                switch ($a) { case 1: break; case 2: break; default: break; }
                return $a ? 1 : ($b ?? 2);
            }",
            DEFAULT_CCN_POLICY,
        );
        // foreach, while, &&, ||, for, 2 x case, ?, ??
        assert_eq!(ccn, 10);
    }

    #[test]
    fn test_policy_toggles() {
        let source = "<?php function f($a) { if ($a) { } else { } switch ($a) { default: } $b ?? 1; }";
        assert_eq!(ccn_of_first_function(source, DEFAULT_CCN_POLICY), 3);

        let counting_everything = CcnPolicy {
            count_else: true,
            count_default: true,
            count_coalesce: true,
        };
        assert_eq!(ccn_of_first_function(source, counting_everything), 5);

        let no_coalesce = CcnPolicy {
            count_coalesce: false,
            ..DEFAULT_CCN_POLICY
        };
        assert_eq!(ccn_of_first_function(source, no_coalesce), 2);
    }

    #[test]
    fn test_nested_functions_are_excluded() {
        let ccn = ccn_of_first_function(
            "<?php function outer($a) {
                if ($a) { }
                function inner($b) { if ($b) { } if ($b) { } }
                $f = function () { return $x ? 1 : 2; };
            }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 2);
    }

    #[test]
    fn test_nullable_types_are_not_decisions() {
        let ccn = ccn_of_first_function(
            "<?php function f(?int $a, ?string $b): ?int { return $a; }",
            DEFAULT_CCN_POLICY,
        );
        assert_eq!(ccn, 1);
    }

    #[test]
    fn test_range_out_of_bounds() {
        let stream = stream("<?php function f() { }");
        let mut resolver = ScopeResolver::new(&stream);
        let result = ComplexityCalculator::default().calculate(&mut resolver, 0, 500);
        assert!(matches!(result, Err(ScopeError::Stream(_))));
    }
}
