//! Unit-test helper: splits small PHP snippets into raw tokens.
//!
//! Only as much lexing as the tests need. Strings never interpolate and
//! heredocs are not recognised.

use crate::tokens::{RawToken, TokenStream};

const KEYWORDS: &[&str] = &[
    "abstract", "array", "as", "async", "await", "break", "callable", "case", "catch",
    "class", "clone", "const", "continue", "declare", "default", "do", "echo", "else",
    "elseif", "empty", "enum", "extends", "final", "finally", "for", "foreach", "function",
    "global", "goto", "if", "implements", "include", "include_once", "instanceof",
    "insteadof", "interface", "isset", "list", "namespace", "new", "print", "private",
    "protected", "public", "require", "require_once", "return", "static", "switch", "throw",
    "trait", "try", "unset", "use", "var", "while", "yield",
];

/// Longest first so prefixes never shadow longer operators
const OPERATORS: &[(&str, &str)] = &[
    ("===", "T_IS_IDENTICAL"),
    ("!==", "T_IS_NOT_IDENTICAL"),
    ("...", "T_ELLIPSIS"),
    ("?->", "T_NULLSAFE_OBJECT_OPERATOR"),
    ("<=>", "T_SPACESHIP"),
    ("==>", "T_LAMBDA_ARROW"),
    ("&&", "T_BOOLEAN_AND"),
    ("||", "T_BOOLEAN_OR"),
    ("??", "T_COALESCE"),
    ("==", "T_IS_EQUAL"),
    ("!=", "T_IS_NOT_EQUAL"),
    ("<=", "T_IS_SMALLER_OR_EQUAL"),
    (">=", "T_IS_GREATER_OR_EQUAL"),
    ("->", "T_OBJECT_OPERATOR"),
    ("=>", "T_DOUBLE_ARROW"),
    ("::", "T_PAAMAYIM_NEKUDOTAYIM"),
    ("++", "T_INC"),
    ("--", "T_DEC"),
    ("+=", "T_PLUS_EQUAL"),
    ("-=", "T_MINUS_EQUAL"),
    (".=", "T_CONCAT_EQUAL"),
];

const WORD_OPERATORS: &[(&str, &str)] = &[
    ("and", "T_LOGICAL_AND"),
    ("or", "T_LOGICAL_OR"),
    ("xor", "T_LOGICAL_XOR"),
];

pub(crate) fn lex(source: &str) -> Vec<RawToken> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1u32;
    let mut i = 0;

    while i < chars.len() {
        let rest: String = chars[i..].iter().collect();
        let (kind, len) = next_token(&chars, i, &rest);
        let text: String = chars[i..i + len].iter().collect();
        let newlines = text.matches('\n').count() as u32;
        tokens.push(RawToken::new(kind, text, line));
        line += newlines;
        i += len;
    }

    tokens
}

pub(crate) fn stream(source: &str) -> TokenStream {
    TokenStream::build("test.php", lex(source)).expect("test source must classify")
}

fn next_token(chars: &[char], i: usize, rest: &str) -> (String, usize) {
    let c = chars[i];
    let scan = |pred: &dyn Fn(char) -> bool, from: usize| {
        chars[from..].iter().take_while(|&&ch| pred(ch)).count()
    };

    if rest.starts_with("<?php") {
        let len = 5 + scan(&|ch: char| ch.is_whitespace(), i + 5);
        return ("T_OPEN_TAG".into(), len);
    }
    if c.is_whitespace() {
        return ("T_WHITESPACE".into(), scan(&|ch: char| ch.is_whitespace(), i));
    }
    if rest.starts_with("/*") {
        let len = rest.find("*/").map(|end| end + 2).unwrap_or(rest.len());
        let kind = if rest.starts_with("/**") { "T_DOC_COMMENT" } else { "T_COMMENT" };
        return (kind.into(), rest[..len].chars().count());
    }
    if rest.starts_with("//") || c == '#' {
        let len = rest.find('\n').map(|end| end + 1).unwrap_or(rest.len());
        return ("T_COMMENT".into(), rest[..len].chars().count());
    }
    if c == '\'' || c == '"' {
        let close = chars[i + 1..].iter().position(|&ch| ch == c).unwrap_or(0);
        return ("T_CONSTANT_ENCAPSED_STRING".into(), close + 2);
    }
    if c == '$' && chars.get(i + 1).map_or(false, |ch| ch.is_alphanumeric() || *ch == '_') {
        let len = 1 + scan(&|ch: char| ch.is_alphanumeric() || ch == '_', i + 1);
        return ("T_VARIABLE".into(), len);
    }
    if c.is_ascii_digit() {
        return ("T_LNUMBER".into(), scan(&|ch: char| ch.is_ascii_digit(), i));
    }
    if c.is_alphabetic() || c == '_' {
        let len = scan(&|ch: char| ch.is_alphanumeric() || ch == '_', i);
        let word: String = chars[i..i + len].iter().collect::<String>().to_lowercase();
        if let Some((_, kind)) = WORD_OPERATORS.iter().find(|(w, _)| *w == word) {
            return ((*kind).into(), len);
        }
        if KEYWORDS.contains(&word.as_str()) {
            return (format!("T_{}", word.to_uppercase()), len);
        }
        return ("T_STRING".into(), len);
    }
    if let Some((op, kind)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) {
        return ((*kind).into(), op.len());
    }
    if c == '\\' {
        return ("T_NS_SEPARATOR".into(), 1);
    }
    (c.to_string(), 1)
}

#[test]
fn test_lex_snippet() {
    let raw = lex("<?php\nfunction f($a) { return $a && 1; }");
    let kinds: Vec<&str> = raw.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "T_OPEN_TAG", "T_FUNCTION", "T_WHITESPACE", "T_STRING", "(", "T_VARIABLE", ")",
            "T_WHITESPACE", "{", "T_WHITESPACE", "T_RETURN", "T_WHITESPACE", "T_VARIABLE",
            "T_WHITESPACE", "T_BOOLEAN_AND", "T_WHITESPACE", "T_LNUMBER", ";", "T_WHITESPACE",
            "}",
        ]
    );
    assert_eq!(raw[1].line, 2);
}
