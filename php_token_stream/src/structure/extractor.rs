//! Declaration extraction
//!
//! One forward pass over the stream. Each `function` keyword is resolved
//! through the [`ScopeResolver`] and turned into a [`FunctionStructure`];
//! class-like declarations and inclusions are collected on the way. A
//! declaration whose scope cannot be resolved becomes an
//! [`ExtractionDiagnostic`] and the pass moves on to the next one.

use super::class::{ClassKind, ClassStructure, Inclusion, InclusionKind, PackageTags};
use super::complexity::ComplexityCalculator;
use super::function::{FunctionArgument, FunctionStructure};
use crate::config::compile_time::structure::{
    ANONYMOUS_CLASS_NAME, ANONYMOUS_FUNCTION_NAME, DOCBLOCK_SCAN_LIMIT,
};
use crate::config::AnalysisPreferences;
use crate::logging::codes;
use crate::scope::{ScopeError, ScopeResolver, ScopeSpan};
use crate::tokens::{Token, TokenKind, TokenStream};
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSubject {
    Function,
    Class,
}

impl fmt::Display for DiagnosticSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSubject::Function => f.write_str("function"),
            DiagnosticSubject::Class => f.write_str("class"),
        }
    }
}

/// A declaration left out of the extraction because its scope is broken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionDiagnostic {
    pub subject: DiagnosticSubject,
    pub name: String,
    /// Line of the declaration keyword
    pub line: u32,
    #[serde(serialize_with = "serialize_display")]
    pub error: ScopeError,
}

fn serialize_display<S: Serializer>(error: &ScopeError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl fmt::Display for ExtractionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at line {}: {}",
            self.subject, self.name, self.line, self.error
        )
    }
}

/// Everything recovered from one stream, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub functions: Vec<FunctionStructure>,
    pub classes: Vec<ClassStructure>,
    pub inclusions: Vec<Inclusion>,
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl Extraction {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Enclosing declaration while walking the stream
enum Frame {
    /// Index into `Extraction::classes`
    Class { class: usize, close: usize },
    Function { close: usize },
}

impl Frame {
    fn close(&self) -> usize {
        match self {
            Frame::Class { close, .. } | Frame::Function { close } => *close,
        }
    }
}

/// Modifiers and doc comment found before a declaration keyword
struct Preamble {
    visibility: Option<String>,
    keywords: Vec<String>,
    docblock: String,
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct FunctionStructureExtractor<'a> {
    resolver: ScopeResolver<'a>,
    calculator: ComplexityCalculator,
    include_closures: bool,
    trace: bool,
}

impl<'a> FunctionStructureExtractor<'a> {
    pub fn new(stream: &'a TokenStream, preferences: &AnalysisPreferences) -> Self {
        Self::with_resolver(ScopeResolver::new(stream), preferences)
    }

    /// Extract with a resolver that may already hold resolved spans
    pub fn with_resolver(resolver: ScopeResolver<'a>, preferences: &AnalysisPreferences) -> Self {
        Self {
            resolver,
            calculator: ComplexityCalculator::new(preferences.ccn_policy),
            include_closures: preferences.include_closures,
            trace: preferences.trace_extraction,
        }
    }

    pub fn extract(mut self) -> Extraction {
        let stream = self.resolver.stream();
        let mut extraction = Extraction::default();
        let mut frames: Vec<Frame> = Vec::new();
        let mut namespace: Option<String> = None;

        for (index, token) in stream.iter().enumerate() {
            while frames.last().map_or(false, |frame| frame.close() < index) {
                frames.pop();
            }

            match token.kind {
                TokenKind::HaltCompiler => break,
                TokenKind::Namespace => {
                    if let Some(declared) = self.namespace_declaration(index) {
                        namespace = declared;
                    }
                }
                TokenKind::Function => self.extract_function(index, &mut frames, &mut extraction),
                kind if kind.is_class_like() => {
                    self.extract_class(index, namespace.clone(), &mut frames, &mut extraction)
                }
                kind if kind.is_include() => {
                    if let Some(inclusion) = self.inclusion(index) {
                        extraction.inclusions.push(inclusion);
                    }
                }
                _ => {}
            }
        }

        crate::log_debug!("Structure extraction finished",
            "file" => stream.file(),
            "functions" => extraction.functions.len(),
            "classes" => extraction.classes.len(),
            "diagnostics" => extraction.diagnostics.len()
        );

        extraction
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn extract_function(&mut self, index: usize, frames: &mut Vec<Frame>, extraction: &mut Extraction) {
        let stream = self.resolver.stream();
        let line = stream.tokens()[index].line;
        let name = self.function_name(index);
        let display_name = name.clone().unwrap_or_else(|| ANONYMOUS_FUNCTION_NAME.to_string());

        let span = match self.resolver.resolve(index) {
            Ok(span) => span,
            Err(error) => {
                diagnose(extraction, DiagnosticSubject::Function, display_name, line, error);
                return;
            }
        };

        let owner = match frames.last() {
            Some(Frame::Class { class, .. }) => Some(*class),
            _ => None,
        };
        frames.push(Frame::Function {
            close: span.close_index,
        });

        if name.is_none() && !self.include_closures {
            return;
        }

        let (end_line, ccn) = if span.is_statement() {
            (line, 1)
        } else {
            match self
                .calculator
                .calculate(&mut self.resolver, index, span.close_index)
            {
                Ok(ccn) => (stream.tokens()[span.close_index].line, ccn),
                Err(error) => {
                    diagnose(extraction, DiagnosticSubject::Function, display_name, line, error);
                    return;
                }
            }
        };

        let preamble = self.preamble(index);
        let signature = self.signature(index, &span, name.is_none());
        let arguments = self.arguments(index, &span);
        let owner_name = owner.map(|class| {
            let class = &mut extraction.classes[class];
            class.methods.push(display_name.clone());
            class.name.clone()
        });

        if self.trace {
            crate::log_debug!("Extracted function",
                "name" => display_name,
                "line" => line,
                "ccn" => ccn
            );
        }

        extraction.functions.push(FunctionStructure {
            name: display_name,
            owner: owner_name,
            docblock: preamble.docblock,
            keywords: preamble.keywords,
            visibility: preamble.visibility,
            signature,
            arguments,
            start_line: line,
            end_line,
            ccn,
            file: stream.file().to_string(),
        });
    }

    /// Declared name, `None` for closures
    fn function_name(&self, index: usize) -> Option<String> {
        let stream = self.resolver.stream();
        let mut next = stream.next_significant(index)?;
        if stream.tokens()[next].kind == TokenKind::Ampersand {
            next = stream.next_significant(next)?;
        }
        let token = &stream.tokens()[next];
        match token.kind {
            TokenKind::OpenBracket | TokenKind::LambdaOp => None,
            _ => Some(token.text.clone()),
        }
    }

    /// Declaration text up to the body, without the `function` keyword
    fn signature(&self, index: usize, span: &ScopeSpan, anonymous: bool) -> String {
        let stream = self.resolver.stream();
        let end = span.body_open.unwrap_or(span.close_index);
        if anonymous {
            return format!(
                "{}{}",
                ANONYMOUS_FUNCTION_NAME,
                stream.text_between(index + 1, end).trim_end()
            );
        }

        let start = stream.next_significant(index).unwrap_or(index + 1);
        stream.text_between(start, end).trim().to_string()
    }

    fn arguments(&mut self, index: usize, span: &ScopeSpan) -> Vec<FunctionArgument> {
        let stream = self.resolver.stream();
        let header_end = span.body_open.unwrap_or(span.close_index);
        let open = stream
            .find(index + 1, |t| {
                matches!(t.kind, TokenKind::OpenBracket | TokenKind::LambdaOp)
            })
            .filter(|&open| open < header_end);
        let Some(open) = open else {
            return Vec::new();
        };
        let Ok(parameters) = self.resolver.resolve(open) else {
            return Vec::new();
        };

        let tokens = stream.tokens();
        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut segment_start = open + 1;
        for position in open + 1..=parameters.close_index {
            let kind = tokens[position].kind;
            if position == parameters.close_index || (depth == 0 && kind == TokenKind::Comma) {
                arguments.extend(parse_argument(&tokens[segment_start..position]));
                segment_start = position + 1;
            } else if kind.is_opening_delimiter() {
                depth += 1;
            } else if kind.closes_scope() {
                depth = depth.saturating_sub(1);
            }
        }
        arguments
    }

    // ------------------------------------------------------------------------
    // Classes, namespaces, inclusions
    // ------------------------------------------------------------------------

    fn extract_class(
        &mut self,
        index: usize,
        namespace: Option<String>,
        frames: &mut Vec<Frame>,
        extraction: &mut Extraction,
    ) {
        let stream = self.resolver.stream();
        let tokens = stream.tokens();
        let Some(kind) = ClassKind::from_kind(tokens[index].kind) else {
            return;
        };
        let line = tokens[index].line;

        let anonymous = stream
            .previous_significant(index)
            .map_or(false, |previous| tokens[previous].kind == TokenKind::New);
        let name = if anonymous {
            ANONYMOUS_CLASS_NAME.to_string()
        } else {
            match stream.next_significant(index) {
                Some(next) if tokens[next].kind == TokenKind::String => tokens[next].text.clone(),
                // `enum class` and similar compound forms are handled at the inner keyword
                _ => return,
            }
        };

        let span = match self.resolver.resolve(index) {
            Ok(span) => span,
            Err(error) => {
                diagnose(extraction, DiagnosticSubject::Class, name, line, error);
                return;
            }
        };

        let header_end = span.body_open.unwrap_or(span.close_index);
        let (parent, interfaces) = heritage(kind, &tokens[index + 1..header_end]);
        let preamble = self.preamble(index);
        let package = PackageTags::from_docblock(&preamble.docblock);

        if self.trace {
            crate::log_debug!("Extracted class", "name" => name, "kind" => kind, "line" => line);
        }

        extraction.classes.push(ClassStructure {
            name,
            kind,
            namespace,
            docblock: preamble.docblock,
            keywords: preamble.keywords,
            parent,
            interfaces,
            package,
            start_line: line,
            end_line: tokens[span.close_index].line,
            methods: Vec::new(),
            file: stream.file().to_string(),
        });
        frames.push(Frame::Class {
            class: extraction.classes.len() - 1,
            close: span.close_index,
        });
    }

    /// `Some(name)` for `namespace A\B`, `Some(None)` for a global
    /// `namespace { }` block, `None` when the keyword is a relative name
    /// (`namespace\f()`)
    fn namespace_declaration(&self, index: usize) -> Option<Option<String>> {
        let stream = self.resolver.stream();
        let tokens = stream.tokens();
        let first = stream.next_significant(index)?;
        match tokens[first].kind {
            TokenKind::OpenCurly => Some(None),
            TokenKind::String => {
                let name: String = tokens[first..]
                    .iter()
                    .take_while(|t| matches!(t.kind, TokenKind::String | TokenKind::NsSeparator))
                    .map(|t| t.text.as_str())
                    .collect();
                Some(Some(name))
            }
            _ => None,
        }
    }

    fn inclusion(&self, index: usize) -> Option<Inclusion> {
        let stream = self.resolver.stream();
        let tokens = stream.tokens();
        let kind = InclusionKind::from_kind(tokens[index].kind)?;
        let end = stream.end_of_statement(index);

        let operands: Vec<&Token> = tokens[index + 1..end.max(index + 1)]
            .iter()
            .filter(|t| {
                !t.is_trivia() && !matches!(t.kind, TokenKind::OpenBracket | TokenKind::CloseBracket)
            })
            .collect();
        let target = match operands.as_slice() {
            [literal] if literal.kind == TokenKind::ConstantEncapsedString => literal
                .text
                .trim_matches(|c| c == '\'' || c == '"')
                .to_string(),
            _ => stream.text_between(index + 1, end).trim().to_string(),
        };

        Some(Inclusion {
            kind,
            target,
            start_line: tokens[index].line,
            end_line: tokens[end].line,
        })
    }

    /// Walk back from a declaration keyword over modifiers to the doc comment
    fn preamble(&self, index: usize) -> Preamble {
        let tokens = self.resolver.stream().tokens();
        let floor = index.saturating_sub(DOCBLOCK_SCAN_LIMIT);
        let mut modifiers = Vec::new();
        let mut docblock = String::new();

        let mut cursor = index;
        while cursor > floor {
            cursor -= 1;
            let token = &tokens[cursor];
            match token.kind {
                TokenKind::Whitespace => {}
                TokenKind::Comment | TokenKind::DocComment => {
                    docblock = token.text.clone();
                    break;
                }
                kind if kind.is_modifier() => modifiers.push(token),
                _ => break,
            }
        }

        let mut visibility = None;
        let mut keywords = Vec::new();
        for token in modifiers.into_iter().rev() {
            let text = token.text.to_ascii_lowercase();
            if token.kind.is_visibility() && visibility.is_none() {
                visibility = Some(text);
            } else {
                keywords.push(text);
            }
        }

        Preamble {
            visibility,
            keywords,
            docblock,
        }
    }
}

fn diagnose(
    extraction: &mut Extraction,
    subject: DiagnosticSubject,
    name: String,
    line: u32,
    error: ScopeError,
) {
    let code = match subject {
        DiagnosticSubject::Function => codes::extraction::FUNCTION_EXTRACTION_FAILED,
        DiagnosticSubject::Class => codes::extraction::CLASS_EXTRACTION_FAILED,
    };
    crate::log_error!(code, "Skipping declaration with unresolved scope",
        line = line,
        "name" => name,
        "error" => error
    );

    extraction.diagnostics.push(ExtractionDiagnostic {
        subject,
        name,
        line,
        error,
    });
}

/// One parameter from the tokens between two top-level commas
fn parse_argument(tokens: &[Token]) -> Option<FunctionArgument> {
    let variable = tokens.iter().position(|t| t.kind == TokenKind::Variable)?;
    let type_hint: String = tokens[..variable]
        .iter()
        .filter(|t| {
            !t.is_trivia()
                && !t.kind.is_modifier()
                && !matches!(t.kind, TokenKind::Ampersand | TokenKind::Ellipsis)
        })
        .map(|t| t.text.as_str())
        .collect();

    Some(FunctionArgument::new(
        tokens[variable].text.clone(),
        (!type_hint.is_empty()).then_some(type_hint),
    ))
}

/// Parent and interface names from a class header
fn heritage(kind: ClassKind, header: &[Token]) -> (Option<String>, Vec<String>) {
    let mut parent = None;
    let mut interfaces = Vec::new();
    let mut clause: Option<TokenKind> = None;
    let mut current = String::new();
    let mut generics = 0usize;

    let mut flush = |clause: Option<TokenKind>, current: &mut String| {
        if current.is_empty() {
            return;
        }
        let name = std::mem::take(current);
        match clause {
            Some(TokenKind::Extends) if kind != ClassKind::Interface && parent.is_none() => {
                parent = Some(name)
            }
            Some(_) => interfaces.push(name),
            None => {}
        }
    };

    for token in header {
        match token.kind {
            TokenKind::TypelistLt => generics += 1,
            TokenKind::TypelistGt => generics = generics.saturating_sub(1),
            _ if generics > 0 => {}
            TokenKind::Extends | TokenKind::Implements => {
                flush(clause, &mut current);
                clause = Some(token.kind);
            }
            TokenKind::Comma => flush(clause, &mut current),
            TokenKind::String | TokenKind::NsSeparator if clause.is_some() => {
                current.push_str(&token.text)
            }
            _ => {}
        }
    }
    flush(clause, &mut current);

    (parent, interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lex, stream};
    use crate::tokens::RawToken;
    use assert_matches::assert_matches;

    fn preferences() -> AnalysisPreferences {
        AnalysisPreferences {
            ccn_policy: crate::structure::DEFAULT_CCN_POLICY,
            strict_scopes: false,
            trace_extraction: true,
            include_closures: true,
        }
    }

    fn extract(source: &str) -> Extraction {
        let stream = stream(source);
        FunctionStructureExtractor::new(&stream, &preferences()).extract()
    }

    #[test]
    fn test_documented_function() {
        let extraction = extract(
            "<?php\n/** f */\nfunction f() {\n    if ($a) { return 1; }\n    return 2;\n}\n",
        );

        assert_eq!(extraction.functions.len(), 1);
        let f = &extraction.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.docblock, "/** f */");
        assert!(f.signature.contains("f()"));
        assert_eq!(f.ccn, 2);
        assert_eq!((f.start_line, f.end_line), (3, 6));
        assert_eq!(f.file, "test.php");
        assert_eq!(f.visibility, None);
        assert!(!extraction.has_diagnostics());
    }

    #[test]
    fn test_missing_docblock_is_empty() {
        let extraction = extract("<?php $x = 1;\nfunction f() { }");
        assert_eq!(extraction.functions[0].docblock, "");
    }

    #[test]
    fn test_malformed_function_is_skipped_with_diagnostic() {
        let extraction = extract(
            "<?php\nfunction ok() { }\nfunction g() {\n    function h() { return 1; }\n",
        );

        let names: Vec<&str> = extraction.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "h"]);

        assert_eq!(extraction.diagnostics.len(), 1);
        let diagnostic = &extraction.diagnostics[0];
        assert_eq!(diagnostic.subject, DiagnosticSubject::Function);
        assert_eq!(diagnostic.name, "g");
        assert_eq!(diagnostic.line, 3);
        assert_matches!(
            diagnostic.error,
            ScopeError::UnmatchedScope { kind: TokenKind::Function, line: 3, .. }
        );
    }

    #[test]
    fn test_class_with_methods() {
        let extraction = extract(
            r#"<?php
namespace App\Billing;

/**
 * @package Billing
 */
abstract class Invoice extends Document implements Payable, \Countable
{
    /** Total */
    public static function total(int $a, ?string $b = null, &$c, ...$rest): int
    {
        return $a ?? 0;
    }

    abstract protected function render();

    private function helper() {
        $f = function ($x) use ($a) { return $x ? 1 : 2; };
    }
}
"#,
        );

        assert_eq!(extraction.classes.len(), 1);
        let class = &extraction.classes[0];
        assert_eq!(class.name, "Invoice");
        assert_eq!(class.kind, ClassKind::Class);
        assert_eq!(class.namespace.as_deref(), Some("App\\Billing"));
        assert_eq!(class.qualified_name(), "App\\Billing\\Invoice");
        assert_eq!(class.keywords, vec!["abstract"]);
        assert_eq!(class.parent.as_deref(), Some("Document"));
        assert_eq!(class.interfaces, vec!["Payable", "\\Countable"]);
        assert_eq!(class.package.package.as_deref(), Some("Billing"));
        assert_eq!(class.methods, vec!["total", "render", "helper"]);
        assert_eq!((class.start_line, class.end_line), (7, 20));

        let names: Vec<&str> = extraction.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["total", "render", "helper", "anonymous function"]);

        let total = &extraction.functions[0];
        assert_eq!(total.owner.as_deref(), Some("Invoice"));
        assert_eq!(total.visibility.as_deref(), Some("public"));
        assert_eq!(total.keywords, vec!["static"]);
        assert_eq!(total.docblock, "/** Total */");
        assert_eq!(total.ccn, 2);
        assert_eq!(
            total.arguments,
            vec![
                FunctionArgument::new("$a", Some("int".to_string())),
                FunctionArgument::new("$b", Some("?string".to_string())),
                FunctionArgument::new("$c", None),
                FunctionArgument::new("$rest", None),
            ]
        );
        assert!(total.signature.starts_with("total(int $a"));
        assert!(total.signature.ends_with(": int"));

        let render = &extraction.functions[1];
        assert_eq!(render.visibility.as_deref(), Some("protected"));
        assert_eq!(render.keywords, vec!["abstract"]);
        assert_eq!(render.start_line, render.end_line);
        assert_eq!(render.ccn, 1);
        assert_eq!(render.docblock, "");

        let helper = &extraction.functions[2];
        assert_eq!(helper.ccn, 1);

        let closure = &extraction.functions[3];
        assert!(closure.is_anonymous());
        assert_eq!(closure.owner, None);
        assert_eq!(closure.signature, "anonymous function ($x) use ($a)");
        assert_eq!(closure.ccn, 2);
        assert_eq!(closure.arguments, vec![FunctionArgument::new("$x", None)]);
    }

    #[test]
    fn test_closures_can_be_excluded() {
        let stream = stream("<?php function f() { $g = function () { }; }");
        let preferences = AnalysisPreferences {
            include_closures: false,
            ..preferences()
        };
        let extraction = FunctionStructureExtractor::new(&stream, &preferences).extract();
        assert_eq!(extraction.functions.len(), 1);
        assert_eq!(extraction.functions[0].name, "f");
    }

    #[test]
    fn test_interface_and_anonymous_class() {
        let extraction = extract(
            "<?php
interface Shape extends Named, Sized { function area(); }
$o = new class extends Base { public function run() { } };
function &ref() { }
",
        );

        let shape = &extraction.classes[0];
        assert_eq!(shape.kind, ClassKind::Interface);
        assert_eq!(shape.parent, None);
        assert_eq!(shape.interfaces, vec!["Named", "Sized"]);
        assert_eq!(shape.methods, vec!["area"]);

        let anonymous = &extraction.classes[1];
        assert!(anonymous.is_anonymous());
        assert_eq!(anonymous.parent.as_deref(), Some("Base"));

        let owners: Vec<Option<&str>> = extraction
            .functions
            .iter()
            .map(|f| f.owner.as_deref())
            .collect();
        assert_eq!(owners, vec![Some("Shape"), Some("anonymous class"), None]);
        assert_eq!(extraction.functions[2].name, "ref");
    }

    #[test]
    fn test_inclusions() {
        let extraction = extract("<?php\nrequire_once 'lib/a.php';\ninclude __DIR__ . '/b.php';\n");

        assert_eq!(extraction.inclusions.len(), 2);
        assert_eq!(extraction.inclusions[0].kind, InclusionKind::RequireOnce);
        assert_eq!(extraction.inclusions[0].target, "lib/a.php");
        assert_eq!(extraction.inclusions[0].start_line, 2);
        assert_eq!(extraction.inclusions[1].kind, InclusionKind::Include);
        assert_eq!(extraction.inclusions[1].target, "__DIR__ . '/b.php'");
        assert_eq!(extraction.inclusions[1].end_line, 3);
    }

    #[test]
    fn test_halt_compiler_stops_extraction() {
        let mut raw = lex("<?php function a() { } ");
        raw.push(RawToken::new("T_HALT_COMPILER", "__halt_compiler", 1));
        raw.extend(lex(" function b() { }"));
        let stream = TokenStream::build("halt.php", raw).unwrap();

        let extraction = FunctionStructureExtractor::new(&stream, &preferences()).extract();
        let names: Vec<&str> = extraction.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_nested_function_is_separate() {
        let extraction = extract(
            "<?php function outer($a) { if ($a) { } function inner($b) { if ($b) { } if ($b) { } } }",
        );

        assert_eq!(extraction.functions.len(), 2);
        assert_eq!(extraction.functions[0].ccn, 2);
        assert_eq!(extraction.functions[1].name, "inner");
        assert_eq!(extraction.functions[1].ccn, 3);
    }
}
