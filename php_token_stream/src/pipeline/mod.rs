//! Per-unit analysis: raw tokens -> stream -> scopes -> structures

mod error;
mod result;

pub use error::AnalysisError;
pub use result::UnitAnalysis;

use crate::config::AnalysisPreferences;
use crate::logging::codes;
use crate::scope::ScopeResolver;
use crate::structure::FunctionStructureExtractor;
use crate::tokens::{RawToken, TokenStream};
use std::path::Path;
use std::time::Instant;

/// Analyse one unit's raw lexer output.
///
/// Fails only when the unit as a whole is unusable: the stream cannot be
/// built, or `strict_scopes` is set and some scope does not close.
/// Broken declarations otherwise end up in [`UnitAnalysis::diagnostics`].
pub fn analyze_unit(
    name: &str,
    raw: Vec<RawToken>,
    preferences: &AnalysisPreferences,
) -> Result<UnitAnalysis, AnalysisError> {
    let start_time = Instant::now();
    crate::log_debug!("Analyzing unit", "unit" => name, "raw_tokens" => raw.len());

    let stream = TokenStream::build(name, raw).map_err(|e| report(e.into()))?;

    let mut resolver = ScopeResolver::new(&stream);
    if preferences.strict_scopes {
        let chains = resolver.resolve_all().map_err(|e| report(e.into()))?;
        crate::log_success!(codes::success::SCOPES_RESOLVED, "All scopes resolved",
            "unit" => name,
            "chains" => chains.len()
        );
    }

    let extraction = FunctionStructureExtractor::with_resolver(resolver, preferences).extract();
    crate::log_success!(
        codes::success::STRUCTURE_EXTRACTION_COMPLETE,
        "Structure extraction complete",
        "unit" => name,
        "functions" => extraction.functions.len()
    );

    let analysis = UnitAnalysis::new(stream, extraction, start_time.elapsed());
    analysis.log_success();
    Ok(analysis)
}

/// Load a token dump from disk and analyse it under its path
pub fn analyze_dump(
    path: &Path,
    preferences: &AnalysisPreferences,
) -> Result<UnitAnalysis, AnalysisError> {
    let dump = crate::file_processor::load_token_dump(path)?;
    analyze_unit(&path.display().to_string(), dump.raw_tokens, preferences)
}

fn report(error: AnalysisError) -> AnalysisError {
    match error.line() {
        Some(line) => crate::log_error!(error.code(), "Unit analysis failed",
            line = line,
            "error" => error
        ),
        None => crate::log_error!(error.code(), "Unit analysis failed", "error" => error),
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeError;
    use crate::test_support::lex;
    use crate::tokens::{TokenKind, TokenStreamError};
    use assert_matches::assert_matches;

    fn preferences(strict_scopes: bool) -> AnalysisPreferences {
        AnalysisPreferences {
            ccn_policy: crate::structure::DEFAULT_CCN_POLICY,
            strict_scopes,
            trace_extraction: false,
            include_closures: true,
        }
    }

    #[test]
    fn test_analyze_unit() {
        let raw = lex("<?php\n// helpers\nfunction a($x) {\n    return $x ? 1 : 2;\n}\n\nfunction b() {\n    $f = function () {\n        return 1;\n    };\n}\n");
        let analysis = analyze_unit("helpers.php", raw, &preferences(false)).unwrap();

        assert_eq!(analysis.unit, "helpers.php");
        assert_eq!(analysis.functions.len(), 3);
        assert_eq!(analysis.max_ccn(), 2);
        assert_eq!(analysis.lines_of_code.cloc, 1);
        assert!(!analysis.has_diagnostics());

        assert_eq!(analysis.function_for_line(4).map(|f| f.name.as_str()), Some("a"));
        assert_eq!(
            analysis.function_for_line(9).map(|f| f.name.as_str()),
            Some("anonymous function")
        );
        assert_eq!(analysis.function_for_line(7).map(|f| f.name.as_str()), Some("b"));
        assert!(analysis.function_for_line(6).is_none());
        assert!(!analysis.stream.tokens_on_line(4).is_empty());
    }

    #[test]
    fn test_lenient_mode_keeps_partial_results() {
        let raw = lex("<?php function ok() { } function broken() { if ($a) { }");
        let analysis = analyze_unit("broken.php", raw, &preferences(false)).unwrap();

        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.diagnostics.len(), 1);
    }

    #[test]
    fn test_strict_mode_fails_the_unit() {
        let raw = lex("<?php function ok() { } function broken() { if ($a) { }");
        let error = analyze_unit("broken.php", raw, &preferences(true)).unwrap_err();

        assert_matches!(
            error,
            AnalysisError::Scope(ScopeError::UnmatchedScope { kind: TokenKind::Function, .. })
        );
        assert_eq!(error.code(), codes::scope::UNMATCHED_SCOPE);
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn test_unknown_kind_fails_the_unit() {
        let raw = vec![
            RawToken::new("T_OPEN_TAG", "<?php ", 1),
            RawToken::new("T_NOT_A_TOKEN", "x", 2),
        ];
        let error = analyze_unit("odd.php", raw, &preferences(false)).unwrap_err();

        assert_matches!(
            error,
            AnalysisError::TokenStream(TokenStreamError::UnknownLexicalKind { position: 1, .. })
        );
        assert_eq!(error.code(), codes::tokens::UNKNOWN_LEXICAL_KIND);
        assert_eq!(error.line(), Some(2));
    }

    #[test]
    fn test_empty_unit() {
        let error = analyze_unit("empty.php", Vec::new(), &preferences(false)).unwrap_err();
        assert_eq!(error, AnalysisError::TokenStream(TokenStreamError::EmptyInput));
    }
}
