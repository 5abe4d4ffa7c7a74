use crate::structure::{
    ClassStructure, Extraction, ExtractionDiagnostic, FunctionStructure, Inclusion,
};
use crate::tokens::{LinesOfCode, TokenStream};
use serde::Serialize;
use std::time::Duration;

/// Everything recovered from one unit
#[derive(Debug, Clone, Serialize)]
pub struct UnitAnalysis {
    pub unit: String,
    /// Kept for consumers that map lines back to tokens
    #[serde(skip)]
    pub stream: TokenStream,
    pub token_count: usize,
    pub lines_of_code: LinesOfCode,
    pub functions: Vec<FunctionStructure>,
    pub classes: Vec<ClassStructure>,
    pub inclusions: Vec<Inclusion>,
    pub diagnostics: Vec<ExtractionDiagnostic>,
    #[serde(skip)]
    pub processing_duration: Duration,
}

impl UnitAnalysis {
    pub fn new(stream: TokenStream, extraction: Extraction, processing_duration: Duration) -> Self {
        Self {
            unit: stream.file().to_string(),
            token_count: stream.len(),
            lines_of_code: stream.lines_of_code(),
            functions: extraction.functions,
            classes: extraction.classes,
            inclusions: extraction.inclusions,
            diagnostics: extraction.diagnostics,
            stream,
            processing_duration,
        }
    }

    /// Innermost function whose extent covers `line`
    pub fn function_for_line(&self, line: u32) -> Option<&FunctionStructure> {
        self.functions
            .iter()
            .filter(|f| f.contains_line(line))
            .min_by_key(|f| f.end_line - f.start_line)
    }

    pub fn max_ccn(&self) -> u32 {
        self.functions.iter().map(|f| f.ccn).max().unwrap_or(0)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::UNIT_ANALYSIS_COMPLETE,
            "Unit analysis complete",
            "unit" => self.unit,
            "tokens" => self.token_count,
            "functions" => self.functions.len(),
            "classes" => self.classes.len(),
            "diagnostics" => self.diagnostics.len(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
