//! Structure recovery from a resolved token stream
//!
//! Functions, methods and closures become [`FunctionStructure`] values with
//! their cyclomatic complexity; class-like declarations and inclusions are
//! collected alongside. All results are owned values with no reference back
//! into the stream.

pub mod class;
pub mod complexity;
pub mod extractor;
pub mod function;

pub use class::{ClassKind, ClassStructure, Inclusion, InclusionKind, PackageTags};
pub use complexity::{CcnPolicy, ComplexityCalculator, DEFAULT_CCN_POLICY};
pub use extractor::{DiagnosticSubject, Extraction, ExtractionDiagnostic, FunctionStructureExtractor};
pub use function::{FunctionArgument, FunctionStructure};
