//! Function and method structures

use serde::{Deserialize, Serialize};

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArgument {
    /// Variable name including the `$`
    pub name: String,
    pub type_hint: Option<String>,
}

impl FunctionArgument {
    pub fn new(name: impl Into<String>, type_hint: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_hint,
        }
    }
}

/// A named function, method or closure found in a token stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionStructure {
    pub name: String,
    /// Enclosing class-like structure for methods
    pub owner: Option<String>,
    /// Adjacent doc comment, empty when there is none
    pub docblock: String,
    /// Non-visibility modifiers in source order (`static`, `abstract`, ...)
    pub keywords: Vec<String>,
    pub visibility: Option<String>,
    pub signature: String,
    pub arguments: Vec<FunctionArgument>,
    pub start_line: u32,
    pub end_line: u32,
    pub ccn: u32,
    pub file: String,
}

impl FunctionStructure {
    pub fn is_anonymous(&self) -> bool {
        self.name == crate::config::compile_time::structure::ANONYMOUS_FUNCTION_NAME
    }

    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }

    /// `Owner::name` for methods, `name` otherwise
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }

    /// Change Risk Anti-Patterns score for a coverage percentage (0-100)
    pub fn crap(&self, coverage: f64) -> f64 {
        let ccn = f64::from(self.ccn);
        let uncovered = 1.0 - coverage.clamp(0.0, 100.0) / 100.0;
        ccn.powi(2) * uncovered.powi(3) + ccn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(ccn: u32) -> FunctionStructure {
        FunctionStructure {
            name: "run".to_string(),
            owner: Some("Job".to_string()),
            docblock: String::new(),
            keywords: Vec::new(),
            visibility: Some("public".to_string()),
            signature: "run()".to_string(),
            arguments: Vec::new(),
            start_line: 3,
            end_line: 9,
            ccn,
            file: "Job.php".to_string(),
        }
    }

    #[test]
    fn test_crap_bounds() {
        let f = structure(4);
        assert_eq!(f.crap(100.0), 4.0);
        assert_eq!(f.crap(0.0), 20.0);
        assert_eq!(f.crap(50.0), 16.0 * 0.125 + 4.0);
        assert_eq!(f.crap(250.0), 4.0);
    }

    #[test]
    fn test_naming() {
        let f = structure(1);
        assert!(f.is_method());
        assert!(!f.is_anonymous());
        assert_eq!(f.qualified_name(), "Job::run");
        assert!(f.contains_line(3) && f.contains_line(9) && !f.contains_line(10));
    }
}
