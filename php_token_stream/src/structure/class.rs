//! Class-like structures and file inclusions

use crate::tokens::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub fn from_kind(kind: TokenKind) -> Option<ClassKind> {
        match kind {
            TokenKind::Class => Some(ClassKind::Class),
            TokenKind::Interface => Some(ClassKind::Interface),
            TokenKind::Trait => Some(ClassKind::Trait),
            TokenKind::Enum => Some(ClassKind::Enum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `@package`, `@subpackage` and `@category` docblock tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTags {
    pub package: Option<String>,
    pub subpackage: Option<String>,
    pub category: Option<String>,
}

impl PackageTags {
    pub fn from_docblock(docblock: &str) -> Self {
        let tag = |name: &str| {
            docblock.lines().find_map(|line| {
                let rest = line.trim().trim_start_matches('*').trim();
                let value = rest.strip_prefix(name)?;
                // `@package` must not match `@packages`
                if !value.starts_with(char::is_whitespace) {
                    return None;
                }
                value.split_whitespace().next().map(str::to_string)
            })
        };

        Self {
            package: tag("@package"),
            subpackage: tag("@subpackage"),
            category: tag("@category"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.package.is_none() && self.subpackage.is_none() && self.category.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStructure {
    pub name: String,
    pub kind: ClassKind,
    pub namespace: Option<String>,
    pub docblock: String,
    /// `abstract`, `final`, ...
    pub keywords: Vec<String>,
    pub parent: Option<String>,
    /// Implemented interfaces; extended ones for an interface
    pub interfaces: Vec<String>,
    pub package: PackageTags,
    pub start_line: u32,
    pub end_line: u32,
    /// Method names in declaration order
    pub methods: Vec<String>,
    pub file: String,
}

impl ClassStructure {
    pub fn is_anonymous(&self) -> bool {
        self.name == crate::config::compile_time::structure::ANONYMOUS_CLASS_NAME
    }

    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{}\\{}", namespace, self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

impl InclusionKind {
    pub fn from_kind(kind: TokenKind) -> Option<InclusionKind> {
        match kind {
            TokenKind::Include => Some(InclusionKind::Include),
            TokenKind::IncludeOnce => Some(InclusionKind::IncludeOnce),
            TokenKind::Require => Some(InclusionKind::Require),
            TokenKind::RequireOnce => Some(InclusionKind::RequireOnce),
            _ => None,
        }
    }
}

/// An `include`/`require` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    pub kind: InclusionKind,
    /// Literal path without quotes, or the raw expression text
    pub target: String,
    pub start_line: u32,
    pub end_line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_tags() {
        let tags = PackageTags::from_docblock(
            "/**\n * Billing\n *\n * @category  Finance\n * @package Billing\n * @packages nope\n */",
        );
        assert_eq!(tags.package.as_deref(), Some("Billing"));
        assert_eq!(tags.category.as_deref(), Some("Finance"));
        assert_eq!(tags.subpackage, None);
        assert!(PackageTags::from_docblock("/** plain */").is_empty());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ClassKind::from_kind(TokenKind::Trait), Some(ClassKind::Trait));
        assert_eq!(ClassKind::from_kind(TokenKind::Function), None);
        assert_eq!(
            InclusionKind::from_kind(TokenKind::RequireOnce),
            Some(InclusionKind::RequireOnce)
        );
        assert_eq!(ClassKind::Enum.to_string(), "enum");
    }
}
