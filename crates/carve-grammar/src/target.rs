//! Target-language naming conventions.
//!
//! Code generation never hardcodes generated names; it asks the target.

use crate::utils::capitalize;

pub trait Target: std::fmt::Debug + Send + Sync {
    /// Human-readable language name, e.g. `Java`.
    fn language(&self) -> &str;

    /// File name for a recognizer, e.g. `TParser.java`.
    fn recognizer_file_name(&self, recognizer_name: &str) -> String;

    /// Generated context type for a rule: `expr` becomes `ExprContext`.
    fn rule_context_struct_name(&self, rule: &str) -> String {
        format!("{}Context", capitalize(rule))
    }

    /// Label given to an unlabeled token reference that actions refer to.
    fn implicit_token_label(&self, token: &str) -> String {
        format!("_{}", token.to_lowercase())
    }

    /// Label given to an unlabeled rule reference that actions refer to.
    fn implicit_rule_label(&self, rule: &str) -> String {
        format!("_{rule}")
    }
}

/// Target configured by language name and file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericTarget {
    language: String,
    extension: String,
}

impl GenericTarget {
    pub fn new(language: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            extension: extension.into(),
        }
    }

    pub fn java() -> Self {
        Self::new("Java", "java")
    }
}

impl Target for GenericTarget {
    fn language(&self) -> &str {
        &self.language
    }

    fn recognizer_file_name(&self, recognizer_name: &str) -> String {
        format!("{recognizer_name}.{}", self.extension)
    }
}
