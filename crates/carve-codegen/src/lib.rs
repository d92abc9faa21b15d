//! Output model construction for carve.
//!
//! Turns an analyzed grammar into the target-independent model tree defined in
//! `carve-model`, one recognizer file per job.
//!
//! # Example
//!
//! ```
//! use carve_codegen::{Config, Controller, SourceGenWalker};
//! use carve_grammar::{GenericTarget, Grammar};
//!
//! let grammar = Grammar::parse(
//!     "(PARSER_GRAMMAR T (RULE start (BLOCK (ALT (TOKEN_REF ID)))))",
//! )
//! .expect("valid notation");
//!
//! let config = Config::new().target(GenericTarget::java());
//! let mut controller = Controller::new(&grammar, config).expect("target is set");
//! let model = controller
//!     .build_parser_model(&mut SourceGenWalker::new())
//!     .expect("no fatal errors");
//!
//! assert!(model.is_clean());
//! print!("{}", carve_model::dump(&model.file));
//! ```
//!
//! Modules:
//! - `controller` - job orchestration and the construction entry points
//! - `factory` - the core model builder
//! - `extension` - extension hooks and the ordered chain
//! - `context` - traversal state owned by one job
//! - `walker` - drives construction over a rule's syntax tree
//! - `diagnostics` - per-rule failures and warnings

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod context;
pub mod controller;
pub mod diagnostics;
pub mod extension;
pub mod factory;
pub mod point;
mod route;
pub mod tree_building;
pub mod walker;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod choice_tests;
#[cfg(test)]
mod tree_building_tests;
#[cfg(test)]
mod walker_tests;

use carve_grammar::GrammarKind;
use carve_grammar::cst::{SyntaxKind, SyntaxNode};
use carve_model::RecognizerKind;
use rowan::TextRange;

pub use config::Config;
pub use context::{Alternative, CodeBlockRef, RootInfo, TraversalContext};
pub use controller::{Controller, ParserModel, RuleOutcome};
pub use diagnostics::{
    DiagnosticBuilder, DiagnosticKind, DiagnosticMessage, Diagnostics, DiagnosticsPrinter,
    Severity,
};
pub use extension::{Extension, ExtensionChain};
pub use factory::{ChoiceSite, CoreFactory, DEFAULT_MODE, ModelFactory};
pub use point::ConstructionPoint;
pub use tree_building::TreeBuildingExtension;
pub use walker::{SourceGenWalker, SyntaxWalker};

/// Fatal errors. Any of these aborts the whole job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No target language was configured.
    #[error("no target configured")]
    MissingTarget,

    #[error("grammar `{grammar}` has no {kind} rules")]
    EmptyGrammar {
        grammar: String,
        kind: RecognizerKind,
    },

    #[error("{kind} grammar `{grammar}` cannot produce a {requested}")]
    UnsupportedRecognizer {
        grammar: String,
        kind: GrammarKind,
        requested: RecognizerKind,
    },

    /// An extension handed back a node of a different role.
    #[error("extension `{extension}` broke `{point}`: expected {expected}, found {found}")]
    ContractViolation {
        extension: String,
        point: ConstructionPoint,
        expected: String,
        found: String,
    },

    /// The rule stack was popped or read while empty.
    #[error("no rule is under construction")]
    RuleStackEmpty,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of constructing one rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The rule's syntax has a shape construction cannot handle. Only this
    /// rule is affected.
    #[error("malformed {}: {detail}", describe_kind(*.kind))]
    Malformed {
        kind: SyntaxKind,
        point: Option<ConstructionPoint>,
        range: TextRange,
        detail: String,
    },

    #[error(transparent)]
    Fatal(#[from] Error),
}

impl RuleError {
    pub fn malformed(
        node: &SyntaxNode,
        point: Option<ConstructionPoint>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            kind: node.kind(),
            point,
            range: node.text_range(),
            detail: detail.into(),
        }
    }
}

/// Head word of a node kind, or its debug name for tokens.
pub(crate) fn describe_kind(kind: SyntaxKind) -> String {
    kind.head()
        .map_or_else(|| format!("{kind:?}"), str::to_string)
}
