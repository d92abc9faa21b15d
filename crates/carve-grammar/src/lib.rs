//! Grammar inputs for carve code generation.
//!
//! Grammars reach code generation already parsed and already analyzed. This
//! crate holds what code generation reads from them:
//! - `cst` / `ast` - lossless syntax tree and typed wrappers
//! - `notation` - reader for the s-expression form of a parsed grammar
//! - `vocabulary` - token types and display names
//! - `lookahead` / `decision` - classifications supplied by analysis
//! - `grammar` - the loaded grammar
//! - `target` - target-language naming conventions

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod cst;
pub mod decision;
pub mod grammar;
pub mod lookahead;
pub mod notation;
pub mod target;
pub mod utils;
pub mod vocabulary;

#[cfg(test)]
mod notation_tests;
#[cfg(test)]
mod utils_tests;

pub use decision::{DecisionInfo, DecisionStrategy};
pub use grammar::{Grammar, GrammarKind};
pub use lookahead::LookaheadSet;
pub use notation::NotationError;
pub use target::{GenericTarget, Target};
pub use vocabulary::Vocabulary;
