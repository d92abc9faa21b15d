//! Output model tree for carve recognizer generation.
//!
//! This crate contains the target-independent vocabulary handed to renderers:
//! - `file` - recognizer files and their rule tables (parser or lexer)
//! - `rule` - rule functions and rule context descriptors
//! - `block` - alternative code blocks and choice constructs
//! - `ops` - leaf source operations
//! - `rewrite` - output-tree rewrite constructs
//! - `role` - semantic roles used to validate extension output
//! - `dump` - human-readable tree dump
//!
//! Nodes are plain data. Construction lives in `carve-codegen`.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod block;
pub mod dump;
pub mod file;
pub mod ops;
pub mod rewrite;
pub mod role;
pub mod rule;

#[cfg(test)]
mod model_tests;

pub use block::{Choice, ChoiceKind, CodeBlockForAlt, EbnfKind};
pub use dump::dump;
pub use file::{Lexer, Parser, Recognizer, RecognizerFile, RecognizerKind};
pub use ops::{OpKind, SrcOp};
pub use rewrite::{
    RewriteShape, RewriteTree, RewriteTreeClosure, RewriteTreeOptional, RewriteTreeStructure,
    TreeRewrite,
};
pub use role::{ModelNode, NodeRole};
pub use rule::{AttributeDecl, Decl, DeclKind, RuleFunction, StructDecl};
