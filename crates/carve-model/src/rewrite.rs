//! Output-tree rewrite constructs.
//!
//! These mirror EBNF quantifiers and grouping, but describe how to build an
//! output tree rather than how to match input.

use serde::Serialize;

use crate::ops::SrcOp;

/// Container for one alternative's rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TreeRewrite {
    /// Code-block level the rewrite was built at.
    pub code_block_level: usize,
    pub ops: Vec<SrcOp>,
}

/// `(...)?` in a rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RewriteTreeOptional {
    pub code_block_level: usize,
    /// Labels and rule names the block refers to; the block runs when any has a value.
    pub referenced: Vec<String>,
    pub ops: Vec<SrcOp>,
}

/// `(...)*` in a rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RewriteTreeClosure {
    pub code_block_level: usize,
    /// Labels and rule names iterated together.
    pub referenced: Vec<String>,
    pub ops: Vec<SrcOp>,
}

/// `^(root children...)` in a rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RewriteTreeStructure {
    pub tree_level: usize,
    pub code_block_level: usize,
    pub root: Vec<SrcOp>,
    pub children: Vec<SrcOp>,
}

/// Shape selector for the generic rewrite entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteShape {
    Optional,
    Closure,
    Structure,
}

impl std::fmt::Display for RewriteShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optional => f.write_str("optional"),
            Self::Closure => f.write_str("closure"),
            Self::Structure => f.write_str("tree"),
        }
    }
}

/// Any rewrite construct produced by the generic entry point.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RewriteTree {
    Optional(RewriteTreeOptional),
    Closure(RewriteTreeClosure),
    Structure(RewriteTreeStructure),
}

impl RewriteTree {
    pub fn shape(&self) -> RewriteShape {
        match self {
            Self::Optional(_) => RewriteShape::Optional,
            Self::Closure(_) => RewriteShape::Closure,
            Self::Structure(_) => RewriteShape::Structure,
        }
    }

    pub fn into_op(self) -> SrcOp {
        match self {
            Self::Optional(o) => SrcOp::RewriteOptional(Box::new(o)),
            Self::Closure(c) => SrcOp::RewriteClosure(Box::new(c)),
            Self::Structure(t) => SrcOp::RewriteTree(Box::new(t)),
        }
    }
}
