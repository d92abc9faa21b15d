//! Automatic output-tree construction.

use carve_grammar::cst::SyntaxNode;
use carve_model::SrcOp;

use crate::extension::Extension;

/// Labels every reference and records how each one joins the output tree.
///
/// Unmarked references become leaves; `^` references become the new root.
/// `!` references are matched but never added.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeBuildingExtension;

impl TreeBuildingExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for TreeBuildingExtension {
    fn name(&self) -> &str {
        "tree-building"
    }

    fn needs_implicit_label(&self, _id: &SyntaxNode, op: &SrcOp) -> bool {
        op.is_labeled_op()
    }

    fn leaf_rule(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        insert_after_labeled(ops, |label| SrcOp::AddLeaf { label })
    }

    fn leaf_token(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        insert_after_labeled(ops, |label| SrcOp::AddLeaf { label })
    }

    fn root_token(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        insert_after_labeled(ops, |label| SrcOp::BecomeRoot { label })
    }

    fn root_rule(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        insert_after_labeled(ops, |label| SrcOp::BecomeRoot { label })
    }
}

/// Insert `make(label)` right after the first labeled op. Lists without one
/// are returned unchanged.
fn insert_after_labeled(mut ops: Vec<SrcOp>, make: impl FnOnce(String) -> SrcOp) -> Vec<SrcOp> {
    let found = ops
        .iter()
        .enumerate()
        .find_map(|(i, op)| op.label().map(|label| (i, label.to_string())));
    if let Some((i, label)) = found {
        ops.insert(i + 1, make(label));
    }
    ops
}
