//! Leaf source operations.
//!
//! A `SrcOp` is one step of generated recognizer code. Choices and rewrite
//! constructs nest further operations; everything else is a leaf.

use serde::Serialize;

use crate::block::Choice;
use crate::rewrite::{RewriteTreeClosure, RewriteTreeOptional, RewriteTreeStructure, TreeRewrite};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SrcOp {
    /// Match a token by type.
    MatchToken {
        name: String,
        ttype: i32,
        labels: Vec<String>,
    },
    /// Call a rule function.
    InvokeRule {
        name: String,
        ctx_type: String,
        args: Option<String>,
        labels: Vec<String>,
    },
    /// Match a string literal by its token type.
    MatchLiteral {
        literal: String,
        ttype: i32,
        labels: Vec<String>,
    },
    Action {
        code: String,
    },
    /// Action executed even while speculating.
    ForcedAction {
        code: String,
    },
    SemPred {
        predicate: String,
    },
    /// Matches nothing.
    Epsilon,
    Choice(Box<Choice>),
    /// Precomputed lookahead test.
    TestSetInline {
        ttypes: Vec<i32>,
        token_names: Vec<String>,
    },
    /// Add a labeled element as a child of the tree under construction.
    AddLeaf {
        label: String,
    },
    /// Make a labeled element the root of the tree under construction.
    BecomeRoot {
        label: String,
    },
    TreeRewrite(Box<TreeRewrite>),
    RewriteOptional(Box<RewriteTreeOptional>),
    RewriteClosure(Box<RewriteTreeClosure>),
    RewriteTree(Box<RewriteTreeStructure>),
    RewriteTokenRef {
        token: String,
        ttype: i32,
        is_root: bool,
        arg: Option<String>,
        tree_level: usize,
        code_block_level: usize,
    },
    RewriteRuleRef {
        rule: String,
        is_root: bool,
        tree_level: usize,
        code_block_level: usize,
    },
}

/// Discriminant of a `SrcOp`, used for role checks and dumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    MatchToken,
    InvokeRule,
    MatchLiteral,
    Action,
    ForcedAction,
    SemPred,
    Epsilon,
    Choice,
    TestSetInline,
    AddLeaf,
    BecomeRoot,
    TreeRewrite,
    RewriteOptional,
    RewriteClosure,
    RewriteTree,
    RewriteTokenRef,
    RewriteRuleRef,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MatchToken => "match-token",
            Self::InvokeRule => "invoke-rule",
            Self::MatchLiteral => "match-literal",
            Self::Action => "action",
            Self::ForcedAction => "forced-action",
            Self::SemPred => "sempred",
            Self::Epsilon => "epsilon",
            Self::Choice => "choice",
            Self::TestSetInline => "test-set",
            Self::AddLeaf => "add-leaf",
            Self::BecomeRoot => "become-root",
            Self::TreeRewrite => "tree-rewrite",
            Self::RewriteOptional => "rewrite-optional",
            Self::RewriteClosure => "rewrite-closure",
            Self::RewriteTree => "rewrite-tree",
            Self::RewriteTokenRef => "rewrite-token-ref",
            Self::RewriteRuleRef => "rewrite-rule-ref",
        };
        f.write_str(name)
    }
}

impl SrcOp {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::MatchToken { .. } => OpKind::MatchToken,
            Self::InvokeRule { .. } => OpKind::InvokeRule,
            Self::MatchLiteral { .. } => OpKind::MatchLiteral,
            Self::Action { .. } => OpKind::Action,
            Self::ForcedAction { .. } => OpKind::ForcedAction,
            Self::SemPred { .. } => OpKind::SemPred,
            Self::Epsilon => OpKind::Epsilon,
            Self::Choice(_) => OpKind::Choice,
            Self::TestSetInline { .. } => OpKind::TestSetInline,
            Self::AddLeaf { .. } => OpKind::AddLeaf,
            Self::BecomeRoot { .. } => OpKind::BecomeRoot,
            Self::TreeRewrite(_) => OpKind::TreeRewrite,
            Self::RewriteOptional(_) => OpKind::RewriteOptional,
            Self::RewriteClosure(_) => OpKind::RewriteClosure,
            Self::RewriteTree(_) => OpKind::RewriteTree,
            Self::RewriteTokenRef { .. } => OpKind::RewriteTokenRef,
            Self::RewriteRuleRef { .. } => OpKind::RewriteRuleRef,
        }
    }

    pub fn action(code: impl Into<String>) -> Self {
        Self::Action { code: code.into() }
    }

    /// Labels of a labeled op; `None` for ops that cannot carry labels.
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            Self::MatchToken { labels, .. }
            | Self::InvokeRule { labels, .. }
            | Self::MatchLiteral { labels, .. } => Some(labels),
            _ => None,
        }
    }

    pub fn labels_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::MatchToken { labels, .. }
            | Self::InvokeRule { labels, .. }
            | Self::MatchLiteral { labels, .. } => Some(labels),
            _ => None,
        }
    }

    pub fn is_labeled_op(&self) -> bool {
        self.labels().is_some()
    }

    /// First label of a labeled op.
    pub fn label(&self) -> Option<&str> {
        self.labels()?.first().map(String::as_str)
    }
}
