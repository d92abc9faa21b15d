//! Semantic roles of model nodes.
//!
//! Extensions may decorate a node but must hand back a node with the same
//! role: a rule function for rule `a` stays a rule function for rule `a`, an
//! LL(1) choice stays an LL(1) choice.

use crate::block::{Choice, ChoiceKind, CodeBlockForAlt};
use crate::file::{Lexer, Parser, RecognizerFile, RecognizerKind};
use crate::ops::SrcOp;
use crate::rewrite::{
    RewriteShape, RewriteTree, RewriteTreeClosure, RewriteTreeOptional, RewriteTreeStructure,
    TreeRewrite,
};
use crate::rule::RuleFunction;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    File(RecognizerKind),
    RuleTable(RecognizerKind),
    RuleFunction(String),
    Alternative,
    Choice(ChoiceKind),
    Ops,
    TreeRewrite,
    Rewrite(RewriteShape),
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(kind) => write!(f, "{kind} file"),
            Self::RuleTable(kind) => write!(f, "{kind} rule table"),
            Self::RuleFunction(name) => write!(f, "rule function `{name}`"),
            Self::Alternative => write!(f, "alternative block"),
            Self::Choice(ChoiceKind::Generic) => write!(f, "choice"),
            Self::Choice(kind) => write!(f, "{kind} choice"),
            Self::Ops => write!(f, "operation list"),
            Self::TreeRewrite => write!(f, "tree rewrite"),
            Self::Rewrite(shape) => write!(f, "rewrite {shape}"),
        }
    }
}

/// A node that can pass through an extension hook.
pub trait ModelNode {
    fn role(&self) -> NodeRole;
}

impl ModelNode for RecognizerFile {
    fn role(&self) -> NodeRole {
        NodeRole::File(self.kind())
    }
}

impl ModelNode for Parser {
    fn role(&self) -> NodeRole {
        NodeRole::RuleTable(RecognizerKind::Parser)
    }
}

impl ModelNode for Lexer {
    fn role(&self) -> NodeRole {
        NodeRole::RuleTable(RecognizerKind::Lexer)
    }
}

impl ModelNode for RuleFunction {
    fn role(&self) -> NodeRole {
        NodeRole::RuleFunction(self.name.clone())
    }
}

impl ModelNode for CodeBlockForAlt {
    fn role(&self) -> NodeRole {
        NodeRole::Alternative
    }
}

impl ModelNode for Choice {
    fn role(&self) -> NodeRole {
        NodeRole::Choice(self.kind)
    }
}

impl ModelNode for Vec<SrcOp> {
    fn role(&self) -> NodeRole {
        NodeRole::Ops
    }
}

impl ModelNode for TreeRewrite {
    fn role(&self) -> NodeRole {
        NodeRole::TreeRewrite
    }
}

impl ModelNode for RewriteTreeOptional {
    fn role(&self) -> NodeRole {
        NodeRole::Rewrite(RewriteShape::Optional)
    }
}

impl ModelNode for RewriteTreeClosure {
    fn role(&self) -> NodeRole {
        NodeRole::Rewrite(RewriteShape::Closure)
    }
}

impl ModelNode for RewriteTreeStructure {
    fn role(&self) -> NodeRole {
        NodeRole::Rewrite(RewriteShape::Structure)
    }
}

impl ModelNode for RewriteTree {
    fn role(&self) -> NodeRole {
        NodeRole::Rewrite(self.shape())
    }
}
