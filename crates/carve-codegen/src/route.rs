//! Routes for the generic choice and rewrite entry points.
//!
//! Each variant maps to exactly one construction point, one builder method
//! and one extension hook, so every typed entry point shares the same path.

use carve_grammar::ast;
use carve_grammar::cst::SyntaxNode;
use carve_model::{Choice, ChoiceKind, CodeBlockForAlt, RewriteShape, RewriteTree, SrcOp};

use crate::RuleError;
use crate::controller::Controller;
use crate::extension::Extension;
use crate::factory::{ChoiceSite, ModelFactory};
use crate::point::ConstructionPoint;

type ChoiceBuild =
    fn(&mut dyn ModelFactory, &ChoiceSite, Vec<CodeBlockForAlt>, Vec<Vec<SrcOp>>) -> Choice;

#[derive(Clone, Copy)]
pub(crate) struct ChoiceRoute {
    pub point: ConstructionPoint,
    pub hook: fn(&dyn Extension, Choice) -> Choice,
    /// Builder call. The last argument holds the LL(1) tests and is empty otherwise.
    pub build: ChoiceBuild,
}

pub(crate) fn choice_route(kind: ChoiceKind) -> ChoiceRoute {
    match kind {
        ChoiceKind::Generic => ChoiceRoute {
            point: ConstructionPoint::ChoiceBlock,
            hook: |ext, choice| ext.choice_block(choice),
            build: |f, site, alts, _| f.choice_block(site, alts),
        },
        ChoiceKind::Ebnf => ChoiceRoute {
            point: ConstructionPoint::EbnfBlock,
            hook: |ext, choice| ext.ebnf_block(choice),
            build: |f, site, alts, _| f.ebnf_block(site, alts),
        },
        ChoiceKind::Ll1 => ChoiceRoute {
            point: ConstructionPoint::Ll1ChoiceBlock,
            hook: |ext, choice| ext.ll1_choice_block(choice),
            build: |f, site, alts, tests| f.ll1_choice_block(site, alts, tests),
        },
        ChoiceKind::LlStar => ChoiceRoute {
            point: ConstructionPoint::LlStarChoiceBlock,
            hook: |ext, choice| ext.ll_star_choice_block(choice),
            build: |f, site, alts, _| f.ll_star_choice_block(site, alts),
        },
        ChoiceKind::EbnfLl1 => ChoiceRoute {
            point: ConstructionPoint::Ll1EbnfBlock,
            hook: |ext, choice| ext.ll1_ebnf_block(choice),
            build: |f, site, alts, tests| f.ll1_ebnf_block(site, alts, tests),
        },
        ChoiceKind::EbnfLlStar => ChoiceRoute {
            point: ConstructionPoint::LlStarEbnfBlock,
            hook: |ext, choice| ext.ll_star_ebnf_block(choice),
            build: |f, site, alts, _| f.ll_star_ebnf_block(site, alts),
        },
    }
}

type RewriteBuild =
    fn(&mut Controller<'_>, &SyntaxNode, Vec<SrcOp>, Vec<SrcOp>) -> Result<RewriteTree, RuleError>;

#[derive(Clone, Copy)]
pub(crate) struct RewriteRoute {
    pub point: ConstructionPoint,
    /// Typed entry point. Receives the body ops, or the root and children for trees.
    pub build: RewriteBuild,
}

pub(crate) fn rewrite_route(shape: RewriteShape) -> RewriteRoute {
    match shape {
        RewriteShape::Optional => RewriteRoute {
            point: ConstructionPoint::RewriteOptional,
            build: build_optional,
        },
        RewriteShape::Closure => RewriteRoute {
            point: ConstructionPoint::RewriteClosure,
            build: build_closure,
        },
        RewriteShape::Structure => RewriteRoute {
            point: ConstructionPoint::RewriteTree,
            build: build_tree,
        },
    }
}

fn build_optional(
    ctrl: &mut Controller<'_>,
    node: &SyntaxNode,
    ops: Vec<SrcOp>,
    _children: Vec<SrcOp>,
) -> Result<RewriteTree, RuleError> {
    let optional = cast_node(
        node,
        ast::RewriteOptional::cast,
        ConstructionPoint::RewriteOptional,
    )?;
    Ok(ctrl
        .rewrite_optional(&optional, ops)
        .map(RewriteTree::Optional)?)
}

fn build_closure(
    ctrl: &mut Controller<'_>,
    node: &SyntaxNode,
    ops: Vec<SrcOp>,
    _children: Vec<SrcOp>,
) -> Result<RewriteTree, RuleError> {
    let closure = cast_node(
        node,
        ast::RewriteClosure::cast,
        ConstructionPoint::RewriteClosure,
    )?;
    Ok(ctrl
        .rewrite_closure(&closure, ops)
        .map(RewriteTree::Closure)?)
}

fn build_tree(
    ctrl: &mut Controller<'_>,
    node: &SyntaxNode,
    root: Vec<SrcOp>,
    children: Vec<SrcOp>,
) -> Result<RewriteTree, RuleError> {
    let tree = cast_node(node, ast::RewriteTree::cast, ConstructionPoint::RewriteTree)?;
    Ok(ctrl
        .rewrite_tree(&tree, root, children)
        .map(RewriteTree::Structure)?)
}

fn cast_node<T>(
    node: &SyntaxNode,
    cast: fn(SyntaxNode) -> Option<T>,
    point: ConstructionPoint,
) -> Result<T, RuleError> {
    cast(node.clone()).ok_or_else(|| {
        RuleError::malformed(
            node,
            Some(point),
            format!("`{point}` cannot be built from this node"),
        )
    })
}
