//! Drives construction over a rule's syntax tree.
//!
//! The walker decides which construction point applies to each node and calls
//! the matching controller entry point. It never talks to the factory or the
//! extensions directly.

use carve_grammar::DecisionStrategy;
use carve_grammar::ast::{self, Element, Label, RewriteElement};
use carve_model::{CodeBlockForAlt, RewriteShape, SrcOp};

use crate::RuleError;
use crate::controller::Controller;
use crate::diagnostics::DiagnosticKind;
use crate::factory::ChoiceSite;
use crate::point::ConstructionPoint;

type WalkResult<T> = Result<T, RuleError>;

/// Builds the code of one rule through a controller.
pub trait SyntaxWalker {
    /// Returns the rule body. Called with the rule already on the context's
    /// rule stack.
    fn walk_rule(
        &mut self,
        ctrl: &mut Controller<'_>,
        rule: &ast::Rule,
    ) -> WalkResult<Vec<SrcOp>>;
}

/// The stock walker for source generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceGenWalker;

impl SourceGenWalker {
    pub fn new() -> Self {
        Self
    }

    /// A block with one alternative is inlined, anything else becomes a choice.
    fn block(&mut self, ctrl: &mut Controller<'_>, block: &ast::Block) -> WalkResult<Vec<SrcOp>> {
        let alts: Vec<ast::Alt> = block.alts().collect();
        match alts.as_slice() {
            [] => Err(RuleError::malformed(
                block.as_cst(),
                None,
                "block has no alternatives",
            )),
            [alt] => Ok(self.alternative(ctrl, alt, 1)?.ops),
            _ => {
                let site = ChoiceSite::Block(block.clone());
                let choice = self.choice(ctrl, site, &alts)?;
                Ok(vec![choice])
            }
        }
    }

    fn ebnf(&mut self, ctrl: &mut Controller<'_>, ebnf: &ast::Ebnf) -> WalkResult<Vec<SrcOp>> {
        let block = ebnf
            .block()
            .ok_or_else(|| RuleError::malformed(ebnf.as_cst(), None, "EBNF has no block"))?;
        let alts: Vec<ast::Alt> = block.alts().collect();
        if alts.is_empty() {
            return Err(RuleError::malformed(
                block.as_cst(),
                None,
                "block has no alternatives",
            ));
        }
        let choice = self.choice(ctrl, ChoiceSite::Ebnf(ebnf.clone()), &alts)?;
        Ok(vec![choice])
    }

    fn choice(
        &mut self,
        ctrl: &mut Controller<'_>,
        site: ChoiceSite,
        alts: &[ast::Alt],
    ) -> WalkResult<SrcOp> {
        let saved_alt = ctrl.current_alt().cloned();
        ctrl.push_block(site.decision());
        let mut blocks = Vec::with_capacity(alts.len());
        for (i, alt) in alts.iter().enumerate() {
            blocks.push(self.alternative(ctrl, alt, i + 1)?);
        }
        ctrl.pop_block();
        ctrl.set_current_alt(saved_alt);

        let kind = self.strategy(ctrl, &site).choice_kind(site.is_ebnf());
        let choice = ctrl.choice(kind, &site, blocks)?;
        Ok(SrcOp::Choice(Box::new(choice)))
    }

    /// Strategy analysis chose for this site. Unclassified sites fall back to
    /// a generic choice with a warning.
    fn strategy(&self, ctrl: &mut Controller<'_>, site: &ChoiceSite) -> DecisionStrategy {
        let grammar = ctrl.grammar();
        let detail = match site.decision() {
            Some(decision) => match grammar.classify(decision) {
                Some(info) => return info.strategy,
                None => format!("decision {decision} has no classification"),
            },
            None => "block has no decision number".to_string(),
        };
        let rule = ctrl
            .current_rule()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        tracing::warn!(rule = %rule, %detail, "falling back to a generic choice");
        ctrl.report(DiagnosticKind::UnclassifiedDecision, site.syntax().text_range())
            .message(detail)
            .rule(rule)
            .emit();
        DecisionStrategy::Generic
    }

    fn alternative(
        &mut self,
        ctrl: &mut Controller<'_>,
        alt: &ast::Alt,
        alt_num: usize,
    ) -> WalkResult<CodeBlockForAlt> {
        if let Some(child) = alt.unknown_children().next() {
            let detail = format!(
                "unexpected {} in alternative",
                crate::describe_kind(child.kind())
            );
            return Err(RuleError::malformed(
                &child,
                Some(ConstructionPoint::Alternative),
                detail,
            ));
        }

        let elements: Vec<Element> = alt.elements().collect();
        let rewrite = alt.rewrite();
        match (elements.as_slice(), &rewrite) {
            ([], None) => {
                return Err(RuleError::malformed(
                    alt.as_cst(),
                    Some(ConstructionPoint::Alternative),
                    "alternative has no elements",
                ));
            }
            ([Element::Epsilon(_)], None) => return Ok(ctrl.epsilon(alt, alt_num)?),
            _ => {}
        }

        let blk = ctrl.alternative(alt, alt_num)?;
        let mut ops = Vec::new();
        for element in &elements {
            ops.extend(self.element(ctrl, element)?);
        }
        if let Some(rewrite) = rewrite {
            let body = self.rewrite_elements(ctrl, rewrite.elements())?;
            let tree = ctrl.tree_rewrite(&rewrite, body)?;
            ops.push(SrcOp::TreeRewrite(Box::new(tree)));
        }
        Ok(ctrl.finish_alternative(blk, ops)?)
    }

    fn element(
        &mut self,
        ctrl: &mut Controller<'_>,
        element: &Element,
    ) -> WalkResult<Vec<SrcOp>> {
        match element {
            Element::RuleRef(_) | Element::TokenRef(_) | Element::StringLiteral(_) => {
                self.reference(ctrl, element, None)
            }
            Element::Action(action) => ctrl.action(action),
            Element::ForcedAction(action) => ctrl.forced_action(action),
            Element::Sempred(pred) => ctrl.sempred(pred),
            Element::Epsilon(_) => Ok(vec![SrcOp::Epsilon]),
            Element::Block(block) => self.block(ctrl, block),
            Element::Ebnf(ebnf) => self.ebnf(ctrl, ebnf),
            Element::Root(root) => {
                let inner = root.element().ok_or_else(|| {
                    RuleError::malformed(root.as_cst(), None, "`^` has no operand")
                })?;
                let (inner, label) = split_label(&inner);
                let ops = self.reference(ctrl, &inner, label.as_ref())?;
                match inner {
                    Element::RuleRef(_) => Ok(ctrl.root_rule(ops)?),
                    _ => Ok(ctrl.root_token(ops)?),
                }
            }
            Element::Bang(bang) => {
                let inner = bang.element().ok_or_else(|| {
                    RuleError::malformed(bang.as_cst(), None, "`!` has no operand")
                })?;
                self.element(ctrl, &inner)
            }
            Element::Assign(_) | Element::PlusAssign(_) => {
                let (inner, label) = split_label(element);
                self.reference(ctrl, &inner, label.as_ref())
            }
        }
    }

    /// A rule, token or literal reference, optionally labeled.
    fn reference(
        &mut self,
        ctrl: &mut Controller<'_>,
        element: &Element,
        label: Option<&Label>,
    ) -> WalkResult<Vec<SrcOp>> {
        match element {
            Element::RuleRef(r) => ctrl.rule_ref(r, label),
            Element::TokenRef(t) => ctrl.token_ref(t, label),
            Element::StringLiteral(s) => ctrl.string_ref(s, label),
            other => {
                let node = label.map_or(other.as_cst(), Label::as_cst);
                Err(RuleError::malformed(
                    node,
                    None,
                    "expected a rule, token or literal reference",
                ))
            }
        }
    }

    fn rewrite_elements(
        &mut self,
        ctrl: &mut Controller<'_>,
        elements: impl Iterator<Item = RewriteElement>,
    ) -> WalkResult<Vec<SrcOp>> {
        let mut ops = Vec::new();
        for element in elements {
            ops.extend(self.rewrite_element(ctrl, &element, false)?);
        }
        Ok(ops)
    }

    fn rewrite_element(
        &mut self,
        ctrl: &mut Controller<'_>,
        element: &RewriteElement,
        is_root: bool,
    ) -> WalkResult<Vec<SrcOp>> {
        match element {
            RewriteElement::TokenRef(t) => {
                ctrl.rewrite_token_ref(t.as_cst(), is_root, t.arg().as_deref())
            }
            RewriteElement::RuleRef(r) => ctrl.rewrite_rule_ref(r, is_root),
            RewriteElement::StringLiteral(s) => ctrl.rewrite_string_ref(s, is_root),
            RewriteElement::Tree(tree) => {
                ctrl.enter_tree();
                let built = self.rewrite_tree(ctrl, tree);
                ctrl.exit_tree();
                Ok(vec![built?.into_op()])
            }
            RewriteElement::Optional(optional) => {
                let body = self.nested_rewrite(ctrl, optional.elements())?;
                let built =
                    ctrl.rewrite(RewriteShape::Optional, optional.as_cst(), body, Vec::new())?;
                Ok(vec![built.into_op()])
            }
            RewriteElement::Closure(closure) => {
                let body = self.nested_rewrite(ctrl, closure.elements())?;
                let built =
                    ctrl.rewrite(RewriteShape::Closure, closure.as_cst(), body, Vec::new())?;
                Ok(vec![built.into_op()])
            }
        }
    }

    /// First element is the root, the rest are children.
    fn rewrite_tree(
        &mut self,
        ctrl: &mut Controller<'_>,
        tree: &ast::RewriteTree,
    ) -> WalkResult<carve_model::RewriteTree> {
        let mut elements = tree.elements();
        let first = elements.next().ok_or_else(|| {
            RuleError::malformed(
                tree.as_cst(),
                Some(ConstructionPoint::RewriteTree),
                "rewrite tree has no root",
            )
        })?;
        let root = self.rewrite_element(ctrl, &first, true)?;
        let children = self.rewrite_elements(ctrl, elements)?;
        ctrl.rewrite(RewriteShape::Structure, tree.as_cst(), root, children)
    }

    /// Body of an optional or closure, one code block deeper.
    fn nested_rewrite(
        &mut self,
        ctrl: &mut Controller<'_>,
        elements: impl Iterator<Item = RewriteElement>,
    ) -> WalkResult<Vec<SrcOp>> {
        ctrl.push_block(None);
        let body = self.rewrite_elements(ctrl, elements);
        ctrl.pop_block();
        body
    }
}

impl SyntaxWalker for SourceGenWalker {
    fn walk_rule(
        &mut self,
        ctrl: &mut Controller<'_>,
        rule: &ast::Rule,
    ) -> WalkResult<Vec<SrcOp>> {
        let block = rule
            .block()
            .ok_or_else(|| RuleError::malformed(rule.as_cst(), None, "rule has no block"))?;
        self.block(ctrl, &block)
    }
}

/// Peel a label off an element. Unlabeled elements come back unchanged.
fn split_label(element: &Element) -> (Element, Option<Label>) {
    let (label, inner) = match element {
        Element::Assign(a) => (Label::Assign(a.clone()), a.element()),
        Element::PlusAssign(a) => (Label::PlusAssign(a.clone()), a.element()),
        _ => return (element.clone(), None),
    };
    // A label without an operand is reported against the label itself.
    match inner {
        Some(inner) => (inner, Some(label)),
        None => (element.clone(), Some(label)),
    }
}
