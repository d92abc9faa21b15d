//! Extension hooks and the ordered extension chain.
//!
//! An extension sees each node right after the core builder produced it and
//! returns the node to keep. It may decorate, wrap, or replace the node, as
//! long as the result plays the same role. Extensions run in registration
//! order; each one receives the previous one's output and none of them sees
//! the others directly.

use carve_grammar::cst::SyntaxNode;
use carve_model::{
    Choice, CodeBlockForAlt, Lexer, ModelNode, OpKind, Parser, RecognizerFile,
    RewriteTreeClosure, RewriteTreeOptional, RewriteTreeStructure, RuleFunction, SrcOp,
    TreeRewrite,
};

use crate::Error;
use crate::point::ConstructionPoint;

/// Hooks for every construction point. Every default returns its input.
///
/// Hooks take `&self`: an extension carries configuration, not per-job state.
pub trait Extension {
    /// Name used in logs and contract violations.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn parser_file(&self, file: RecognizerFile) -> RecognizerFile {
        file
    }

    fn parser(&self, parser: Parser) -> Parser {
        parser
    }

    fn lexer_file(&self, file: RecognizerFile) -> RecognizerFile {
        file
    }

    fn lexer(&self, lexer: Lexer) -> Lexer {
        lexer
    }

    fn rule(&self, function: RuleFunction) -> RuleFunction {
        function
    }

    fn rule_postamble(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn alternative(&self, blk: CodeBlockForAlt) -> CodeBlockForAlt {
        blk
    }

    fn finish_alternative(&self, blk: CodeBlockForAlt) -> CodeBlockForAlt {
        blk
    }

    fn epsilon(&self, blk: CodeBlockForAlt) -> CodeBlockForAlt {
        blk
    }

    fn rule_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    /// Rule reference that becomes a child of the tree under construction.
    fn leaf_rule(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn token_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    /// Token reference that becomes a child of the tree under construction.
    fn leaf_token(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn string_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn action(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn forced_action(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn sempred(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn root_token(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn root_rule(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn choice_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ebnf_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ll1_choice_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ll_star_choice_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ll1_ebnf_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ll_star_ebnf_block(&self, choice: Choice) -> Choice {
        choice
    }

    fn ll1_test(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    /// Ask for an implicit label on an unlabeled reference. Answers are OR-ed
    /// with the core builder's answer.
    fn needs_implicit_label(&self, _id: &SyntaxNode, _op: &SrcOp) -> bool {
        false
    }

    fn tree_rewrite(&self, rewrite: TreeRewrite) -> TreeRewrite {
        rewrite
    }

    fn rewrite_optional(&self, optional: RewriteTreeOptional) -> RewriteTreeOptional {
        optional
    }

    fn rewrite_closure(&self, closure: RewriteTreeClosure) -> RewriteTreeClosure {
        closure
    }

    fn rewrite_tree(&self, tree: RewriteTreeStructure) -> RewriteTreeStructure {
        tree
    }

    fn rewrite_rule_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn rewrite_token_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }
}

/// Extensions in registration order.
pub struct ExtensionChain {
    extensions: Vec<Box<dyn Extension>>,
    validate: bool,
}

impl Default for ExtensionChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtensionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionChain")
            .field("extensions", &self.names())
            .field("validate", &self.validate)
            .finish()
    }
}

impl ExtensionChain {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
            validate: true,
        }
    }

    /// Check every stage's output role against its input role.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn push(&mut self, extension: Box<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }

    /// Pass `node` through every extension, first registered first.
    pub fn fold<N: ModelNode>(
        &self,
        point: ConstructionPoint,
        mut node: N,
        hook: impl Fn(&dyn Extension, N) -> N,
    ) -> Result<N, Error> {
        for ext in &self.extensions {
            let expected = self.validate.then(|| node.role());
            node = hook(ext.as_ref(), node);
            tracing::trace!(extension = ext.name(), %point, "fold stage");
            if let Some(expected) = expected {
                let found = node.role();
                if found != expected {
                    return Err(Error::ContractViolation {
                        extension: ext.name().to_string(),
                        point,
                        expected: expected.to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }
        Ok(node)
    }

    /// Fold an operation list. When `anchor` is given, every stage must leave
    /// an op of that kind in the list.
    pub fn fold_ops(
        &self,
        point: ConstructionPoint,
        mut ops: Vec<SrcOp>,
        anchor: Option<OpKind>,
        hook: impl Fn(&dyn Extension, Vec<SrcOp>) -> Vec<SrcOp>,
    ) -> Result<Vec<SrcOp>, Error> {
        for ext in &self.extensions {
            ops = hook(ext.as_ref(), ops);
            tracing::trace!(extension = ext.name(), %point, ops = ops.len(), "fold stage");
            let Some(kind) = anchor.filter(|_| self.validate) else {
                continue;
            };
            if !ops.iter().any(|op| op.kind() == kind) {
                return Err(Error::ContractViolation {
                    extension: ext.name().to_string(),
                    point,
                    expected: format!("operation list containing {kind}"),
                    found: describe_ops(&ops),
                });
            }
        }
        Ok(ops)
    }

    /// OR of every extension's answer. All extensions are asked.
    pub fn any(&self, ask: impl Fn(&dyn Extension) -> bool) -> bool {
        self.extensions
            .iter()
            .fold(false, |acc, ext| ask(ext.as_ref()) | acc)
    }
}

fn describe_ops(ops: &[SrcOp]) -> String {
    if ops.is_empty() {
        return "empty operation list".to_string();
    }
    let kinds: Vec<String> = ops.iter().map(|op| op.kind().to_string()).collect();
    format!("operation list [{}]", kinds.join(", "))
}
