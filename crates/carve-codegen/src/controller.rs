//! Job orchestration and the construction entry points.
//!
//! The controller owns one job: it asks the factory for each node, folds the
//! node through the extension chain, and records per-rule failures. Every
//! construction point is a method here; walkers call these, never the factory.
//!
//! For references, the order is fixed: builder, implicit labeling, primary
//! hook across the whole chain, then the leaf hook across the whole chain
//! when the reference is not marked as a tree root or excluded from the tree.

use std::sync::Arc;

use carve_grammar::ast::{self, GrammarRoot, Label};
use carve_grammar::cst::{SyntaxKind, SyntaxNode};
use carve_grammar::{Grammar, LookaheadSet, Target};
use carve_model::{
    Choice, ChoiceKind, CodeBlockForAlt, Lexer, NodeRole, OpKind, Parser, Recognizer,
    RecognizerFile, RecognizerKind, RewriteShape, RewriteTree, RewriteTreeClosure,
    RewriteTreeOptional, RewriteTreeStructure, RuleFunction, SrcOp, TreeRewrite,
};
use rowan::TextRange;

use crate::config::Config;
use crate::context::{Alternative, CodeBlockRef, RootInfo, TraversalContext};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticKind, DiagnosticMessage, Diagnostics};
use crate::extension::{Extension, ExtensionChain};
use crate::factory::{ChoiceSite, CoreFactory, ModelFactory};
use crate::point::ConstructionPoint;
use crate::route::{choice_route, rewrite_route};
use crate::tree_building::TreeBuildingExtension;
use crate::walker::SyntaxWalker;
use crate::{Error, Result, RuleError, describe_kind};

/// Result of a parser job: the file plus what happened to each rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserModel {
    pub file: RecognizerFile,
    pub diagnostics: Diagnostics,
    /// One entry per rule, in declared order.
    pub outcomes: Vec<RuleOutcome>,
}

impl ParserModel {
    pub fn parser(&self) -> Option<&Parser> {
        self.file.parser()
    }

    pub fn failed_rules(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_built())
            .map(RuleOutcome::rule)
            .collect()
    }

    /// Every rule built and no errors reported. Warnings are allowed.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(RuleOutcome::is_built) && !self.diagnostics.has_errors()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Built {
        rule: String,
    },
    /// The rule kept an empty body.
    Failed {
        rule: String,
        diagnostic: DiagnosticMessage,
    },
}

impl RuleOutcome {
    pub fn rule(&self) -> &str {
        match self {
            Self::Built { rule } | Self::Failed { rule, .. } => rule,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built { .. })
    }
}

pub struct Controller<'g> {
    grammar: &'g Grammar,
    target: Arc<dyn Target>,
    factory: Box<dyn ModelFactory + 'g>,
    extensions: ExtensionChain,
    diagnostics: Diagnostics,
}

impl<'g> Controller<'g> {
    /// Controller backed by [`CoreFactory`].
    pub fn new(grammar: &'g Grammar, config: Config) -> Result<Self> {
        let target = config.target.clone().ok_or(Error::MissingTarget)?;
        let factory = Box::new(CoreFactory::new(grammar, Arc::clone(&target)));
        Ok(Self::assemble(grammar, target, factory, &config))
    }

    /// Controller backed by a custom factory.
    pub fn with_factory(
        grammar: &'g Grammar,
        config: Config,
        factory: Box<dyn ModelFactory + 'g>,
    ) -> Result<Self> {
        let target = config.target.clone().ok_or(Error::MissingTarget)?;
        Ok(Self::assemble(grammar, target, factory, &config))
    }

    fn assemble(
        grammar: &'g Grammar,
        target: Arc<dyn Target>,
        factory: Box<dyn ModelFactory + 'g>,
        config: &Config,
    ) -> Self {
        let mut extensions = ExtensionChain::new().with_validation(config.validate_extensions);
        if config.tree_building {
            extensions.push(Box::new(TreeBuildingExtension));
        }
        Self {
            grammar,
            target,
            factory,
            extensions,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Register an extension after those already present.
    pub fn add_extension(&mut self, extension: impl Extension + 'static) {
        self.extensions.push(Box::new(extension));
    }

    pub fn extensions(&self) -> &ExtensionChain {
        &self.extensions
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn target(&self) -> &dyn Target {
        self.target.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Report a non-fatal diagnostic against the grammar source.
    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        self.diagnostics.report(kind, range)
    }

    pub fn build_parser_model(&mut self, walker: &mut dyn SyntaxWalker) -> Result<ParserModel> {
        let root = self.grammar.syntax();
        let rules = self.check_job(&root, RecognizerKind::Parser)?;
        tracing::debug!(
            grammar = self.grammar.name(),
            rules = rules.len(),
            extensions = self.extensions.len(),
            "building parser model"
        );

        let file_name = self.file_name(RecognizerKind::Parser);
        let mut file = self.parser_file(&file_name)?;
        self.set_root(&file);
        let mut parser = self.parser(&file)?;

        let mut outcomes = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            let (function, outcome) = self.build_rule(walker, rule, index)?;
            parser.funcs.push(function);
            outcomes.push(outcome);
        }
        file.recognizer = Recognizer::Parser(parser);

        Ok(ParserModel {
            file,
            diagnostics: std::mem::take(&mut self.diagnostics),
            outcomes,
        })
    }

    pub fn build_lexer_model(&mut self) -> Result<RecognizerFile> {
        let root = self.grammar.syntax();
        let rules = self.check_job(&root, RecognizerKind::Lexer)?;
        tracing::debug!(
            grammar = self.grammar.name(),
            rules = rules.len(),
            extensions = self.extensions.len(),
            "building lexer model"
        );

        let file_name = self.file_name(RecognizerKind::Lexer);
        let mut file = self.lexer_file(&file_name)?;
        self.set_root(&file);
        let lexer = self.lexer(&file)?;
        file.recognizer = Recognizer::Lexer(lexer);
        Ok(file)
    }

    /// Job-level checks. Runs before any node is built.
    fn check_job(&self, root: &GrammarRoot, kind: RecognizerKind) -> Result<Vec<ast::Rule>> {
        let grammar = self.grammar;
        if !grammar.kind().supports(kind) {
            return Err(Error::UnsupportedRecognizer {
                grammar: grammar.name().to_string(),
                kind: grammar.kind(),
                requested: kind,
            });
        }
        let rules = grammar.rules_for(root, kind);
        // A combined grammar may get its whole lexer from implicit literal tokens.
        let empty = match kind {
            RecognizerKind::Parser => rules.is_empty(),
            RecognizerKind::Lexer => root.rules().next().is_none(),
        };
        if empty {
            return Err(Error::EmptyGrammar {
                grammar: grammar.name().to_string(),
                kind,
            });
        }
        Ok(rules)
    }

    fn file_name(&self, kind: RecognizerKind) -> String {
        self.target
            .recognizer_file_name(&self.grammar.recognizer_name(kind))
    }

    fn build_rule(
        &mut self,
        walker: &mut dyn SyntaxWalker,
        rule: &ast::Rule,
        index: usize,
    ) -> Result<(RuleFunction, RuleOutcome)> {
        let name = rule
            .name()
            .map(|t| t.text().to_string())
            .unwrap_or_default();
        tracing::debug!(rule = %name, index, "building rule");

        let function = self.rule(rule, &name, index)?;
        self.push_current_rule(function);

        let outcome = match walker.walk_rule(self, rule) {
            Ok(code) => {
                self.current_rule_mut()?.code = code;
                RuleOutcome::Built { rule: name.clone() }
            }
            Err(RuleError::Fatal(err)) => return Err(err),
            Err(RuleError::Malformed {
                kind,
                point,
                range,
                detail,
            }) => RuleOutcome::Failed {
                rule: name.clone(),
                diagnostic: self.rule_failure(&name, kind, point, range, &detail),
            },
        };
        self.factory.context_mut().reset_rule_state();

        let ctx_type = self.target.rule_context_struct_name(&name);
        let postamble = self.rule_postamble(rule)?;
        let mut function = self.pop_current_rule()?;
        if let Some(ctx) = &mut function.rule_ctx {
            ctx.name = ctx_type.clone();
        }
        function.ctx_type = ctx_type;
        function.postamble = postamble;
        function.drop_empty_context();
        Ok((function, outcome))
    }

    fn rule_failure(
        &mut self,
        rule: &str,
        kind: SyntaxKind,
        point: Option<ConstructionPoint>,
        range: TextRange,
        detail: &str,
    ) -> DiagnosticMessage {
        let construct = describe_kind(kind);
        tracing::warn!(
            rule,
            %construct,
            point = point.map(ConstructionPoint::name),
            detail,
            "rule left empty"
        );
        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::MalformedConstruct, range)
            .message(format!("{construct} in rule `{rule}`: {detail}"))
            .rule(rule)
            .point(point);
        if let Some(point) = point {
            builder = builder.hint(format!("raised while building `{point}`"));
        }
        builder.emit_cloned()
    }

    // --- files and rules ---

    pub fn parser_file(&mut self, file_name: &str) -> Result<RecognizerFile> {
        let file = self.factory.parser_file(file_name);
        self.extensions
            .fold(ConstructionPoint::ParserFile, file, |ext, f| ext.parser_file(f))
    }

    pub fn parser(&mut self, file: &RecognizerFile) -> Result<Parser> {
        let parser = self.factory.parser(file);
        self.extensions
            .fold(ConstructionPoint::Parser, parser, |ext, p| ext.parser(p))
    }

    pub fn lexer_file(&mut self, file_name: &str) -> Result<RecognizerFile> {
        let file = self.factory.lexer_file(file_name);
        self.extensions
            .fold(ConstructionPoint::LexerFile, file, |ext, f| ext.lexer_file(f))
    }

    pub fn lexer(&mut self, file: &RecognizerFile) -> Result<Lexer> {
        let lexer = self.factory.lexer(file);
        self.extensions
            .fold(ConstructionPoint::Lexer, lexer, |ext, l| ext.lexer(l))
    }

    pub fn rule(&mut self, rule: &ast::Rule, name: &str, index: usize) -> Result<RuleFunction> {
        let function = self.factory.rule(rule, name, index);
        self.extensions
            .fold(ConstructionPoint::Rule, function, |ext, f| ext.rule(f))
    }

    pub fn rule_postamble(&mut self, rule: &ast::Rule) -> Result<Vec<SrcOp>> {
        let ops = self.factory.rule_postamble(rule);
        self.extensions
            .fold_ops(ConstructionPoint::RulePostamble, ops, None, |ext, ops| {
                ext.rule_postamble(ops)
            })
    }

    // --- alternatives ---

    pub fn alternative(&mut self, alt: &ast::Alt, alt_num: usize) -> Result<CodeBlockForAlt> {
        let blk = self.factory.alternative(alt, alt_num);
        self.extensions
            .fold(ConstructionPoint::Alternative, blk, |ext, b| ext.alternative(b))
    }

    pub fn finish_alternative(
        &mut self,
        blk: CodeBlockForAlt,
        ops: Vec<SrcOp>,
    ) -> Result<CodeBlockForAlt> {
        let blk = self.factory.finish_alternative(blk, ops);
        self.extensions
            .fold(ConstructionPoint::FinishAlternative, blk, |ext, b| {
                ext.finish_alternative(b)
            })
    }

    pub fn epsilon(&mut self, alt: &ast::Alt, alt_num: usize) -> Result<CodeBlockForAlt> {
        let blk = self.factory.epsilon(alt, alt_num);
        self.extensions
            .fold(ConstructionPoint::Epsilon, blk, |ext, b| ext.epsilon(b))
    }

    // --- elements ---

    pub fn rule_ref(
        &mut self,
        id: &ast::RuleRef,
        label: Option<&Label>,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let mut ops = self.factory.rule_ref(id, label)?;
        self.label_if_needed(id.as_cst(), &mut ops)?;
        let anchor = Some(OpKind::InvokeRule);
        let ops = self
            .extensions
            .fold_ops(ConstructionPoint::RuleRef, ops, anchor, |ext, ops| {
                ext.rule_ref(ops)
            })?;
        if is_tree_marked(id.as_cst()) {
            return Ok(ops);
        }
        Ok(self
            .extensions
            .fold_ops(ConstructionPoint::LeafRule, ops, anchor, |ext, ops| {
                ext.leaf_rule(ops)
            })?)
    }

    pub fn token_ref(
        &mut self,
        id: &ast::TokenRef,
        label: Option<&Label>,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let mut ops = self.factory.token_ref(id, label)?;
        self.label_if_needed(id.as_cst(), &mut ops)?;
        let anchor = Some(OpKind::MatchToken);
        let ops = self
            .extensions
            .fold_ops(ConstructionPoint::TokenRef, ops, anchor, |ext, ops| {
                ext.token_ref(ops)
            })?;
        if is_tree_marked(id.as_cst()) {
            return Ok(ops);
        }
        Ok(self
            .extensions
            .fold_ops(ConstructionPoint::LeafToken, ops, anchor, |ext, ops| {
                ext.leaf_token(ops)
            })?)
    }

    pub fn string_ref(
        &mut self,
        id: &ast::StringLiteral,
        label: Option<&Label>,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let mut ops = self.factory.string_ref(id, label)?;
        self.label_if_needed(id.as_cst(), &mut ops)?;
        Ok(self.extensions.fold_ops(
            ConstructionPoint::StringRef,
            ops,
            Some(OpKind::MatchLiteral),
            |ext, ops| ext.string_ref(ops),
        )?)
    }

    pub fn action(&mut self, action: &ast::Action) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let ops = self.factory.action(action)?;
        Ok(self
            .extensions
            .fold_ops(ConstructionPoint::Action, ops, None, |ext, ops| ext.action(ops))?)
    }

    pub fn forced_action(
        &mut self,
        action: &ast::ForcedAction,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let ops = self.factory.forced_action(action)?;
        Ok(self
            .extensions
            .fold_ops(ConstructionPoint::ForcedAction, ops, None, |ext, ops| {
                ext.forced_action(ops)
            })?)
    }

    pub fn sempred(&mut self, pred: &ast::Sempred) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let ops = self.factory.sempred(pred)?;
        Ok(self
            .extensions
            .fold_ops(ConstructionPoint::Sempred, ops, None, |ext, ops| ext.sempred(ops))?)
    }

    /// Token reference marked as the root of the tree under construction.
    pub fn root_token(&mut self, ops: Vec<SrcOp>) -> Result<Vec<SrcOp>> {
        let ops = self.factory.root_token(ops);
        self.extensions
            .fold_ops(ConstructionPoint::RootToken, ops, None, |ext, ops| {
                ext.root_token(ops)
            })
    }

    /// Rule reference marked as the root of the tree under construction.
    pub fn root_rule(&mut self, ops: Vec<SrcOp>) -> Result<Vec<SrcOp>> {
        let ops = self.factory.root_rule(ops);
        self.extensions
            .fold_ops(ConstructionPoint::RootRule, ops, None, |ext, ops| {
                ext.root_rule(ops)
            })
    }

    // --- implicit labels ---

    /// OR of the builder's answer and every extension's answer.
    pub fn needs_implicit_label(&self, id: &SyntaxNode, op: &SrcOp) -> bool {
        let core = self.factory.needs_implicit_label(id, op);
        let requested = self
            .extensions
            .any(|ext| ext.needs_implicit_label(id, op));
        core | requested
    }

    pub fn define_implicit_label(
        &mut self,
        op: &mut SrcOp,
    ) -> std::result::Result<(), RuleError> {
        self.factory.define_implicit_label(op)
    }

    /// Label every still-unlabeled reference op that needs one.
    fn label_if_needed(
        &mut self,
        id: &SyntaxNode,
        ops: &mut [SrcOp],
    ) -> std::result::Result<(), RuleError> {
        for op in ops.iter_mut() {
            let unlabeled = op.labels().is_some_and(<[String]>::is_empty);
            if unlabeled && self.needs_implicit_label(id, op) {
                self.define_implicit_label(op)?;
            }
        }
        Ok(())
    }

    // --- choices ---

    pub fn choice_block(
        &mut self,
        blk: &ast::Block,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::Generic, &ChoiceSite::Block(blk.clone()), alts)
    }

    pub fn ebnf_block(
        &mut self,
        ebnf: &ast::Ebnf,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::Ebnf, &ChoiceSite::Ebnf(ebnf.clone()), alts)
    }

    pub fn ll1_choice_block(
        &mut self,
        blk: &ast::Block,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::Ll1, &ChoiceSite::Block(blk.clone()), alts)
    }

    pub fn ll_star_choice_block(
        &mut self,
        blk: &ast::Block,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::LlStar, &ChoiceSite::Block(blk.clone()), alts)
    }

    pub fn ll1_ebnf_block(
        &mut self,
        ebnf: &ast::Ebnf,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::EbnfLl1, &ChoiceSite::Ebnf(ebnf.clone()), alts)
    }

    pub fn ll_star_ebnf_block(
        &mut self,
        ebnf: &ast::Ebnf,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        self.choice(ChoiceKind::EbnfLlStar, &ChoiceSite::Ebnf(ebnf.clone()), alts)
    }

    /// Build a choice of the given kind. The kind is taken as given; analysis
    /// already decided it.
    pub fn choice(
        &mut self,
        kind: ChoiceKind,
        site: &ChoiceSite,
        alts: Vec<CodeBlockForAlt>,
    ) -> std::result::Result<Choice, RuleError> {
        let route = choice_route(kind);
        if kind.is_ebnf() != site.is_ebnf() {
            let expected = if kind.is_ebnf() {
                "an EBNF block"
            } else {
                "a plain block"
            };
            return Err(RuleError::malformed(
                site.syntax(),
                Some(route.point),
                format!("{} needs {expected}", NodeRole::Choice(kind)),
            ));
        }
        let tests = if kind.is_ll1() {
            self.ll1_tests(site, alts.len(), route.point)?
        } else {
            Vec::new()
        };
        tracing::trace!(%kind, decision = site.decision(), alts = alts.len(), "building choice");
        let choice = (route.build)(self.factory.as_mut(), site, alts, tests);
        Ok(self.extensions.fold(route.point, choice, route.hook)?)
    }

    /// One lookahead test per alternative, from the decision's supplied sets.
    fn ll1_tests(
        &mut self,
        site: &ChoiceSite,
        alt_count: usize,
        point: ConstructionPoint,
    ) -> std::result::Result<Vec<Vec<SrcOp>>, RuleError> {
        let grammar = self.grammar;
        let malformed = |detail: String| RuleError::malformed(site.syntax(), Some(point), detail);

        let decision = site
            .decision()
            .ok_or_else(|| malformed("LL(1) block has no decision number".to_string()))?;
        let info = grammar
            .classify(decision)
            .ok_or_else(|| malformed(format!("decision {decision} has no classification")))?;
        if info.lookahead.len() != alt_count {
            return Err(malformed(format!(
                "decision {decision} has {} lookahead sets for {alt_count} alternatives",
                info.lookahead.len()
            )));
        }

        let mut tests = Vec::with_capacity(alt_count);
        for look in &info.lookahead {
            tests.push(self.ll1_test(look, site.syntax())?);
        }
        Ok(tests)
    }

    pub fn ll1_test(&mut self, look: &LookaheadSet, blk: &SyntaxNode) -> Result<Vec<SrcOp>> {
        let ops = self.factory.ll1_test(look, blk);
        self.extensions.fold_ops(
            ConstructionPoint::Ll1Test,
            ops,
            Some(OpKind::TestSetInline),
            |ext, ops| ext.ll1_test(ops),
        )
    }

    // --- rewrites ---

    pub fn tree_rewrite(&mut self, rewrite: &ast::Rewrite, ops: Vec<SrcOp>) -> Result<TreeRewrite> {
        let rewrite = self.factory.tree_rewrite(rewrite, ops);
        self.extensions
            .fold(ConstructionPoint::TreeRewrite, rewrite, |ext, r| {
                ext.tree_rewrite(r)
            })
    }

    /// Build any rewrite construct. `ops` is the body, or the root for trees;
    /// `children` is only read for trees.
    pub fn rewrite(
        &mut self,
        shape: RewriteShape,
        node: &SyntaxNode,
        ops: Vec<SrcOp>,
        children: Vec<SrcOp>,
    ) -> std::result::Result<RewriteTree, RuleError> {
        let route = rewrite_route(shape);
        tracing::trace!(point = %route.point, "building rewrite");
        (route.build)(self, node, ops, children)
    }

    pub fn rewrite_optional(
        &mut self,
        optional: &ast::RewriteOptional,
        ops: Vec<SrcOp>,
    ) -> Result<RewriteTreeOptional> {
        let optional = self.factory.rewrite_optional(optional, ops);
        self.extensions
            .fold(ConstructionPoint::RewriteOptional, optional, |ext, o| {
                ext.rewrite_optional(o)
            })
    }

    pub fn rewrite_closure(
        &mut self,
        closure: &ast::RewriteClosure,
        ops: Vec<SrcOp>,
    ) -> Result<RewriteTreeClosure> {
        let closure = self.factory.rewrite_closure(closure, ops);
        self.extensions
            .fold(ConstructionPoint::RewriteClosure, closure, |ext, c| {
                ext.rewrite_closure(c)
            })
    }

    pub fn rewrite_tree(
        &mut self,
        tree: &ast::RewriteTree,
        root: Vec<SrcOp>,
        children: Vec<SrcOp>,
    ) -> Result<RewriteTreeStructure> {
        let tree = self.factory.rewrite_tree(tree, root, children);
        self.extensions
            .fold(ConstructionPoint::RewriteTree, tree, |ext, t| ext.rewrite_tree(t))
    }

    pub fn rewrite_rule_ref(
        &mut self,
        id: &ast::RuleRef,
        is_root: bool,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let ops = self.factory.rewrite_rule_ref(id, is_root)?;
        Ok(self.extensions.fold_ops(
            ConstructionPoint::RewriteRuleRef,
            ops,
            Some(OpKind::RewriteRuleRef),
            |ext, ops| ext.rewrite_rule_ref(ops),
        )?)
    }

    pub fn rewrite_token_ref(
        &mut self,
        id: &SyntaxNode,
        is_root: bool,
        arg: Option<&str>,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        let ops = self.factory.rewrite_token_ref(id, is_root, arg)?;
        Ok(self.extensions.fold_ops(
            ConstructionPoint::RewriteTokenRef,
            ops,
            Some(OpKind::RewriteTokenRef),
            |ext, ops| ext.rewrite_token_ref(ops),
        )?)
    }

    /// String literals in rewrites take the token path, without an argument.
    pub fn rewrite_string_ref(
        &mut self,
        id: &ast::StringLiteral,
        is_root: bool,
    ) -> std::result::Result<Vec<SrcOp>, RuleError> {
        self.rewrite_token_ref(id.as_cst(), is_root, None)
    }

    // --- traversal context ---

    pub fn context(&self) -> &TraversalContext {
        self.factory.context()
    }

    pub fn set_root(&mut self, file: &RecognizerFile) {
        self.factory.context_mut().set_root(file);
    }

    pub fn root(&self) -> Option<&RootInfo> {
        self.context().root()
    }

    pub fn push_current_rule(&mut self, function: RuleFunction) {
        self.factory.context_mut().push_rule(function);
    }

    pub fn pop_current_rule(&mut self) -> Result<RuleFunction> {
        self.factory.context_mut().pop_rule()
    }

    pub fn current_rule(&self) -> Option<&RuleFunction> {
        self.context().current_rule()
    }

    pub fn current_rule_mut(&mut self) -> Result<&mut RuleFunction> {
        self.factory.context_mut().current_rule_mut()
    }

    pub fn current_alt(&self) -> Option<&Alternative> {
        self.context().current_alt()
    }

    pub fn set_current_alt(&mut self, alt: Option<Alternative>) {
        self.factory.context_mut().set_current_alt(alt);
    }

    pub fn current_block(&self) -> Option<&CodeBlockRef> {
        self.context().current_block()
    }

    pub fn set_current_block(&mut self, block: CodeBlockRef) {
        self.factory.context_mut().set_current_block(block);
    }

    pub fn push_block(&mut self, decision: Option<usize>) -> CodeBlockRef {
        self.factory.context_mut().push_block(decision)
    }

    pub fn pop_block(&mut self) -> Option<CodeBlockRef> {
        self.factory.context_mut().pop_block()
    }

    pub fn code_block_level(&self) -> usize {
        self.context().code_block_level()
    }

    pub fn tree_level(&self) -> usize {
        self.context().tree_level()
    }

    pub fn enter_tree(&mut self) -> usize {
        self.factory.context_mut().enter_tree()
    }

    pub fn exit_tree(&mut self) -> usize {
        self.factory.context_mut().exit_tree()
    }
}

/// A reference under `ROOT` or `BANG`, looking through labels.
fn is_tree_marked(node: &SyntaxNode) -> bool {
    node.ancestors()
        .skip(1)
        .find(|n| !matches!(n.kind(), SyntaxKind::Assign | SyntaxKind::PlusAssign))
        .is_some_and(|n| matches!(n.kind(), SyntaxKind::Root | SyntaxKind::Bang))
}
