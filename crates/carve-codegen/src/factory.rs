//! The core model builder.
//!
//! One method per construction point. Every method returns a freshly built
//! node; extensions are applied afterwards by the controller. The factory also
//! owns the job's traversal context, because building a node often needs to
//! know which rule and alternative it belongs to.

use std::sync::Arc;

use carve_grammar::ast::{self, Label};
use carve_grammar::cst::{SyntaxKind, SyntaxNode};
use carve_grammar::{Grammar, LookaheadSet, Target};
use carve_model::{
    AttributeDecl, Choice, ChoiceKind, CodeBlockForAlt, Decl, EbnfKind, Lexer, Parser, Recognizer,
    RecognizerFile, RecognizerKind, RewriteTreeClosure, RewriteTreeOptional, RewriteTreeStructure,
    RuleFunction, SrcOp, TreeRewrite,
};

use crate::RuleError;
use crate::context::{Alternative, TraversalContext};
use crate::point::ConstructionPoint;

/// Mode name every lexer starts in.
pub const DEFAULT_MODE: &str = "DEFAULT_MODE";

/// Syntax a choice is built from: a plain block or an EBNF-wrapped block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceSite {
    Block(ast::Block),
    Ebnf(ast::Ebnf),
}

impl ChoiceSite {
    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Block(b) => b.as_cst(),
            Self::Ebnf(e) => e.as_cst(),
        }
    }

    /// Decision number, taken from the EBNF node first and then its block.
    pub fn decision(&self) -> Option<usize> {
        match self {
            Self::Block(b) => b.decision(),
            Self::Ebnf(e) => e
                .decision()
                .or_else(|| e.block().and_then(|b| b.decision())),
        }
    }

    pub fn ebnf(&self) -> Option<EbnfKind> {
        match self {
            Self::Block(_) => None,
            Self::Ebnf(e) => Some(e.op()),
        }
    }

    pub fn is_ebnf(&self) -> bool {
        matches!(self, Self::Ebnf(_))
    }
}

/// Builds model nodes. [`CoreFactory`] is the stock implementation; a custom
/// factory can replace it wholesale.
pub trait ModelFactory {
    fn grammar(&self) -> &Grammar;
    fn target(&self) -> &dyn Target;
    fn context(&self) -> &TraversalContext;
    fn context_mut(&mut self) -> &mut TraversalContext;

    fn parser_file(&mut self, file_name: &str) -> RecognizerFile;
    fn parser(&mut self, file: &RecognizerFile) -> Parser;
    fn lexer_file(&mut self, file_name: &str) -> RecognizerFile;
    fn lexer(&mut self, file: &RecognizerFile) -> Lexer;

    fn rule(&mut self, rule: &ast::Rule, name: &str, index: usize) -> RuleFunction;
    fn rule_postamble(&mut self, rule: &ast::Rule) -> Vec<SrcOp>;

    /// Enter an alternative and return its empty code block.
    fn alternative(&mut self, alt: &ast::Alt, alt_num: usize) -> CodeBlockForAlt;
    fn finish_alternative(&mut self, blk: CodeBlockForAlt, ops: Vec<SrcOp>) -> CodeBlockForAlt;
    /// Enter an alternative that matches nothing.
    fn epsilon(&mut self, alt: &ast::Alt, alt_num: usize) -> CodeBlockForAlt;

    fn rule_ref(
        &mut self,
        id: &ast::RuleRef,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError>;
    fn token_ref(
        &mut self,
        id: &ast::TokenRef,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError>;
    fn string_ref(
        &mut self,
        id: &ast::StringLiteral,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError>;
    fn action(&mut self, action: &ast::Action) -> Result<Vec<SrcOp>, RuleError>;
    fn forced_action(&mut self, action: &ast::ForcedAction) -> Result<Vec<SrcOp>, RuleError>;
    fn sempred(&mut self, pred: &ast::Sempred) -> Result<Vec<SrcOp>, RuleError>;
    fn root_token(&mut self, ops: Vec<SrcOp>) -> Vec<SrcOp>;
    fn root_rule(&mut self, ops: Vec<SrcOp>) -> Vec<SrcOp>;

    fn choice_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice;
    fn ebnf_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice;
    fn ll1_choice_block(
        &mut self,
        site: &ChoiceSite,
        alts: Vec<CodeBlockForAlt>,
        tests: Vec<Vec<SrcOp>>,
    ) -> Choice;
    fn ll_star_choice_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice;
    fn ll1_ebnf_block(
        &mut self,
        site: &ChoiceSite,
        alts: Vec<CodeBlockForAlt>,
        tests: Vec<Vec<SrcOp>>,
    ) -> Choice;
    fn ll_star_ebnf_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice;
    fn ll1_test(&mut self, look: &LookaheadSet, blk: &SyntaxNode) -> Vec<SrcOp>;

    fn needs_implicit_label(&self, id: &SyntaxNode, op: &SrcOp) -> bool;
    fn define_implicit_label(&mut self, op: &mut SrcOp) -> Result<(), RuleError>;

    fn tree_rewrite(&mut self, rewrite: &ast::Rewrite, ops: Vec<SrcOp>) -> TreeRewrite;
    fn rewrite_optional(
        &mut self,
        optional: &ast::RewriteOptional,
        ops: Vec<SrcOp>,
    ) -> RewriteTreeOptional;
    fn rewrite_closure(
        &mut self,
        closure: &ast::RewriteClosure,
        ops: Vec<SrcOp>,
    ) -> RewriteTreeClosure;
    fn rewrite_tree(
        &mut self,
        tree: &ast::RewriteTree,
        root: Vec<SrcOp>,
        children: Vec<SrcOp>,
    ) -> RewriteTreeStructure;
    fn rewrite_rule_ref(
        &mut self,
        id: &ast::RuleRef,
        is_root: bool,
    ) -> Result<Vec<SrcOp>, RuleError>;
    fn rewrite_token_ref(
        &mut self,
        id: &SyntaxNode,
        is_root: bool,
        arg: Option<&str>,
    ) -> Result<Vec<SrcOp>, RuleError>;
}

/// Stock builder: reads the grammar, asks the target for every generated name.
#[derive(Debug)]
pub struct CoreFactory<'g> {
    grammar: &'g Grammar,
    target: Arc<dyn Target>,
    context: TraversalContext,
}

impl<'g> CoreFactory<'g> {
    pub fn new(grammar: &'g Grammar, target: Arc<dyn Target>) -> Self {
        Self {
            grammar,
            target,
            context: TraversalContext::new(),
        }
    }

    fn recognizer_file(&self, file_name: &str, kind: RecognizerKind) -> RecognizerFile {
        RecognizerFile {
            file_name: file_name.to_string(),
            grammar_name: self.grammar.name().to_string(),
            header: self.grammar.named_action("header"),
            recognizer: Recognizer::empty(kind, self.grammar.recognizer_name(kind)),
        }
    }

    fn ttype(
        &self,
        name: &str,
        node: &SyntaxNode,
        point: ConstructionPoint,
    ) -> Result<i32, RuleError> {
        self.grammar.vocabulary().ttype(name).ok_or_else(|| {
            RuleError::malformed(
                node,
                Some(point),
                format!("token `{name}` is not in the vocabulary"),
            )
        })
    }

    /// Attach an explicit label to `op` and declare it on the current rule context.
    fn apply_label(&mut self, op: &mut SrcOp, label: Option<&Label>) -> Result<(), RuleError> {
        let Some(label) = label else {
            return Ok(());
        };
        let name = label
            .name()
            .ok_or_else(|| RuleError::malformed(label.as_cst(), None, "label has no name"))?;
        let name = name.text().to_string();
        let decl = match (&*op, label.is_list()) {
            (SrcOp::InvokeRule { ctx_type, .. }, false) => Decl::rule_context(&name, ctx_type),
            (SrcOp::InvokeRule { ctx_type, .. }, true) => Decl::rule_context_list(&name, ctx_type),
            (_, false) => Decl::token(&name),
            (_, true) => Decl::token_list(&name),
        };
        if let Some(labels) = op.labels_mut() {
            labels.push(name);
        }
        self.context.current_rule_mut()?.add_context_decl(decl);
        Ok(())
    }
}

impl ModelFactory for CoreFactory<'_> {
    fn grammar(&self) -> &Grammar {
        self.grammar
    }

    fn target(&self) -> &dyn Target {
        self.target.as_ref()
    }

    fn context(&self) -> &TraversalContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut TraversalContext {
        &mut self.context
    }

    fn parser_file(&mut self, file_name: &str) -> RecognizerFile {
        self.recognizer_file(file_name, RecognizerKind::Parser)
    }

    fn parser(&mut self, file: &RecognizerFile) -> Parser {
        Parser {
            name: file.recognizer.name().to_string(),
            token_names: self.grammar.vocabulary().token_names(),
            rule_names: self.grammar.rule_names(RecognizerKind::Parser),
            members: self.grammar.named_action("members"),
            funcs: Vec::new(),
        }
    }

    fn lexer_file(&mut self, file_name: &str) -> RecognizerFile {
        self.recognizer_file(file_name, RecognizerKind::Lexer)
    }

    fn lexer(&mut self, file: &RecognizerFile) -> Lexer {
        Lexer {
            name: file.recognizer.name().to_string(),
            token_names: self.grammar.vocabulary().token_names(),
            rule_names: self.grammar.rule_names(RecognizerKind::Lexer),
            modes: vec![DEFAULT_MODE.to_string()],
        }
    }

    fn rule(&mut self, rule: &ast::Rule, name: &str, index: usize) -> RuleFunction {
        let mut function = RuleFunction::new(name, index);
        let parse = |text: Option<String>| {
            text.map(|t| AttributeDecl::parse_list(&t))
                .unwrap_or_default()
        };
        function.args = parse(rule.arg_action().and_then(|a| a.text()));
        function.returns = parse(rule.returns().and_then(|r| r.text()));
        function.locals = parse(rule.locals().and_then(|l| l.text()));

        let attrs: Vec<Decl> = function
            .args
            .iter()
            .chain(&function.returns)
            .chain(&function.locals)
            .map(Decl::attribute)
            .collect();
        for decl in attrs {
            function.add_context_decl(decl);
        }
        function
    }

    fn rule_postamble(&mut self, rule: &ast::Rule) -> Vec<SrcOp> {
        rule.named_action("after")
            .and_then(|a| a.code())
            .map(|code| vec![SrcOp::action(code)])
            .unwrap_or_default()
    }

    fn alternative(&mut self, alt: &ast::Alt, alt_num: usize) -> CodeBlockForAlt {
        self.enter_alt(alt, alt_num);
        CodeBlockForAlt::new(alt_num)
    }

    fn finish_alternative(&mut self, mut blk: CodeBlockForAlt, ops: Vec<SrcOp>) -> CodeBlockForAlt {
        blk.ops = ops;
        blk
    }

    fn epsilon(&mut self, alt: &ast::Alt, alt_num: usize) -> CodeBlockForAlt {
        self.enter_alt(alt, alt_num);
        CodeBlockForAlt {
            alt_num,
            ops: vec![SrcOp::Epsilon],
        }
    }

    fn rule_ref(
        &mut self,
        id: &ast::RuleRef,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let name = id.name().ok_or_else(|| {
            RuleError::malformed(
                id.as_cst(),
                Some(ConstructionPoint::RuleRef),
                "rule reference has no name",
            )
        })?;
        let name = name.text().to_string();
        let mut op = SrcOp::InvokeRule {
            ctx_type: self.target.rule_context_struct_name(&name),
            name,
            args: id.args(),
            labels: Vec::new(),
        };
        self.apply_label(&mut op, label)?;
        Ok(vec![op])
    }

    fn token_ref(
        &mut self,
        id: &ast::TokenRef,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let name = id.name().ok_or_else(|| {
            RuleError::malformed(
                id.as_cst(),
                Some(ConstructionPoint::TokenRef),
                "token reference has no name",
            )
        })?;
        let name = name.text().to_string();
        let ttype = self.ttype(&name, id.as_cst(), ConstructionPoint::TokenRef)?;
        let mut op = SrcOp::MatchToken {
            name,
            ttype,
            labels: Vec::new(),
        };
        self.apply_label(&mut op, label)?;
        Ok(vec![op])
    }

    fn string_ref(
        &mut self,
        id: &ast::StringLiteral,
        label: Option<&Label>,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let literal = id.literal().ok_or_else(|| {
            RuleError::malformed(
                id.as_cst(),
                Some(ConstructionPoint::StringRef),
                "string literal has no text",
            )
        })?;
        let literal = literal.text().to_string();
        let ttype = self.ttype(&literal, id.as_cst(), ConstructionPoint::StringRef)?;
        let mut op = SrcOp::MatchLiteral {
            literal,
            ttype,
            labels: Vec::new(),
        };
        self.apply_label(&mut op, label)?;
        Ok(vec![op])
    }

    fn action(&mut self, action: &ast::Action) -> Result<Vec<SrcOp>, RuleError> {
        let code = action.code().ok_or_else(|| {
            RuleError::malformed(
                action.as_cst(),
                Some(ConstructionPoint::Action),
                "action has no code",
            )
        })?;
        Ok(vec![SrcOp::Action { code }])
    }

    fn forced_action(&mut self, action: &ast::ForcedAction) -> Result<Vec<SrcOp>, RuleError> {
        let code = action.code().ok_or_else(|| {
            RuleError::malformed(
                action.as_cst(),
                Some(ConstructionPoint::ForcedAction),
                "action has no code",
            )
        })?;
        Ok(vec![SrcOp::ForcedAction { code }])
    }

    fn sempred(&mut self, pred: &ast::Sempred) -> Result<Vec<SrcOp>, RuleError> {
        let predicate = pred.predicate().ok_or_else(|| {
            RuleError::malformed(
                pred.as_cst(),
                Some(ConstructionPoint::Sempred),
                "predicate has no code",
            )
        })?;
        Ok(vec![SrcOp::SemPred { predicate }])
    }

    fn root_token(&mut self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn root_rule(&mut self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops
    }

    fn choice_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice {
        Choice::new(ChoiceKind::Generic, site.decision(), alts)
    }

    fn ebnf_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice {
        Choice::new(ChoiceKind::Ebnf, site.decision(), alts).with_ebnf(site.ebnf())
    }

    fn ll1_choice_block(
        &mut self,
        site: &ChoiceSite,
        alts: Vec<CodeBlockForAlt>,
        tests: Vec<Vec<SrcOp>>,
    ) -> Choice {
        Choice::new(ChoiceKind::Ll1, site.decision(), alts).with_tests(tests)
    }

    fn ll_star_choice_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice {
        Choice::new(ChoiceKind::LlStar, site.decision(), alts)
    }

    fn ll1_ebnf_block(
        &mut self,
        site: &ChoiceSite,
        alts: Vec<CodeBlockForAlt>,
        tests: Vec<Vec<SrcOp>>,
    ) -> Choice {
        Choice::new(ChoiceKind::EbnfLl1, site.decision(), alts)
            .with_ebnf(site.ebnf())
            .with_tests(tests)
    }

    fn ll_star_ebnf_block(&mut self, site: &ChoiceSite, alts: Vec<CodeBlockForAlt>) -> Choice {
        Choice::new(ChoiceKind::EbnfLlStar, site.decision(), alts).with_ebnf(site.ebnf())
    }

    fn ll1_test(&mut self, look: &LookaheadSet, _blk: &SyntaxNode) -> Vec<SrcOp> {
        vec![SrcOp::TestSetInline {
            ttypes: look.ttypes().to_vec(),
            token_names: look.token_names(self.grammar.vocabulary()),
        }]
    }

    fn needs_implicit_label(&self, _id: &SyntaxNode, op: &SrcOp) -> bool {
        if !op.labels().is_some_and(<[String]>::is_empty) {
            return false;
        }
        let Some(name) = referenced_name(op) else {
            return false;
        };
        self.context
            .current_alt()
            .is_some_and(|alt| alt.refers_to(name))
    }

    fn define_implicit_label(&mut self, op: &mut SrcOp) -> Result<(), RuleError> {
        let (label, decl) = match &*op {
            SrcOp::InvokeRule { name, ctx_type, .. } => {
                let label = self.target.implicit_rule_label(name);
                let decl = Decl::rule_context(&label, ctx_type);
                (label, decl)
            }
            SrcOp::MatchToken { name, .. } => {
                let label = self.target.implicit_token_label(name);
                (label.clone(), Decl::token(label))
            }
            SrcOp::MatchLiteral { ttype, .. } => {
                let label = self.target.implicit_token_label(&format!("T__{ttype}"));
                (label.clone(), Decl::token(label))
            }
            _ => return Ok(()),
        };
        if let Some(labels) = op.labels_mut() {
            labels.push(label);
        }
        self.context.current_rule_mut()?.add_context_decl(decl);
        Ok(())
    }

    fn tree_rewrite(&mut self, _rewrite: &ast::Rewrite, ops: Vec<SrcOp>) -> TreeRewrite {
        TreeRewrite {
            code_block_level: self.context.code_block_level(),
            ops,
        }
    }

    fn rewrite_optional(
        &mut self,
        optional: &ast::RewriteOptional,
        ops: Vec<SrcOp>,
    ) -> RewriteTreeOptional {
        RewriteTreeOptional {
            code_block_level: self.context.code_block_level(),
            referenced: rewrite_refs(optional.as_cst()),
            ops,
        }
    }

    fn rewrite_closure(
        &mut self,
        closure: &ast::RewriteClosure,
        ops: Vec<SrcOp>,
    ) -> RewriteTreeClosure {
        RewriteTreeClosure {
            code_block_level: self.context.code_block_level(),
            referenced: rewrite_refs(closure.as_cst()),
            ops,
        }
    }

    fn rewrite_tree(
        &mut self,
        _tree: &ast::RewriteTree,
        root: Vec<SrcOp>,
        children: Vec<SrcOp>,
    ) -> RewriteTreeStructure {
        RewriteTreeStructure {
            tree_level: self.context.tree_level(),
            code_block_level: self.context.code_block_level(),
            root,
            children,
        }
    }

    fn rewrite_rule_ref(
        &mut self,
        id: &ast::RuleRef,
        is_root: bool,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let rule = id.name().ok_or_else(|| {
            RuleError::malformed(
                id.as_cst(),
                Some(ConstructionPoint::RewriteRuleRef),
                "rule reference has no name",
            )
        })?;
        Ok(vec![SrcOp::RewriteRuleRef {
            rule: rule.text().to_string(),
            is_root,
            tree_level: self.context.tree_level(),
            code_block_level: self.context.code_block_level(),
        }])
    }

    fn rewrite_token_ref(
        &mut self,
        id: &SyntaxNode,
        is_root: bool,
        arg: Option<&str>,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let token = match id.kind() {
            SyntaxKind::TokenRef => ast::TokenRef::cast(id.clone()).and_then(|t| t.name()),
            SyntaxKind::StringLiteral => {
                ast::StringLiteral::cast(id.clone()).and_then(|s| s.literal())
            }
            _ => None,
        };
        let token = token.ok_or_else(|| {
            RuleError::malformed(
                id,
                Some(ConstructionPoint::RewriteTokenRef),
                "expected a named token or literal",
            )
        })?;
        let token = token.text().to_string();
        let ttype = self.ttype(&token, id, ConstructionPoint::RewriteTokenRef)?;
        Ok(vec![SrcOp::RewriteTokenRef {
            token,
            ttype,
            is_root,
            arg: arg.map(str::to_string),
            tree_level: self.context.tree_level(),
            code_block_level: self.context.code_block_level(),
        }])
    }
}

impl CoreFactory<'_> {
    fn enter_alt(&mut self, alt: &ast::Alt, alt_num: usize) {
        let rule = self
            .context
            .current_rule()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        self.context.set_current_alt(Some(Alternative {
            rule,
            alt_num,
            attribute_refs: alt.attribute_refs(),
        }));
    }
}

/// Name an action would use to refer to the element matched by `op`.
fn referenced_name(op: &SrcOp) -> Option<&str> {
    match op {
        SrcOp::MatchToken { name, .. } | SrcOp::InvokeRule { name, .. } => Some(name),
        _ => None,
    }
}

/// Token and rule names mentioned inside a rewrite block, first occurrence first.
fn rewrite_refs(node: &SyntaxNode) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for child in node.descendants() {
        let name = match child.kind() {
            SyntaxKind::TokenRef => ast::TokenRef::cast(child).and_then(|t| t.name()),
            SyntaxKind::RuleRef => ast::RuleRef::cast(child).and_then(|r| r.name()),
            _ => None,
        };
        if let Some(name) = name {
            let name = name.text().to_string();
            if !refs.contains(&name) {
                refs.push(name);
            }
        }
    }
    refs
}
