//! Test fixtures and extensions that observe the chain.

use std::cell::RefCell;
use std::rc::Rc;

use carve_grammar::cst::SyntaxNode;
use carve_grammar::{GenericTarget, Grammar};
use carve_model::{
    Choice, CodeBlockForAlt, Lexer, Parser, RecognizerFile, RewriteTreeClosure,
    RewriteTreeOptional, RewriteTreeStructure, RuleFunction, SrcOp, TreeRewrite,
};

use crate::config::Config;
use crate::controller::{Controller, ParserModel};
use crate::extension::Extension;
use crate::walker::SourceGenWalker;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn grammar(source: &str) -> Grammar {
    Grammar::parse(source).expect("fixture grammar must parse")
}

pub fn java() -> Config {
    Config::new().target(GenericTarget::java())
}

pub fn controller(grammar: &Grammar) -> Controller<'_> {
    Controller::new(grammar, java()).expect("target is configured")
}

pub fn build(grammar: &Grammar) -> ParserModel {
    controller(grammar)
        .build_parser_model(&mut SourceGenWalker::new())
        .expect("job must not fail")
}

/// Build with the given extensions registered in order.
pub fn build_with(grammar: &Grammar, extensions: Vec<Box<dyn Extension>>) -> ParserModel {
    let mut ctrl = controller(grammar);
    for ext in extensions {
        ctrl.add_extension(BoxedExtension(ext));
    }
    ctrl.build_parser_model(&mut SourceGenWalker::new())
        .expect("job must not fail")
}

pub fn dump(model: &ParserModel) -> String {
    carve_model::dump(&model.file)
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Forwards to a boxed extension, so fixtures can be built as a list.
struct BoxedExtension(Box<dyn Extension>);

macro_rules! forward_hooks {
    ($($hook:ident: $ty:ty),* $(,)?) => {
        $(
            fn $hook(&self, node: $ty) -> $ty {
                self.0.$hook(node)
            }
        )*
    };
}

impl Extension for BoxedExtension {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn needs_implicit_label(&self, id: &SyntaxNode, op: &SrcOp) -> bool {
        self.0.needs_implicit_label(id, op)
    }

    forward_hooks! {
        parser_file: RecognizerFile,
        parser: Parser,
        lexer_file: RecognizerFile,
        lexer: Lexer,
        rule: RuleFunction,
        rule_postamble: Vec<SrcOp>,
        alternative: CodeBlockForAlt,
        finish_alternative: CodeBlockForAlt,
        epsilon: CodeBlockForAlt,
        rule_ref: Vec<SrcOp>,
        leaf_rule: Vec<SrcOp>,
        token_ref: Vec<SrcOp>,
        leaf_token: Vec<SrcOp>,
        string_ref: Vec<SrcOp>,
        action: Vec<SrcOp>,
        forced_action: Vec<SrcOp>,
        sempred: Vec<SrcOp>,
        root_token: Vec<SrcOp>,
        root_rule: Vec<SrcOp>,
        choice_block: Choice,
        ebnf_block: Choice,
        ll1_choice_block: Choice,
        ll_star_choice_block: Choice,
        ll1_ebnf_block: Choice,
        ll_star_ebnf_block: Choice,
        ll1_test: Vec<SrcOp>,
        tree_rewrite: TreeRewrite,
        rewrite_optional: RewriteTreeOptional,
        rewrite_closure: RewriteTreeClosure,
        rewrite_tree: RewriteTreeStructure,
        rewrite_rule_ref: Vec<SrcOp>,
        rewrite_token_ref: Vec<SrcOp>,
    }
}

/// Logs `tag:hook` for every hook it sees and returns nodes unchanged.
pub struct Recorder {
    pub tag: &'static str,
    pub log: Log,
    /// Answer given to `needs_implicit_label`.
    pub wants_label: bool,
}

impl Recorder {
    pub fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            log: Rc::clone(log),
            wants_label: false,
        }
    }

    pub fn wanting_labels(mut self) -> Self {
        self.wants_label = true;
        self
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.tag));
    }
}

macro_rules! record_hooks {
    ($($hook:ident: $ty:ty),* $(,)?) => {
        $(
            fn $hook(&self, node: $ty) -> $ty {
                self.record(stringify!($hook));
                node
            }
        )*
    };
}

impl Extension for Recorder {
    fn name(&self) -> &str {
        self.tag
    }

    fn needs_implicit_label(&self, _id: &SyntaxNode, _op: &SrcOp) -> bool {
        self.record("needs_implicit_label");
        self.wants_label
    }

    record_hooks! {
        parser_file: RecognizerFile,
        parser: Parser,
        lexer_file: RecognizerFile,
        lexer: Lexer,
        rule: RuleFunction,
        rule_postamble: Vec<SrcOp>,
        alternative: CodeBlockForAlt,
        finish_alternative: CodeBlockForAlt,
        epsilon: CodeBlockForAlt,
        rule_ref: Vec<SrcOp>,
        leaf_rule: Vec<SrcOp>,
        token_ref: Vec<SrcOp>,
        leaf_token: Vec<SrcOp>,
        string_ref: Vec<SrcOp>,
        action: Vec<SrcOp>,
        forced_action: Vec<SrcOp>,
        sempred: Vec<SrcOp>,
        root_token: Vec<SrcOp>,
        root_rule: Vec<SrcOp>,
        choice_block: Choice,
        ebnf_block: Choice,
        ll1_choice_block: Choice,
        ll_star_choice_block: Choice,
        ll1_ebnf_block: Choice,
        ll_star_ebnf_block: Choice,
        ll1_test: Vec<SrcOp>,
        tree_rewrite: TreeRewrite,
        rewrite_optional: RewriteTreeOptional,
        rewrite_closure: RewriteTreeClosure,
        rewrite_tree: RewriteTreeStructure,
        rewrite_rule_ref: Vec<SrcOp>,
        rewrite_token_ref: Vec<SrcOp>,
    }
}

/// Appends `action <tag>` to reference op lists and a tagged preamble action
/// to every choice, so the nesting order of the chain shows in the output.
pub struct Tagger(pub &'static str);

impl Tagger {
    fn tag(&self, mut ops: Vec<SrcOp>) -> Vec<SrcOp> {
        ops.push(SrcOp::action(self.0));
        ops
    }
}

impl Extension for Tagger {
    fn name(&self) -> &str {
        self.0
    }

    fn token_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        self.tag(ops)
    }

    fn rule_ref(&self, ops: Vec<SrcOp>) -> Vec<SrcOp> {
        self.tag(ops)
    }

    fn choice_block(&self, mut choice: Choice) -> Choice {
        choice.preamble.push(SrcOp::action(self.0));
        choice
    }

    fn rule(&self, mut function: RuleFunction) -> RuleFunction {
        function.locals.push(carve_model::AttributeDecl {
            name: self.0.to_string(),
            type_name: None,
        });
        function
    }
}
