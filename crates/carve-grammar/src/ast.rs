//! Typed AST wrappers over grammar CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind`; accessors return `None` for
//! missing parts and callers decide whether that is an error.

use carve_model::EbnfKind;

use crate::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(NamedAction, NamedAction);
ast_node!(Rule, Rule);
ast_node!(ArgAction, ArgAction);
ast_node!(Returns, Returns);
ast_node!(Locals, Locals);
ast_node!(Block, Block);
ast_node!(Alt, Alt);
ast_node!(RuleRef, RuleRef);
ast_node!(TokenRef, TokenRef);
ast_node!(StringLiteral, StringLiteral);
ast_node!(Action, Action);
ast_node!(ForcedAction, ForcedAction);
ast_node!(Sempred, Sempred);
ast_node!(Epsilon, Epsilon);
ast_node!(Root, Root);
ast_node!(Bang, Bang);
ast_node!(Assign, Assign);
ast_node!(PlusAssign, PlusAssign);
ast_node!(Rewrite, Rewrite);
ast_node!(RewriteTree, RewriteTree);
ast_node!(RewriteOptional, RewriteOptional);
ast_node!(RewriteClosure, RewriteClosure);

/// Whole grammar: `PARSER_GRAMMAR`, `LEXER_GRAMMAR` or `COMBINED_GRAMMAR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrammarRoot(SyntaxNode);

impl GrammarRoot {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        node.kind().is_grammar_root().then(|| Self(node))
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn named_actions(&self) -> impl Iterator<Item = NamedAction> + '_ {
        self.0.children().filter_map(NamedAction::cast)
    }

    pub fn named_action(&self, name: &str) -> Option<NamedAction> {
        self.named_actions().find(|a| a.is_named(name))
    }

    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.0.children().filter_map(Rule::cast)
    }
}

/// `(...)?`, `(...)*` or `(...)+` around a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ebnf(SyntaxNode);

impl Ebnf {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        node.kind().is_ebnf().then(|| Self(node))
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn op(&self) -> EbnfKind {
        match self.0.kind() {
            SyntaxKind::Optional => EbnfKind::Optional,
            SyntaxKind::Closure => EbnfKind::Closure,
            _ => EbnfKind::PositiveClosure,
        }
    }

    /// Decision number of the loop or optional, if annotated.
    pub fn decision(&self) -> Option<usize> {
        decision(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

/// Grammar element inside an alternative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    RuleRef(RuleRef),
    TokenRef(TokenRef),
    StringLiteral(StringLiteral),
    Action(Action),
    ForcedAction(ForcedAction),
    Sempred(Sempred),
    Epsilon(Epsilon),
    Block(Block),
    Ebnf(Ebnf),
    Root(Root),
    Bang(Bang),
    Assign(Assign),
    PlusAssign(PlusAssign),
}

impl Element {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::RuleRef => RuleRef::cast(node).map(Element::RuleRef),
            SyntaxKind::TokenRef => TokenRef::cast(node).map(Element::TokenRef),
            SyntaxKind::StringLiteral => StringLiteral::cast(node).map(Element::StringLiteral),
            SyntaxKind::Action => Action::cast(node).map(Element::Action),
            SyntaxKind::ForcedAction => ForcedAction::cast(node).map(Element::ForcedAction),
            SyntaxKind::Sempred => Sempred::cast(node).map(Element::Sempred),
            SyntaxKind::Epsilon => Epsilon::cast(node).map(Element::Epsilon),
            SyntaxKind::Block => Block::cast(node).map(Element::Block),
            SyntaxKind::Optional | SyntaxKind::Closure | SyntaxKind::PositiveClosure => {
                Ebnf::cast(node).map(Element::Ebnf)
            }
            SyntaxKind::Root => Root::cast(node).map(Element::Root),
            SyntaxKind::Bang => Bang::cast(node).map(Element::Bang),
            SyntaxKind::Assign => Assign::cast(node).map(Element::Assign),
            SyntaxKind::PlusAssign => PlusAssign::cast(node).map(Element::PlusAssign),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Element::RuleRef(n) => n.as_cst(),
            Element::TokenRef(n) => n.as_cst(),
            Element::StringLiteral(n) => n.as_cst(),
            Element::Action(n) => n.as_cst(),
            Element::ForcedAction(n) => n.as_cst(),
            Element::Sempred(n) => n.as_cst(),
            Element::Epsilon(n) => n.as_cst(),
            Element::Block(n) => n.as_cst(),
            Element::Ebnf(n) => n.as_cst(),
            Element::Root(n) => n.as_cst(),
            Element::Bang(n) => n.as_cst(),
            Element::Assign(n) => n.as_cst(),
            Element::PlusAssign(n) => n.as_cst(),
        }
    }
}

/// Element of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RewriteElement {
    TokenRef(TokenRef),
    RuleRef(RuleRef),
    StringLiteral(StringLiteral),
    Tree(RewriteTree),
    Optional(RewriteOptional),
    Closure(RewriteClosure),
}

impl RewriteElement {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::TokenRef => TokenRef::cast(node).map(RewriteElement::TokenRef),
            SyntaxKind::RuleRef => RuleRef::cast(node).map(RewriteElement::RuleRef),
            SyntaxKind::StringLiteral => {
                StringLiteral::cast(node).map(RewriteElement::StringLiteral)
            }
            SyntaxKind::RewriteTree => RewriteTree::cast(node).map(RewriteElement::Tree),
            SyntaxKind::RewriteOptional => {
                RewriteOptional::cast(node).map(RewriteElement::Optional)
            }
            SyntaxKind::RewriteClosure => RewriteClosure::cast(node).map(RewriteElement::Closure),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            RewriteElement::TokenRef(n) => n.as_cst(),
            RewriteElement::RuleRef(n) => n.as_cst(),
            RewriteElement::StringLiteral(n) => n.as_cst(),
            RewriteElement::Tree(n) => n.as_cst(),
            RewriteElement::Optional(n) => n.as_cst(),
            RewriteElement::Closure(n) => n.as_cst(),
        }
    }
}

/// Label attached to a reference: `x=ID` or `xs+=ID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Assign(Assign),
    PlusAssign(PlusAssign),
}

impl Label {
    pub fn name(&self) -> Option<SyntaxToken> {
        match self {
            Label::Assign(a) => a.label(),
            Label::PlusAssign(a) => a.label(),
        }
    }

    /// `+=` labels collect every match into a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Label::PlusAssign(_))
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Label::Assign(a) => a.as_cst(),
            Label::PlusAssign(a) => a.as_cst(),
        }
    }
}

impl NamedAction {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name().is_some_and(|t| t.text() == name)
    }

    pub fn code(&self) -> Option<String> {
        code(&self.0)
    }
}

impl Rule {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn arg_action(&self) -> Option<ArgAction> {
        self.0.children().find_map(ArgAction::cast)
    }

    pub fn returns(&self) -> Option<Returns> {
        self.0.children().find_map(Returns::cast)
    }

    pub fn locals(&self) -> Option<Locals> {
        self.0.children().find_map(Locals::cast)
    }

    pub fn named_action(&self, name: &str) -> Option<NamedAction> {
        self.0
            .children()
            .filter_map(NamedAction::cast)
            .find(|a| a.is_named(name))
    }

    pub fn block(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

impl ArgAction {
    pub fn text(&self) -> Option<String> {
        arg_text(&self.0)
    }
}

impl Returns {
    pub fn text(&self) -> Option<String> {
        arg_text(&self.0)
    }
}

impl Locals {
    pub fn text(&self) -> Option<String> {
        arg_text(&self.0)
    }
}

impl Block {
    pub fn decision(&self) -> Option<usize> {
        decision(&self.0)
    }

    pub fn alts(&self) -> impl Iterator<Item = Alt> + '_ {
        self.0.children().filter_map(Alt::cast)
    }
}

impl Alt {
    /// Matching elements, in order. The rewrite is not an element.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.children().filter_map(Element::cast)
    }

    pub fn rewrite(&self) -> Option<Rewrite> {
        self.0.children().find_map(Rewrite::cast)
    }

    /// Child nodes that are neither elements nor a rewrite.
    pub fn unknown_children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() != SyntaxKind::Rewrite && Element::cast(n.clone()).is_none())
    }

    /// Names referenced as `$name` from actions and predicates in this alternative.
    pub fn attribute_refs(&self) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        for node in self.0.descendants() {
            if !matches!(
                node.kind(),
                SyntaxKind::Action | SyntaxKind::ForcedAction | SyntaxKind::Sempred
            ) {
                continue;
            }
            let Some(text) = code(&node) else {
                continue;
            };
            for name in dollar_refs(&text) {
                if !refs.contains(&name) {
                    refs.push(name);
                }
            }
        }
        refs
    }
}

impl RuleRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn args(&self) -> Option<String> {
        arg_text(&self.0)
    }
}

impl TokenRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    /// Argument of a rewrite token reference: `ID[$x]`.
    pub fn arg(&self) -> Option<String> {
        arg_text(&self.0)
    }
}

impl StringLiteral {
    pub fn literal(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Str)
    }
}

impl Action {
    pub fn code(&self) -> Option<String> {
        code(&self.0)
    }
}

impl ForcedAction {
    pub fn code(&self) -> Option<String> {
        code(&self.0)
    }
}

impl Sempred {
    pub fn predicate(&self) -> Option<String> {
        code(&self.0)
    }
}

impl Root {
    pub fn element(&self) -> Option<Element> {
        self.0.children().find_map(Element::cast)
    }
}

impl Bang {
    pub fn element(&self) -> Option<Element> {
        self.0.children().find_map(Element::cast)
    }
}

impl Assign {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn element(&self) -> Option<Element> {
        self.0.children().find_map(Element::cast)
    }
}

impl PlusAssign {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Word)
    }

    pub fn element(&self) -> Option<Element> {
        self.0.children().find_map(Element::cast)
    }
}

impl Rewrite {
    pub fn elements(&self) -> impl Iterator<Item = RewriteElement> + '_ {
        self.0.children().filter_map(RewriteElement::cast)
    }
}

impl RewriteTree {
    /// First element is the root, the rest are children.
    pub fn elements(&self) -> impl Iterator<Item = RewriteElement> + '_ {
        self.0.children().filter_map(RewriteElement::cast)
    }
}

impl RewriteOptional {
    pub fn elements(&self) -> impl Iterator<Item = RewriteElement> + '_ {
        self.0.children().filter_map(RewriteElement::cast)
    }
}

impl RewriteClosure {
    pub fn elements(&self) -> impl Iterator<Item = RewriteElement> + '_ {
        self.0.children().filter_map(RewriteElement::cast)
    }
}

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn decision(node: &SyntaxNode) -> Option<usize> {
    let token = child_token(node, SyntaxKind::Decision)?;
    token.text().strip_prefix('@')?.parse().ok()
}

/// Body of a `{...}` or `{...}?` code token, trimmed.
fn code(node: &SyntaxNode) -> Option<String> {
    let token = child_token(node, SyntaxKind::Code)?;
    let text = token.text();
    let text = text.strip_suffix('?').unwrap_or(text);
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    Some(inner.trim().to_string())
}

/// Body of a `[...]` argument token, trimmed.
fn arg_text(node: &SyntaxNode) -> Option<String> {
    let token = child_token(node, SyntaxKind::ArgText)?;
    let inner = token.text().strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim().to_string())
}

/// `$name` references in action code. `$name.attr` yields `name`.
pub fn dollar_refs(code: &str) -> Vec<String> {
    let mut refs = Vec::new();
    let mut rest = code;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end > 0 {
            refs.push(rest[..end].to_string());
        }
        rest = &rest[end..];
    }
    refs
}
