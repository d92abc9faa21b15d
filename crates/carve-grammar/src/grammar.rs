//! A loaded grammar: syntax tree plus the facts analysis supplies about it.

use indexmap::IndexMap;
use rowan::GreenNode;

use carve_model::RecognizerKind;

use crate::ast::{GrammarRoot, Rule};
use crate::cst::{SyntaxKind, SyntaxNode, SyntaxToken};
use crate::decision::DecisionInfo;
use crate::lookahead::LookaheadSet;
use crate::notation::{self, NotationError};
use crate::utils::is_lexer_rule_name;
use crate::vocabulary::Vocabulary;

/// Which recognizers a grammar declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    Parser,
    Lexer,
    /// Parser and lexer rules in one grammar.
    Combined,
}

impl GrammarKind {
    pub fn supports(self, kind: RecognizerKind) -> bool {
        match self {
            Self::Parser => kind == RecognizerKind::Parser,
            Self::Lexer => kind == RecognizerKind::Lexer,
            Self::Combined => true,
        }
    }

    fn from_syntax(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::ParserGrammar => Some(Self::Parser),
            SyntaxKind::LexerGrammar => Some(Self::Lexer),
            SyntaxKind::CombinedGrammar => Some(Self::Combined),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrammarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parser => write!(f, "parser"),
            Self::Lexer => write!(f, "lexer"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

/// Immutable grammar handed to code generation.
///
/// The green tree is shareable across threads; every call to [`Grammar::syntax`]
/// yields a fresh red root owned by the caller.
#[derive(Debug, Clone)]
pub struct Grammar {
    green: GreenNode,
    source: String,
    name: String,
    kind: GrammarKind,
    vocabulary: Vocabulary,
    decisions: IndexMap<usize, DecisionInfo>,
}

impl Grammar {
    /// Load a grammar from its tree notation. Surrounding whitespace is ignored.
    pub fn parse(source: &str) -> Result<Self, NotationError> {
        let source = source.trim();
        let green = notation::read(source)?;
        let root = SyntaxNode::new_root(green.clone());
        let kind = GrammarKind::from_syntax(root.kind())
            .ok_or(NotationError::NotAGrammar { offset: 0 })?;
        let root = GrammarRoot::cast(root).ok_or(NotationError::NotAGrammar { offset: 0 })?;
        let name_token = root.name().ok_or(NotationError::MissingName)?;
        if let Some(stray) = grammar_tokens(&root).find(|t| *t != name_token) {
            return Err(NotationError::StrayToken {
                text: stray.text().to_string(),
                offset: stray.text_range().start().into(),
            });
        }
        let name = name_token.text().to_string();
        if let Some(rule) = root.rules().find(|rule| rule.name().is_none()) {
            return Err(NotationError::UnnamedRule {
                offset: rule.as_cst().text_range().start().into(),
            });
        }
        check_decisions(root.as_cst())?;
        let vocabulary = Vocabulary::from_root(&root);

        Ok(Self {
            green,
            source: source.to_string(),
            name,
            kind,
            vocabulary,
            decisions: IndexMap::new(),
        })
    }

    /// Record the classification of a decision.
    pub fn with_decision(mut self, decision: usize, info: DecisionInfo) -> Self {
        self.set_decision(decision, info);
        self
    }

    pub fn set_decision(&mut self, decision: usize, info: DecisionInfo) {
        self.decisions.insert(decision, info);
    }

    pub fn classify(&self, decision: usize) -> Option<&DecisionInfo> {
        self.decisions.get(&decision)
    }

    /// Lookahead set from token display names, e.g. `["ID", "'+'"]`.
    pub fn lookahead(&self, names: &[&str]) -> Option<LookaheadSet> {
        LookaheadSet::from_names(&self.vocabulary, names)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    /// The notation text the tree was read from. Syntax ranges index into it.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn syntax(&self) -> GrammarRoot {
        GrammarRoot::cast(SyntaxNode::new_root(self.green.clone()))
            .expect("grammar green tree always has a grammar root")
    }

    /// Combined grammars get a kind suffix; parser and lexer grammars keep their name.
    pub fn recognizer_name(&self, kind: RecognizerKind) -> String {
        match self.kind {
            GrammarKind::Combined => format!("{}{}", self.name, kind.suffix()),
            _ => self.name.clone(),
        }
    }

    /// Rules that belong to the given recognizer, in declared order.
    pub fn rules_for(&self, root: &GrammarRoot, kind: RecognizerKind) -> Vec<Rule> {
        root.rules()
            .filter(|rule| {
                let lexer_rule = match self.kind {
                    GrammarKind::Parser => false,
                    GrammarKind::Lexer => true,
                    GrammarKind::Combined => rule
                        .name()
                        .is_some_and(|name| is_lexer_rule_name(name.text())),
                };
                lexer_rule == (kind == RecognizerKind::Lexer)
            })
            .collect()
    }

    /// Names of `rules_for(kind)`; unnamed rules are skipped.
    pub fn rule_names(&self, kind: RecognizerKind) -> Vec<String> {
        self.rules_for(&self.syntax(), kind)
            .iter()
            .filter_map(|rule| rule.name().map(|t| t.text().to_string()))
            .collect()
    }

    /// Body of a grammar-level named action such as `header` or `members`.
    pub fn named_action(&self, name: &str) -> Option<String> {
        self.syntax().named_action(name)?.code()
    }
}

/// Tokens directly under the grammar node, other than its delimiters and head.
fn grammar_tokens(root: &GrammarRoot) -> impl Iterator<Item = SyntaxToken> + '_ {
    root.as_cst()
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| {
            !t.kind().is_trivia()
                && !matches!(
                    t.kind(),
                    SyntaxKind::LParen | SyntaxKind::RParen | SyntaxKind::Head
                )
        })
}

/// Every `@n` annotation must fit a decision number.
fn check_decisions(root: &SyntaxNode) -> Result<(), NotationError> {
    let annotations = root
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| t.kind() == SyntaxKind::Decision);
    for token in annotations {
        let digits = token.text().trim_start_matches('@');
        if digits.parse::<usize>().is_err() {
            return Err(NotationError::DecisionOutOfRange {
                text: token.text().to_string(),
                offset: token.text_range().start().into(),
            });
        }
    }
    Ok(())
}
