//! Token vocabulary: display name to token type.
//!
//! Types are assigned from 1 in order of first definition. Lexer rules define
//! their token in rule order, then token references and string literals are
//! defined where they first appear. Type 0 is reserved, `EOF` is always -1.

use indexmap::IndexMap;

use crate::ast::GrammarRoot;
use crate::cst::SyntaxKind;
use crate::utils::is_lexer_rule_name;

pub const EOF: i32 = -1;
pub const INVALID_TYPE: i32 = 0;
pub const EOF_NAME: &str = "EOF";
pub const INVALID_NAME: &str = "<INVALID>";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    types: IndexMap<String, i32>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every token a grammar defines or references.
    pub fn from_root(root: &GrammarRoot) -> Self {
        let mut vocab = Self::new();
        let all_lexer = root.as_cst().kind() == SyntaxKind::LexerGrammar;

        for rule in root.rules() {
            let Some(name) = rule.name() else {
                continue;
            };
            if all_lexer || is_lexer_rule_name(name.text()) {
                vocab.define(name.text());
            }
        }

        for node in root.as_cst().descendants() {
            let token = match node.kind() {
                SyntaxKind::TokenRef => node
                    .children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .find(|t| t.kind() == SyntaxKind::Word),
                SyntaxKind::StringLiteral => node
                    .children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .find(|t| t.kind() == SyntaxKind::Str),
                _ => None,
            };
            if let Some(token) = token {
                vocab.define(token.text());
            }
        }

        vocab
    }

    /// Type of `name`, defining it if new. `EOF` is never defined.
    pub fn define(&mut self, name: &str) -> i32 {
        if name == EOF_NAME {
            return EOF;
        }
        if let Some(&ttype) = self.types.get(name) {
            return ttype;
        }
        let ttype = self.types.len() as i32 + 1;
        self.types.insert(name.to_string(), ttype);
        ttype
    }

    pub fn ttype(&self, name: &str) -> Option<i32> {
        if name == EOF_NAME {
            return Some(EOF);
        }
        self.types.get(name).copied()
    }

    pub fn display_name(&self, ttype: i32) -> Option<&str> {
        match ttype {
            EOF => Some(EOF_NAME),
            INVALID_TYPE => Some(INVALID_NAME),
            t if t > 0 => self
                .types
                .get_index(t as usize - 1)
                .map(|(name, _)| name.as_str()),
            _ => None,
        }
    }

    /// Display names indexed by token type, starting with `<INVALID>`.
    pub fn token_names(&self) -> Vec<String> {
        std::iter::once(INVALID_NAME.to_string())
            .chain(self.types.keys().cloned())
            .collect()
    }

    /// Number of defined token types, not counting the reserved ones.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
