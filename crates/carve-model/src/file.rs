//! Recognizer files and their rule tables.

use serde::Serialize;

use crate::rule::RuleFunction;

/// Which recognizer a file describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerKind {
    Parser,
    Lexer,
}

impl RecognizerKind {
    /// Suffix appended to a grammar name to form the recognizer name.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Parser => "Parser",
            Self::Lexer => "Lexer",
        }
    }
}

impl std::fmt::Display for RecognizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parser => write!(f, "parser"),
            Self::Lexer => write!(f, "lexer"),
        }
    }
}

/// One generated source file. Owns exactly one rule table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecognizerFile {
    pub file_name: String,
    pub grammar_name: String,
    /// Verbatim `@header` action, emitted before the recognizer.
    pub header: Option<String>,
    pub recognizer: Recognizer,
}

impl RecognizerFile {
    pub fn kind(&self) -> RecognizerKind {
        self.recognizer.kind()
    }

    pub fn parser(&self) -> Option<&Parser> {
        match &self.recognizer {
            Recognizer::Parser(p) => Some(p),
            Recognizer::Lexer(_) => None,
        }
    }

    pub fn lexer(&self) -> Option<&Lexer> {
        match &self.recognizer {
            Recognizer::Lexer(l) => Some(l),
            Recognizer::Parser(_) => None,
        }
    }
}

/// The rule table of a file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recognizer {
    Parser(Parser),
    Lexer(Lexer),
}

impl Recognizer {
    /// An empty table of the given kind, replaced once the real table is built.
    pub fn empty(kind: RecognizerKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            RecognizerKind::Parser => Self::Parser(Parser {
                name,
                ..Parser::default()
            }),
            RecognizerKind::Lexer => Self::Lexer(Lexer {
                name,
                ..Lexer::default()
            }),
        }
    }

    pub fn kind(&self) -> RecognizerKind {
        match self {
            Self::Parser(_) => RecognizerKind::Parser,
            Self::Lexer(_) => RecognizerKind::Lexer,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Parser(p) => &p.name,
            Self::Lexer(l) => &l.name,
        }
    }
}

/// Parser rule table. `funcs` follows declared rule order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Parser {
    pub name: String,
    /// Token display names indexed by token type (index 0 is `<INVALID>`).
    pub token_names: Vec<String>,
    pub rule_names: Vec<String>,
    /// Verbatim `@members` action.
    pub members: Option<String>,
    pub funcs: Vec<RuleFunction>,
}

/// Lexer rule table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Lexer {
    pub name: String,
    pub token_names: Vec<String>,
    pub rule_names: Vec<String>,
    pub modes: Vec<String>,
}
