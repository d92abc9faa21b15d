//! Syntax kinds for grammar trees.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the notation lexer) and
//! node kinds (one per grammar construct). Logos derives token recognition;
//! node kinds lack token/regex attributes.
//! `GrammarLang` implements Rowan's `Language` trait for tree construction.

use logos::{Lexer, Logos};
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    LParen = 0,

    #[token(")")]
    RParen,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Node head right after `(`. Lexed as `Word`, re-tagged by the reader.
    Head,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    /// Quoted literal: `'+'`
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    Str,

    /// Action or predicate code with balanced braces: `{...}` or `{...}?`
    #[token("{", lex_code)]
    Code,

    /// Bracketed argument text: `[int x]`
    #[regex(r"\[[^\]]*\]")]
    ArgText,

    /// Decision number annotation: `@3`
    #[regex(r"@[0-9]+")]
    Decision,

    /// Coalesced unrecognized characters
    Error,

    // --- Node kinds (one per grammar construct) ---
    ParserGrammar,
    LexerGrammar,
    CombinedGrammar,
    /// Named action: `(AT header {...})`
    NamedAction,
    Rule,
    ArgAction,
    Returns,
    Locals,
    Block,
    Alt,
    RuleRef,
    TokenRef,
    StringLiteral,
    Action,
    ForcedAction,
    Sempred,
    Epsilon,
    Optional,
    Closure,
    PositiveClosure,
    /// Tree-root marker `^` in automatic tree construction
    Root,
    /// Exclusion marker `!` in automatic tree construction
    Bang,
    Assign,
    PlusAssign,
    Rewrite,
    RewriteTree,
    RewriteOptional,
    RewriteClosure,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

/// Consume a balanced `{...}` block, plus a trailing `?` for predicates.
fn lex_code(lex: &mut Lexer<SyntaxKind>) -> bool {
    let mut depth = 1usize;
    let mut end = None;
    for (i, c) in lex.remainder().char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i + 1);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(mut end) = end else {
        return false;
    };
    if lex.remainder()[end..].starts_with('?') {
        end += 1;
    }
    lex.bump(end);
    true
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        self == Whitespace
    }

    /// Node kind named by a head word, e.g. `TOKEN_REF`.
    pub fn from_head(head: &str) -> Option<Self> {
        let kind = match head {
            "PARSER_GRAMMAR" => ParserGrammar,
            "LEXER_GRAMMAR" => LexerGrammar,
            "COMBINED_GRAMMAR" => CombinedGrammar,
            "AT" => NamedAction,
            "RULE" => Rule,
            "ARG_ACTION" => ArgAction,
            "RETURNS" => Returns,
            "LOCALS" => Locals,
            "BLOCK" => Block,
            "ALT" => Alt,
            "RULE_REF" => RuleRef,
            "TOKEN_REF" => TokenRef,
            "STRING_LITERAL" => StringLiteral,
            "ACTION" => Action,
            "FORCED_ACTION" => ForcedAction,
            "SEMPRED" => Sempred,
            "EPSILON" => Epsilon,
            "OPTIONAL" => Optional,
            "CLOSURE" => Closure,
            "POSITIVE_CLOSURE" => PositiveClosure,
            "ROOT" => Root,
            "BANG" => Bang,
            "ASSIGN" => Assign,
            "PLUS_ASSIGN" => PlusAssign,
            "REWRITE" => Rewrite,
            "REWRITE_TREE" => RewriteTree,
            "REWRITE_OPTIONAL" => RewriteOptional,
            "REWRITE_CLOSURE" => RewriteClosure,
            _ => return None,
        };
        Some(kind)
    }

    /// Head word of a node kind; `None` for tokens.
    pub fn head(self) -> Option<&'static str> {
        let head = match self {
            ParserGrammar => "PARSER_GRAMMAR",
            LexerGrammar => "LEXER_GRAMMAR",
            CombinedGrammar => "COMBINED_GRAMMAR",
            NamedAction => "AT",
            Rule => "RULE",
            ArgAction => "ARG_ACTION",
            Returns => "RETURNS",
            Locals => "LOCALS",
            Block => "BLOCK",
            Alt => "ALT",
            RuleRef => "RULE_REF",
            TokenRef => "TOKEN_REF",
            StringLiteral => "STRING_LITERAL",
            Action => "ACTION",
            ForcedAction => "FORCED_ACTION",
            Sempred => "SEMPRED",
            Epsilon => "EPSILON",
            Optional => "OPTIONAL",
            Closure => "CLOSURE",
            PositiveClosure => "POSITIVE_CLOSURE",
            Root => "ROOT",
            Bang => "BANG",
            Assign => "ASSIGN",
            PlusAssign => "PLUS_ASSIGN",
            Rewrite => "REWRITE",
            RewriteTree => "REWRITE_TREE",
            RewriteOptional => "REWRITE_OPTIONAL",
            RewriteClosure => "REWRITE_CLOSURE",
            _ => return None,
        };
        Some(head)
    }

    #[inline]
    pub fn is_grammar_root(self) -> bool {
        matches!(self, ParserGrammar | LexerGrammar | CombinedGrammar)
    }

    #[inline]
    pub fn is_ebnf(self) -> bool {
        matches!(self, Optional | Closure | PositiveClosure)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLang {}

impl Language for GrammarLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<GrammarLang>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;
