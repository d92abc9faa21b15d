//! Reader for the tree notation of already-parsed grammars.
//!
//! A grammar arrives as one s-expression whose heads name node kinds:
//!
//! ```text
//! (COMBINED_GRAMMAR T
//!   (RULE expr (BLOCK @1 (ALT (TOKEN_REF ID)) (ALT (RULE_REF atom)))))
//! ```
//!
//! The reader only checks delimiters and head names. Shape rules (a rule has
//! a name and a block, an alternative has elements) are left to the typed
//! accessors so that malformed rules can be reported one at a time.
//!
//! The resulting tree is lossless: every byte of the input, including
//! whitespace, is kept in a token.

use logos::Logos;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use crate::cst::SyntaxKind;

/// Zero-copy token: kind + span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("unexpected character at offset {offset}")]
    UnexpectedCharacter { offset: u32 },

    #[error("unknown node head `{head}` at offset {offset}")]
    UnknownHead { head: String, offset: u32 },

    #[error("expected a node head after `(` at offset {offset}")]
    MissingHead { offset: u32 },

    #[error("unclosed `(` opened at offset {offset}")]
    Unclosed { offset: u32 },

    #[error("unmatched `)` at offset {offset}")]
    Unmatched { offset: u32 },

    #[error("expected a grammar node at offset {offset}")]
    NotAGrammar { offset: u32 },

    #[error("unexpected input after the grammar at offset {offset}")]
    TrailingInput { offset: u32 },

    #[error("grammar has no name")]
    MissingName,

    #[error("rule at offset {offset} has no name")]
    UnnamedRule { offset: u32 },

    #[error("unexpected `{text}` in the grammar node at offset {offset}")]
    StrayToken { text: String, offset: u32 },

    #[error("decision number `{text}` is out of range at offset {offset}")]
    DecisionOutOfRange { text: String, offset: u32 },

    #[error("empty input")]
    Empty,
}

fn range_to_text_range(range: std::ops::Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes notation source. Consecutive unrecognized characters become one `Error` token.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(SyntaxKind::Error, range_to_text_range(start..end)));
                }
                tokens.push(Token::new(kind, range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Error,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

/// Read a whole grammar tree. `source` must already be trimmed.
pub fn read(source: &str) -> Result<GreenNode, NotationError> {
    let mut reader = Reader {
        source,
        tokens: lex(source),
        pos: 0,
        builder: GreenNodeBuilder::new(),
    };
    reader.document()?;
    Ok(reader.builder.finish())
}

struct Reader<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
}

impl<'src> Reader<'src> {
    fn document(&mut self) -> Result<(), NotationError> {
        let Some(first) = self.peek() else {
            return Err(NotationError::Empty);
        };
        if first.kind != SyntaxKind::LParen {
            return Err(self.unexpected(first));
        }
        let kind = self.node()?;
        if !kind.is_grammar_root() {
            return Err(NotationError::NotAGrammar { offset: 0 });
        }
        let trailing = self.tokens[self.pos..].iter().find(|t| !t.kind.is_trivia());
        if let Some(extra) = trailing {
            return Err(NotationError::TrailingInput {
                offset: offset(extra.span.start()),
            });
        }
        Ok(())
    }

    /// Read one parenthesized node. The current token is `(`.
    fn node(&mut self) -> Result<SyntaxKind, NotationError> {
        let open = self.bump_raw();
        let head = match self.peek() {
            Some(t) if t.kind == SyntaxKind::Word => t,
            _ => {
                return Err(NotationError::MissingHead {
                    offset: offset(open.span.start()),
                });
            }
        };
        let head_text = self.text(head);
        let kind = SyntaxKind::from_head(head_text).ok_or_else(|| NotationError::UnknownHead {
            head: head_text.to_string(),
            offset: offset(head.span.start()),
        })?;
        self.pos += 1;

        self.builder.start_node(kind.into());
        self.push(open);
        self.push(Token::new(SyntaxKind::Head, head.span));

        loop {
            let Some(token) = self.peek() else {
                return Err(NotationError::Unclosed {
                    offset: offset(open.span.start()),
                });
            };
            match token.kind {
                SyntaxKind::LParen => {
                    self.node()?;
                }
                SyntaxKind::RParen => {
                    self.bump();
                    break;
                }
                SyntaxKind::Error => return Err(self.unexpected(token)),
                _ => self.bump(),
            }
        }

        self.builder.finish_node();
        Ok(kind)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump_raw(&mut self) -> Token {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn bump(&mut self) {
        let token = self.bump_raw();
        self.push(token);
    }

    fn push(&mut self, token: Token) {
        let text = self.text(token);
        self.builder.token(token.kind.into(), text);
    }

    fn text(&self, token: Token) -> &'src str {
        &self.source[token.span]
    }

    fn unexpected(&self, token: Token) -> NotationError {
        let offset = offset(token.span.start());
        match token.kind {
            SyntaxKind::RParen => NotationError::Unmatched { offset },
            SyntaxKind::Error => NotationError::UnexpectedCharacter { offset },
            _ => NotationError::NotAGrammar { offset },
        }
    }
}

fn offset(size: TextSize) -> u32 {
    size.into()
}
