use indoc::indoc;
use rowan::NodeOrToken;

use crate::cst::{SyntaxKind, SyntaxNode};
use crate::notation::{NotationError, lex, read};

fn render(node: &SyntaxNode, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{:?}\n", "  ".repeat(depth), node.kind()));
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => render(&n, depth + 1, out),
            NodeOrToken::Token(t) => {
                if matches!(
                    t.kind(),
                    SyntaxKind::Whitespace | SyntaxKind::LParen | SyntaxKind::RParen | SyntaxKind::Head
                ) {
                    continue;
                }
                out.push_str(&format!(
                    "{}{:?} {:?}\n",
                    "  ".repeat(depth + 1),
                    t.kind(),
                    t.text()
                ));
            }
        }
    }
}

fn tree(source: &str) -> String {
    let green = read(source).unwrap();
    let mut out = String::new();
    render(&SyntaxNode::new_root(green), 0, &mut out);
    out
}

#[test]
fn reads_nested_nodes() {
    insta::assert_snapshot!(tree("(PARSER_GRAMMAR T (RULE a (BLOCK @1 (ALT (TOKEN_REF ID)))))"), @r#"
    ParserGrammar
      Word "T"
      Rule
        Word "a"
        Block
          Decision "@1"
          Alt
            TokenRef
              Word "ID"
    "#);
}

#[test]
fn reads_code_literals_and_arguments() {
    let source = "(COMBINED_GRAMMAR T (RULE a (ARG_ACTION [int x]) (BLOCK (ALT (STRING_LITERAL '+') (SEMPRED {p()}?) (ACTION {f({});})))))";
    insta::assert_snapshot!(tree(source), @r#"
    CombinedGrammar
      Word "T"
      Rule
        Word "a"
        ArgAction
          ArgText "[int x]"
        Block
          Alt
            StringLiteral
              Str "'+'"
            Sempred
              Code "{p()}?"
            Action
              Code "{f({});}"
    "#);
}

#[test]
fn tree_is_lossless() {
    let source = indoc! {"
        (LEXER_GRAMMAR L
          (RULE ID (BLOCK (ALT (ACTION { skip(); })))))"};
    let green = read(source).unwrap();
    assert_eq!(SyntaxNode::new_root(green).text().to_string(), source);
}

#[test]
fn lex_coalesces_garbage() {
    let kinds: Vec<_> = lex("(A ##)").into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::LParen,
            SyntaxKind::Word,
            SyntaxKind::Whitespace,
            SyntaxKind::Error,
            SyntaxKind::RParen,
        ]
    );
}

#[test]
fn unbalanced_code_is_an_error() {
    let kinds: Vec<_> = lex("{ f(").into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Error,
            SyntaxKind::Whitespace,
            SyntaxKind::Word,
            SyntaxKind::LParen,
        ]
    );
}

#[test]
fn unknown_head() {
    assert_eq!(
        read("(PARSER_GRAMMAR T (FOO x))"),
        Err(NotationError::UnknownHead {
            head: "FOO".to_string(),
            offset: 19
        })
    );
}

#[test]
fn unclosed_node() {
    assert_eq!(
        read("(PARSER_GRAMMAR T (RULE a)"),
        Err(NotationError::Unclosed { offset: 0 })
    );
}

#[test]
fn missing_head() {
    assert_eq!(
        read("(PARSER_GRAMMAR T ( RULE a))"),
        Err(NotationError::MissingHead { offset: 18 })
    );
}

#[test]
fn trailing_input() {
    assert_eq!(
        read("(PARSER_GRAMMAR T) (RULE a)"),
        Err(NotationError::TrailingInput { offset: 19 })
    );
}

#[test]
fn unexpected_character() {
    assert_eq!(
        read("(PARSER_GRAMMAR T (ACTION #))"),
        Err(NotationError::UnexpectedCharacter { offset: 26 })
    );
}

#[test]
fn root_must_be_a_grammar() {
    assert_eq!(read("(RULE a)"), Err(NotationError::NotAGrammar { offset: 0 }));
    assert_eq!(read(")"), Err(NotationError::Unmatched { offset: 0 }));
    assert_eq!(read(""), Err(NotationError::Empty));
}
