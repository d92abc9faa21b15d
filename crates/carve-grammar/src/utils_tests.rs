use crate::utils::{capitalize, is_lexer_rule_name};

#[test]
fn capitalize_first_only() {
    assert_eq!(capitalize("expr"), "Expr");
    assert_eq!(capitalize("exprList"), "ExprList");
    assert_eq!(capitalize("ID"), "ID");
    assert_eq!(capitalize(""), "");
}

#[test]
fn lexer_rule_names() {
    assert!(is_lexer_rule_name("ID"));
    assert!(is_lexer_rule_name("Whitespace"));
    assert!(!is_lexer_rule_name("expr"));
    assert!(!is_lexer_rule_name("_hidden"));
    assert!(!is_lexer_rule_name(""));
}
