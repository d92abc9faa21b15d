/// Uppercase the first character, leaving the rest untouched.
///
/// # Examples
/// ```
/// use carve_grammar::utils::capitalize;
/// assert_eq!(capitalize("exprList"), "ExprList");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a rule name denotes a lexer rule (`ID`, `Whitespace`).
pub fn is_lexer_rule_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
