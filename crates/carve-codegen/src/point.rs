//! Construction points: every place an extension can observe a node.

/// One construction point per extension hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructionPoint {
    ParserFile,
    Parser,
    LexerFile,
    Lexer,
    Rule,
    RulePostamble,
    Alternative,
    FinishAlternative,
    Epsilon,
    RuleRef,
    LeafRule,
    TokenRef,
    LeafToken,
    StringRef,
    Action,
    ForcedAction,
    Sempred,
    RootToken,
    RootRule,
    ChoiceBlock,
    EbnfBlock,
    Ll1ChoiceBlock,
    LlStarChoiceBlock,
    Ll1EbnfBlock,
    LlStarEbnfBlock,
    Ll1Test,
    NeedsImplicitLabel,
    TreeRewrite,
    RewriteOptional,
    RewriteClosure,
    RewriteTree,
    RewriteRuleRef,
    RewriteTokenRef,
}

impl ConstructionPoint {
    /// Hook name, as spelled on `Extension`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ParserFile => "parser_file",
            Self::Parser => "parser",
            Self::LexerFile => "lexer_file",
            Self::Lexer => "lexer",
            Self::Rule => "rule",
            Self::RulePostamble => "rule_postamble",
            Self::Alternative => "alternative",
            Self::FinishAlternative => "finish_alternative",
            Self::Epsilon => "epsilon",
            Self::RuleRef => "rule_ref",
            Self::LeafRule => "leaf_rule",
            Self::TokenRef => "token_ref",
            Self::LeafToken => "leaf_token",
            Self::StringRef => "string_ref",
            Self::Action => "action",
            Self::ForcedAction => "forced_action",
            Self::Sempred => "sempred",
            Self::RootToken => "root_token",
            Self::RootRule => "root_rule",
            Self::ChoiceBlock => "choice_block",
            Self::EbnfBlock => "ebnf_block",
            Self::Ll1ChoiceBlock => "ll1_choice_block",
            Self::LlStarChoiceBlock => "ll_star_choice_block",
            Self::Ll1EbnfBlock => "ll1_ebnf_block",
            Self::LlStarEbnfBlock => "ll_star_ebnf_block",
            Self::Ll1Test => "ll1_test",
            Self::NeedsImplicitLabel => "needs_implicit_label",
            Self::TreeRewrite => "tree_rewrite",
            Self::RewriteOptional => "rewrite_optional",
            Self::RewriteClosure => "rewrite_closure",
            Self::RewriteTree => "rewrite_tree",
            Self::RewriteRuleRef => "rewrite_rule_ref",
            Self::RewriteTokenRef => "rewrite_token_ref",
        }
    }
}

impl std::fmt::Display for ConstructionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
