use carve_grammar::{DecisionInfo, GrammarKind, ast};
use carve_model::SrcOp;
use indoc::indoc;

use crate::RuleError;
use crate::controller::Controller;
use crate::point::ConstructionPoint;
use crate::test_utils::{build, controller, dump, grammar};
use crate::walker::SyntaxWalker;

#[test]
fn actions_predicates_and_arguments() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT
            (SEMPRED {ready()}?)
            (RULE_REF e [1, true])
            (FORCED_ACTION {log();})
            (ACTION {done();}))))
          (RULE e (ARG_ACTION [int depth, boolean flag]) (BLOCK (ALT (EPSILON)))))
    "#});
    let model = build(&g);

    assert!(model.diagnostics.is_empty());
    insta::assert_snapshot!(dump(&model), @r"
    parser file T.java (grammar T)
      parser T
        tokens <INVALID>
        rule s -> SContext
          code
            sempred ready()
            invoke e(1, true)
            forced-action log();
            action done();
        rule e -> EContext
          args int depth, boolean flag
          code
            epsilon
          ctx EContext
            attr depth: int
            attr flag: boolean
    ");
}

#[test]
fn epsilon_alternatives_inside_choices() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK @1 (ALT (TOKEN_REF A)) (ALT (EPSILON)))))
    "#})
    .with_decision(1, DecisionInfo::generic());
    let model = build(&g);

    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    choice d1
      alt 1
        match A
      alt 2
        epsilon
    ");
}

#[test]
fn alternative_with_only_a_rewrite() {
    let g = grammar("(PARSER_GRAMMAR T (RULE s (BLOCK (ALT (REWRITE (TOKEN_REF A))))))");
    let model = build(&g);

    assert!(model.is_clean());
    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    rewrite
      rewrite-token A
    ");
}

#[test]
fn malformed_shapes_fail_only_their_rule() {
    let cases = [
        (
            "(ALT (TOKEN_REF A) (RETURNS [int x]))",
            "malformed RETURNS in rule `s`: unexpected RETURNS in alternative",
        ),
        ("(ALT)", "malformed ALT in rule `s`: alternative has no elements"),
        (
            "(ALT (OPTIONAL @1))",
            "malformed OPTIONAL in rule `s`: EBNF has no block",
        ),
        (
            "(ALT (CLOSURE (BLOCK)))",
            "malformed BLOCK in rule `s`: block has no alternatives",
        ),
        ("(ALT (ROOT))", "malformed ROOT in rule `s`: `^` has no operand"),
        ("(ALT (BANG))", "malformed BANG in rule `s`: `!` has no operand"),
        (
            "(ALT (ASSIGN x))",
            "malformed ASSIGN in rule `s`: expected a rule, token or literal reference",
        ),
        (
            "(ALT (ASSIGN x (ACTION {f();})))",
            "malformed ASSIGN in rule `s`: expected a rule, token or literal reference",
        ),
        (
            "(ALT (REWRITE (REWRITE_TREE)))",
            "malformed REWRITE_TREE in rule `s`: rewrite tree has no root",
        ),
    ];

    for (alt, expected) in cases {
        let source = format!(
            "(PARSER_GRAMMAR T (RULE s (BLOCK {alt})) (RULE t (BLOCK (ALT (TOKEN_REF A)))))"
        );
        let g = grammar(&source);
        let model = build(&g);

        assert_eq!(model.failed_rules(), vec!["s"], "{alt}");
        assert_eq!(model.diagnostics.error_count(), 1, "{alt}");
        let diagnostic = model.diagnostics.last().unwrap();
        assert_eq!(diagnostic.message(), expected);
        assert_eq!(diagnostic.rule(), Some("s"));

        let funcs = &model.parser().unwrap().funcs;
        assert!(funcs[0].code.is_empty(), "{alt}");
        assert_eq!(funcs[1].code.len(), 1, "{alt}");
    }
}

#[test]
fn unknown_child_reports_the_alternative_point() {
    let g = grammar("(PARSER_GRAMMAR T (RULE s (BLOCK (ALT (LOCALS [int x])))))");
    let model = build(&g);

    let diagnostic = model.diagnostics.last().unwrap();
    assert_eq!(diagnostic.point(), Some(ConstructionPoint::Alternative));
    assert_eq!(diagnostic.hints(), ["raised while building `alternative`"]);
}

#[test]
fn unclassified_warning_keeps_the_model_clean() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK @3 (ALT (TOKEN_REF A)) (ALT (TOKEN_REF B)))))
    "#});
    let model = build(&g);

    assert!(model.is_clean());
    assert_eq!(model.diagnostics.error_count(), 0);
    assert!(model.diagnostics.has_warnings());
    let warning = model.diagnostics.last().unwrap();
    assert_eq!(warning.rule(), Some("s"));
    assert_eq!(warning.point(), None);
    assert_eq!(
        &g.source()[warning.range()],
        "(BLOCK @3 (ALT (TOKEN_REF A)) (ALT (TOKEN_REF B)))"
    );
}

/// Walks every rule to the same canned body.
struct CannedWalker {
    walked: Vec<String>,
}

impl SyntaxWalker for CannedWalker {
    fn walk_rule(
        &mut self,
        ctrl: &mut Controller<'_>,
        rule: &ast::Rule,
    ) -> Result<Vec<SrcOp>, RuleError> {
        let name = rule.name().map(|n| n.text().to_string()).unwrap_or_default();
        assert_eq!(ctrl.current_rule().map(|r| r.name.as_str()), Some(name.as_str()));
        self.walked.push(name);
        Ok(vec![SrcOp::action("canned();")])
    }
}

#[test]
fn walkers_are_pluggable() {
    let g = grammar(indoc! {r#"
        (COMBINED_GRAMMAR T
          (RULE first (BLOCK (ALT (TOKEN_REF ID))))
          (RULE ID (BLOCK (ALT (STRING_LITERAL 'x'))))
          (RULE second (BLOCK (ALT (RULE_REF first)))))
    "#});
    assert_eq!(g.kind(), GrammarKind::Combined);

    let mut walker = CannedWalker { walked: Vec::new() };
    let model = controller(&g).build_parser_model(&mut walker).unwrap();

    assert_eq!(walker.walked, vec!["first", "second"]);
    let funcs = &model.parser().unwrap().funcs;
    assert!(funcs.iter().all(|f| f.code == vec![SrcOp::action("canned();")]));
}
