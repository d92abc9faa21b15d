use carve_grammar::cst::SyntaxNode;
use carve_grammar::{DecisionInfo, Grammar, ast};
use carve_model::{ChoiceKind, CodeBlockForAlt, EbnfKind, SrcOp};
use indoc::indoc;

use crate::RuleError;
use crate::factory::ChoiceSite;
use crate::point::ConstructionPoint;
use crate::test_utils::{
    Recorder, build, build_with, controller, dump, entries, grammar, new_log,
};

const CHOICES: &str = indoc! {r#"
    (PARSER_GRAMMAR T
      (RULE s (BLOCK @1
        (ALT (TOKEN_REF A))
        (ALT (TOKEN_REF B) (CLOSURE @2 (BLOCK (ALT (TOKEN_REF C))))))))
"#};

fn first<T>(g: &Grammar, cast: fn(SyntaxNode) -> Option<T>) -> T {
    g.syntax()
        .as_cst()
        .descendants()
        .find_map(cast)
        .expect("fixture has the node")
}

fn tagged_alts(n: usize) -> Vec<CodeBlockForAlt> {
    (1..=n)
        .map(|i| CodeBlockForAlt {
            alt_num: i,
            ops: vec![SrcOp::action(format!("alt{i}"))],
        })
        .collect()
}

/// CHOICES with LL(1) classifications for both decisions.
fn classified() -> Grammar {
    let g = grammar(CHOICES);
    let a = g.lookahead(&["A"]).unwrap();
    let b = g.lookahead(&["B"]).unwrap();
    let c = g.lookahead(&["C"]).unwrap();
    g.with_decision(1, DecisionInfo::ll1(vec![a, b]))
        .with_decision(2, DecisionInfo::ll1(vec![c]))
}

#[test]
fn each_entry_point_builds_its_own_kind() {
    let g = classified();
    let block = first(&g, ast::Block::cast);
    let ebnf = first(&g, ast::Ebnf::cast);

    let cases = [
        (ChoiceKind::Generic, "ext:choice_block"),
        (ChoiceKind::Ebnf, "ext:ebnf_block"),
        (ChoiceKind::Ll1, "ext:ll1_choice_block"),
        (ChoiceKind::LlStar, "ext:ll_star_choice_block"),
        (ChoiceKind::EbnfLl1, "ext:ll1_ebnf_block"),
        (ChoiceKind::EbnfLlStar, "ext:ll_star_ebnf_block"),
    ];
    for (kind, hook) in cases {
        let log = new_log();
        let mut ctrl = controller(&g);
        ctrl.add_extension(Recorder::new("ext", &log));

        let n = if kind.is_ebnf() { 1 } else { 2 };
        let alts = tagged_alts(n);
        let choice = match kind {
            ChoiceKind::Generic => ctrl.choice_block(&block, alts.clone()),
            ChoiceKind::Ebnf => ctrl.ebnf_block(&ebnf, alts.clone()),
            ChoiceKind::Ll1 => ctrl.ll1_choice_block(&block, alts.clone()),
            ChoiceKind::LlStar => ctrl.ll_star_choice_block(&block, alts.clone()),
            ChoiceKind::EbnfLl1 => ctrl.ll1_ebnf_block(&ebnf, alts.clone()),
            ChoiceKind::EbnfLlStar => ctrl.ll_star_ebnf_block(&ebnf, alts.clone()),
        }
        .unwrap();

        assert_eq!(choice.kind, kind);
        assert_eq!(choice.alts, alts, "{kind}");
        let expected_tests = if kind.is_ll1() { n } else { 0 };
        assert_eq!(choice.alt_tests.len(), expected_tests, "{kind}");

        let hooks: Vec<String> = entries(&log)
            .into_iter()
            .filter(|e| e != "ext:ll1_test")
            .collect();
        assert_eq!(hooks, vec![hook]);
    }
}

#[test]
fn generic_entry_point_matches_the_typed_ones() {
    let g = classified();
    let block = first(&g, ast::Block::cast);
    let mut ctrl = controller(&g);

    let typed = ctrl.ll1_choice_block(&block, tagged_alts(2)).unwrap();
    let generic = ctrl
        .choice(ChoiceKind::Ll1, &ChoiceSite::Block(block), tagged_alts(2))
        .unwrap();
    assert_eq!(typed, generic);
}

#[test]
fn ebnf_choices_carry_their_operator() {
    let g = classified();
    let ebnf = first(&g, ast::Ebnf::cast);
    let mut ctrl = controller(&g);

    let choice = ctrl.ebnf_block(&ebnf, tagged_alts(1)).unwrap();
    assert_eq!(choice.ebnf, Some(EbnfKind::Closure));
    assert_eq!(choice.decision, Some(2));

    let block = first(&g, ast::Block::cast);
    let plain = ctrl.choice_block(&block, tagged_alts(2)).unwrap();
    assert_eq!(plain.ebnf, None);
    assert_eq!(plain.decision, Some(1));
}

#[test]
fn ll1_tests_come_from_the_lookahead_sets() {
    let g = classified();
    let log = new_log();
    let block = first(&g, ast::Block::cast);
    let mut ctrl = controller(&g);
    ctrl.add_extension(Recorder::new("ext", &log));

    let choice = ctrl.ll1_choice_block(&block, tagged_alts(2)).unwrap();
    let names: Vec<Vec<String>> = choice
        .alt_tests
        .iter()
        .map(|test| match test.as_slice() {
            [SrcOp::TestSetInline { token_names, .. }] => token_names.clone(),
            other => panic!("unexpected test {other:?}"),
        })
        .collect();
    assert_eq!(names, vec![vec!["A".to_string()], vec!["B".to_string()]]);
    assert_eq!(
        entries(&log),
        vec!["ext:ll1_test", "ext:ll1_test", "ext:ll1_choice_block"]
    );
}

#[test]
fn ll1_needs_a_classified_decision() {
    let g = grammar(CHOICES);
    let block = first(&g, ast::Block::cast);
    let mut ctrl = controller(&g);

    let err = ctrl.ll1_choice_block(&block, tagged_alts(2)).unwrap_err();
    let RuleError::Malformed { point, detail, .. } = err else {
        panic!("expected a malformed block, got {err:?}");
    };
    assert_eq!(point, Some(ConstructionPoint::Ll1ChoiceBlock));
    assert_eq!(detail, "decision 1 has no classification");
}

#[test]
fn ll1_needs_a_decision_number() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT (TOKEN_REF A)) (ALT (TOKEN_REF B)))))
    "#});
    let block = first(&g, ast::Block::cast);
    let mut ctrl = controller(&g);

    let err = ctrl.ll1_choice_block(&block, tagged_alts(2)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed BLOCK: LL(1) block has no decision number"
    );
}

#[test]
fn lookahead_count_must_match_alternatives() {
    let g = grammar(CHOICES);
    let a = g.lookahead(&["A"]).unwrap();
    let g = g.with_decision(1, DecisionInfo::ll1(vec![a]));
    let model = build(&g);

    assert_eq!(model.failed_rules(), vec!["s"]);
    let diagnostic = model.diagnostics.last().unwrap();
    assert_eq!(diagnostic.point(), Some(ConstructionPoint::Ll1ChoiceBlock));
    assert_eq!(
        diagnostic.message(),
        "malformed BLOCK in rule `s`: decision 1 has 1 lookahead sets for 2 alternatives"
    );
}

#[test]
fn kind_must_fit_the_site() {
    let g = classified();
    let block = first(&g, ast::Block::cast);
    let ebnf = first(&g, ast::Ebnf::cast);
    let mut ctrl = controller(&g);

    let err = ctrl
        .choice(ChoiceKind::Ebnf, &ChoiceSite::Block(block), tagged_alts(2))
        .unwrap_err();
    assert_eq!(err.to_string(), "malformed BLOCK: ebnf choice needs an EBNF block");

    let err = ctrl
        .choice(ChoiceKind::LlStar, &ChoiceSite::Ebnf(ebnf), tagged_alts(1))
        .unwrap_err();
    assert_eq!(err.to_string(), "malformed CLOSURE: ll* choice needs a plain block");
}

#[test]
fn walker_builds_ll1_choices_with_tests() {
    let model = build(&classified());

    assert!(model.is_clean());
    insta::assert_snapshot!(dump(&model), @r"
    parser file T.java (grammar T)
      parser T
        tokens <INVALID> A B C
        rule s -> SContext
          code
            ll1 choice d1
              alt 1
                test A
                match A
              alt 2
                test B
                match B
                ebnf-ll1 choice d2 *
                  alt 1
                    test C
                    match C
    ");
}

#[test]
fn walker_builds_ll_star_choices() {
    let g = grammar(CHOICES)
        .with_decision(1, DecisionInfo::ll_star())
        .with_decision(2, DecisionInfo::ll_star());
    let model = build(&g);

    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    ll* choice d1
      alt 1
        match A
      alt 2
        match B
        ebnf-ll* choice d2 *
          alt 1
            match C
    ");
}

#[test]
fn walker_picks_the_hook_for_each_strategy_and_site() {
    let cases = [
        (
            grammar(CHOICES)
                .with_decision(1, DecisionInfo::generic())
                .with_decision(2, DecisionInfo::generic()),
            ["ext:ebnf_block", "ext:choice_block"],
        ),
        (
            classified(),
            ["ext:ll1_ebnf_block", "ext:ll1_choice_block"],
        ),
        (
            grammar(CHOICES)
                .with_decision(1, DecisionInfo::ll_star())
                .with_decision(2, DecisionInfo::ll_star()),
            ["ext:ll_star_ebnf_block", "ext:ll_star_choice_block"],
        ),
    ];

    for (g, expected) in cases {
        let log = new_log();
        build_with(&g, vec![Box::new(Recorder::new("ext", &log))]);

        let choice_hooks: Vec<String> = entries(&log)
            .into_iter()
            .filter(|e| e.ends_with("_block"))
            .collect();
        assert_eq!(choice_hooks, expected);
    }
}

#[test]
fn unclassified_decisions_fall_back_with_a_warning() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK @5 (ALT (TOKEN_REF A) (OPTIONAL @6 (BLOCK (ALT (TOKEN_REF B)))))
                            (ALT (POSITIVE_CLOSURE (BLOCK @7 (ALT (TOKEN_REF C))))))))
    "#});
    let model = build(&g);

    assert!(model.is_clean());
    assert_eq!(model.diagnostics.warning_count(), 3);
    let messages: Vec<_> = model.diagnostics.iter().map(|d| d.message()).collect();
    assert_eq!(
        messages,
        vec![
            "decision 6 has no classification; building a generic choice",
            "decision 7 has no classification; building a generic choice",
            "decision 5 has no classification; building a generic choice",
        ]
    );
    assert!(model.diagnostics.iter().all(|d| d.rule() == Some("s")));

    let g = g.with_decision(7, DecisionInfo::generic());
    let model = build(&g);
    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    choice d5
      alt 1
        match A
        ebnf choice d6 ?
          alt 1
            match B
      alt 2
        ebnf choice d7 +
          alt 1
            match C
    ");
}

#[test]
fn block_without_decision_number_falls_back() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT (TOKEN_REF A)) (ALT (TOKEN_REF B)))))
    "#});
    let model = build(&g);

    assert!(model.is_clean());
    let warning = model.diagnostics.last().unwrap();
    assert!(warning.is_warning());
    assert_eq!(
        warning.message(),
        "block has no decision number; building a generic choice"
    );
}

#[test]
fn nested_choice_restores_the_enclosing_alternative() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT
            (BLOCK @2 (ALT (TOKEN_REF B)) (ALT (TOKEN_REF C)))
            (TOKEN_REF A)
            (ACTION {use($A);})))))
    "#})
    .with_decision(2, DecisionInfo::generic());
    let model = build(&g);

    assert!(model.is_clean());
    insta::assert_snapshot!(dump(&model), @r"
    parser file T.java (grammar T)
      parser T
        tokens <INVALID> B C A
        rule s -> SContext
          code
            choice d2
              alt 1
                match B
              alt 2
                match C
            match A @_a
            action use($A);
          ctx SContext
            token _a
    ");
}

#[test]
fn single_alternative_blocks_are_inlined() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT (TOKEN_REF A) (BLOCK (ALT (TOKEN_REF B) (TOKEN_REF C)))))))
    "#});
    let model = build(&g);

    assert!(model.diagnostics.is_empty());
    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    match A
    match B
    match C
    ");
}

#[test]
fn choice_site_decision_falls_back_to_the_block() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT (OPTIONAL (BLOCK @4 (ALT (TOKEN_REF A))))))))
    "#});
    let site = ChoiceSite::Ebnf(first(&g, ast::Ebnf::cast));

    assert_eq!(site.decision(), Some(4));
    assert_eq!(site.ebnf(), Some(EbnfKind::Optional));
    assert!(site.is_ebnf());
}

#[test]
fn choices_serialize_with_their_strategy() {
    let model = build(&classified());
    let code = &model.parser().unwrap().funcs[0].code;
    let value = serde_json::to_value(&code[0]).unwrap();

    assert_eq!(value["op"], "choice");
    assert_eq!(value["kind"], "ll1");
    assert_eq!(value["decision"], 1);
    assert_eq!(value["alt_tests"][1][0]["token_names"], serde_json::json!(["B"]));

    let nested = &value["alts"][1]["ops"][1];
    assert_eq!(nested["kind"], "ebnf_ll1");
    assert_eq!(nested["ebnf"], "closure");
}
