use carve_grammar::Grammar;
use indoc::indoc;

use crate::controller::{Controller, ParserModel};
use crate::extension::Extension;
use crate::test_utils::{dump, grammar, java};
use crate::tree_building::TreeBuildingExtension;
use crate::walker::SourceGenWalker;

fn build_trees(g: &Grammar) -> ParserModel {
    Controller::new(g, java().tree_building(true))
        .unwrap()
        .build_parser_model(&mut SourceGenWalker::new())
        .unwrap()
}

#[test]
fn leaves_roots_and_excluded_references() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE expr (BLOCK (ALT
            (RULE_REF atom)
            (ROOT (TOKEN_REF PLUS))
            (RULE_REF atom)
            (BANG (TOKEN_REF SEMI)))))
          (RULE atom (BLOCK (ALT (ASSIGN v (TOKEN_REF INT))))))
    "#});
    let model = build_trees(&g);

    assert!(model.is_clean());
    insta::assert_snapshot!(dump(&model), @r"
    parser file T.java (grammar T)
      parser T
        tokens <INVALID> PLUS SEMI INT
        rule expr -> ExprContext
          code
            invoke atom @_atom
            add-leaf _atom
            match PLUS @_plus
            become-root _plus
            invoke atom @_atom
            add-leaf _atom
            match SEMI @_semi
          ctx ExprContext
            rule-ctx _atom: AtomContext
            token _plus
            token _semi
        rule atom -> AtomContext
          code
            match INT @v
            add-leaf v
          ctx AtomContext
            token v
    ");
}

#[test]
fn explicit_labels_name_the_tree_ops() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT
            (ROOT (ASSIGN op (TOKEN_REF PLUS)))
            (PLUS_ASSIGN args (RULE_REF s))
            (ROOT (RULE_REF s))))))
    "#});
    let model = build_trees(&g);

    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    match PLUS @op
    become-root op
    invoke s @args
    add-leaf args
    invoke s @_s
    become-root _s
    ");
}

#[test]
fn literals_are_labeled_but_not_added() {
    let g = grammar("(PARSER_GRAMMAR T (RULE s (BLOCK (ALT (TOKEN_REF A) (STRING_LITERAL ';')))))");
    let model = build_trees(&g);

    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    match A @_a
    add-leaf _a
    match ';' @_t__2
    ");
}

#[test]
fn without_tree_building_nothing_is_labeled() {
    let g = grammar(indoc! {r#"
        (PARSER_GRAMMAR T
          (RULE s (BLOCK (ALT (ROOT (TOKEN_REF PLUS)) (RULE_REF s)))))
    "#});
    let model = crate::test_utils::build(&g);

    insta::assert_snapshot!(carve_model::dump::dump_ops(&model.parser().unwrap().funcs[0].code), @r"
    match PLUS
    invoke s
    ");
}

#[test]
fn hooks_leave_unlabeled_lists_alone() {
    let ext = TreeBuildingExtension::new();
    let ops = vec![carve_model::SrcOp::action("x")];

    assert_eq!(ext.leaf_token(ops.clone()), ops);
    assert_eq!(ext.root_rule(ops.clone()), ops);
    assert!(!ext.needs_implicit_label(
        grammar("(PARSER_GRAMMAR T (RULE s (BLOCK (ALT (EPSILON)))))")
            .syntax()
            .as_cst(),
        &ops[0],
    ));
}
