use serde_json::json;

use crate::block::{Choice, ChoiceKind, CodeBlockForAlt};
use crate::file::{Recognizer, RecognizerFile, RecognizerKind};
use crate::ops::{OpKind, SrcOp};
use crate::rewrite::{RewriteShape, RewriteTree, RewriteTreeOptional};
use crate::role::{ModelNode, NodeRole};
use crate::rule::{AttributeDecl, Decl, DeclKind, RuleFunction, StructDecl};

#[test]
fn parse_attribute_list() {
    let attrs = AttributeDecl::parse_list("int x,  List<String> names , flag");
    assert_eq!(
        attrs,
        vec![
            AttributeDecl::new("x", Some("int".to_string())),
            AttributeDecl::new("names", Some("List<String>".to_string())),
            AttributeDecl::new("flag", None),
        ]
    );
}

#[test]
fn parse_attribute_list_empty() {
    assert!(AttributeDecl::parse_list("  ").is_empty());
    assert!(AttributeDecl::parse_list(",").is_empty());
}

#[test]
fn struct_decl_keeps_first_of_same_name() {
    let mut decl = StructDecl::new("AContext");
    decl.add_decl(Decl::token("x"));
    decl.add_decl(Decl::token_list("x"));
    decl.add_decl(Decl::rule_context("r", "BContext"));

    assert_eq!(decl.fields.len(), 2);
    assert_eq!(decl.get("x").map(|d| d.kind), Some(DeclKind::Token));
    assert_eq!(
        decl.get("r").and_then(|d| d.type_name.as_deref()),
        Some("BContext")
    );
}

#[test]
fn empty_context_is_dropped() {
    let mut func = RuleFunction::new("a", 0);
    func.drop_empty_context();
    assert!(func.rule_ctx.is_none());
}

#[test]
fn context_with_fields_is_kept() {
    let mut func = RuleFunction::new("a", 0);
    func.add_context_decl(Decl::token("x"));
    func.drop_empty_context();
    assert_eq!(func.rule_ctx.map(|c| c.fields.len()), Some(1));
}

#[test]
fn context_recreated_after_drop() {
    let mut func = RuleFunction::new("a", 0);
    func.ctx_type = "AContext".to_string();
    func.drop_empty_context();
    func.add_context_decl(Decl::token_list("ids"));

    let ctx = func.rule_ctx.unwrap();
    assert_eq!(ctx.name, "AContext");
    assert_eq!(ctx.fields, vec![Decl::token_list("ids")]);
}

#[test]
fn labeled_ops() {
    let mut op = SrcOp::MatchToken {
        name: "ID".to_string(),
        ttype: 1,
        labels: vec![],
    };
    assert!(op.is_labeled_op());
    assert_eq!(op.label(), None);

    if let Some(labels) = op.labels_mut() {
        labels.push("x".to_string());
    }
    assert_eq!(op.label(), Some("x"));

    let action = SrcOp::action("f();");
    assert!(!action.is_labeled_op());
    assert_eq!(action.kind(), OpKind::Action);
}

#[test]
fn epsilon_alternative() {
    let mut alt = CodeBlockForAlt::new(1);
    assert!(alt.is_epsilon());
    alt.ops.push(SrcOp::Epsilon);
    assert!(alt.is_epsilon());
    alt.ops.push(SrcOp::action("x"));
    assert!(!alt.is_epsilon());
}

#[test]
fn choice_kind_flags() {
    let ebnf: Vec<_> = ChoiceKind::ALL.iter().filter(|k| k.is_ebnf()).collect();
    let ll1: Vec<_> = ChoiceKind::ALL.iter().filter(|k| k.is_ll1()).collect();
    assert_eq!(
        ebnf,
        vec![&ChoiceKind::Ebnf, &ChoiceKind::EbnfLl1, &ChoiceKind::EbnfLlStar]
    );
    assert_eq!(ll1, vec![&ChoiceKind::Ll1, &ChoiceKind::EbnfLl1]);
}

#[test]
fn roles() {
    let file = RecognizerFile {
        file_name: "TLexer.java".to_string(),
        grammar_name: "T".to_string(),
        header: None,
        recognizer: Recognizer::empty(RecognizerKind::Lexer, "TLexer"),
    };
    assert_eq!(file.role(), NodeRole::File(RecognizerKind::Lexer));
    assert_eq!(file.recognizer.name(), "TLexer");

    let func = RuleFunction::new("expr", 2);
    assert_eq!(func.role(), NodeRole::RuleFunction("expr".to_string()));

    let choice = Choice::new(ChoiceKind::LlStar, Some(1), vec![]);
    assert_eq!(choice.role(), NodeRole::Choice(ChoiceKind::LlStar));
    assert_eq!(choice.role().to_string(), "ll* choice");

    let rewrite = RewriteTree::Optional(RewriteTreeOptional::default());
    assert_eq!(rewrite.role(), NodeRole::Rewrite(RewriteShape::Optional));
    assert_eq!(rewrite.into_op().kind(), OpKind::RewriteOptional);
}

#[test]
fn serialized_shape() {
    let mut func = RuleFunction::new("a", 0);
    func.ctx_type = "AContext".to_string();
    func.code.push(SrcOp::InvokeRule {
        name: "b".to_string(),
        ctx_type: "BContext".to_string(),
        args: None,
        labels: vec!["r".to_string()],
    });
    func.code.push(SrcOp::Epsilon);
    func.drop_empty_context();

    let value = serde_json::to_value(&func).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "a",
            "index": 0,
            "ctx_type": "AContext",
            "args": [],
            "returns": [],
            "locals": [],
            "code": [
                {
                    "op": "invoke_rule",
                    "name": "b",
                    "ctx_type": "BContext",
                    "args": null,
                    "labels": ["r"]
                },
                { "op": "epsilon" }
            ],
            "postamble": [],
            "rule_ctx": null
        })
    );
}

#[test]
fn serialized_recognizer_is_tagged() {
    let recognizer = Recognizer::empty(RecognizerKind::Parser, "TParser");
    let value = serde_json::to_value(&recognizer).unwrap();
    assert_eq!(value["kind"], "parser");
    assert_eq!(value["name"], "TParser");
}
