//! Human-readable dump of an output model tree.
//!
//! One line per node, two spaces of indentation per nesting level. The format
//! is stable and used by snapshot tests; renderers consume the typed tree.

use crate::block::{Choice, ChoiceKind};
use crate::file::{Lexer, Parser, Recognizer, RecognizerFile};
use crate::ops::SrcOp;
use crate::rule::{AttributeDecl, DeclKind, RuleFunction};

/// Generate a human-readable dump of a recognizer file.
pub fn dump(file: &RecognizerFile) -> String {
    let mut out = Dumper::default();
    out.file(file);
    out.buf
}

/// Dump a single operation list starting at depth 0.
pub fn dump_ops(ops: &[SrcOp]) -> String {
    let mut out = Dumper::default();
    out.ops(ops, 0);
    out.buf
}

#[derive(Default)]
struct Dumper {
    buf: String,
}

impl Dumper {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.buf.push_str("  ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn file(&mut self, file: &RecognizerFile) {
        self.line(
            0,
            &format!(
                "{} file {} (grammar {})",
                file.kind(),
                file.file_name,
                file.grammar_name
            ),
        );
        if let Some(header) = &file.header {
            self.line(1, &format!("header {header}"));
        }
        match &file.recognizer {
            Recognizer::Parser(p) => self.parser(p),
            Recognizer::Lexer(l) => self.lexer(l),
        }
    }

    fn parser(&mut self, parser: &Parser) {
        self.line(1, &format!("parser {}", parser.name));
        if !parser.token_names.is_empty() {
            self.line(2, &format!("tokens {}", parser.token_names.join(" ")));
        }
        if let Some(members) = &parser.members {
            self.line(2, &format!("members {members}"));
        }
        for func in &parser.funcs {
            self.rule(func);
        }
    }

    fn lexer(&mut self, lexer: &Lexer) {
        self.line(1, &format!("lexer {}", lexer.name));
        if !lexer.token_names.is_empty() {
            self.line(2, &format!("tokens {}", lexer.token_names.join(" ")));
        }
        if !lexer.rule_names.is_empty() {
            self.line(2, &format!("rules {}", lexer.rule_names.join(" ")));
        }
        if !lexer.modes.is_empty() {
            self.line(2, &format!("modes {}", lexer.modes.join(" ")));
        }
    }

    fn rule(&mut self, func: &RuleFunction) {
        self.line(2, &format!("rule {} -> {}", func.name, func.ctx_type));
        self.attributes("args", &func.args);
        self.attributes("returns", &func.returns);
        self.attributes("locals", &func.locals);

        if func.code.is_empty() {
            self.line(3, "code (empty)");
        } else {
            self.line(3, "code");
            self.ops(&func.code, 4);
        }

        if !func.postamble.is_empty() {
            self.line(3, "postamble");
            self.ops(&func.postamble, 4);
        }

        if let Some(ctx) = &func.rule_ctx {
            self.line(3, &format!("ctx {}", ctx.name));
            for field in &ctx.fields {
                let kind = match field.kind {
                    DeclKind::Token => "token",
                    DeclKind::TokenList => "token-list",
                    DeclKind::RuleContext => "rule-ctx",
                    DeclKind::RuleContextList => "rule-ctx-list",
                    DeclKind::Attribute => "attr",
                };
                match &field.type_name {
                    Some(ty) => self.line(4, &format!("{kind} {}: {ty}", field.name)),
                    None => self.line(4, &format!("{kind} {}", field.name)),
                }
            }
        }
    }

    fn attributes(&mut self, title: &str, attrs: &[AttributeDecl]) {
        if attrs.is_empty() {
            return;
        }
        let rendered: Vec<String> = attrs
            .iter()
            .map(|a| match &a.type_name {
                Some(ty) => format!("{ty} {}", a.name),
                None => a.name.clone(),
            })
            .collect();
        self.line(3, &format!("{title} {}", rendered.join(", ")));
    }

    fn ops(&mut self, ops: &[SrcOp], depth: usize) {
        for op in ops {
            self.op(op, depth);
        }
    }

    fn op(&mut self, op: &SrcOp, depth: usize) {
        match op {
            SrcOp::MatchToken { name, labels, .. } => {
                self.line(depth, &format!("match {name}{}", labels_suffix(labels)));
            }
            SrcOp::InvokeRule {
                name, args, labels, ..
            } => {
                let args = args.as_deref().map(|a| format!("({a})")).unwrap_or_default();
                self.line(
                    depth,
                    &format!("invoke {name}{args}{}", labels_suffix(labels)),
                );
            }
            SrcOp::MatchLiteral {
                literal, labels, ..
            } => {
                self.line(depth, &format!("match {literal}{}", labels_suffix(labels)));
            }
            SrcOp::Action { code } => self.line(depth, &format!("action {code}")),
            SrcOp::ForcedAction { code } => self.line(depth, &format!("forced-action {code}")),
            SrcOp::SemPred { predicate } => self.line(depth, &format!("sempred {predicate}")),
            SrcOp::Epsilon => self.line(depth, "epsilon"),
            SrcOp::Choice(choice) => self.choice(choice, depth),
            SrcOp::TestSetInline { token_names, .. } => {
                self.line(depth, &format!("test {}", token_names.join(" ")));
            }
            SrcOp::AddLeaf { label } => self.line(depth, &format!("add-leaf {label}")),
            SrcOp::BecomeRoot { label } => self.line(depth, &format!("become-root {label}")),
            SrcOp::TreeRewrite(r) => {
                self.line(depth, "rewrite");
                self.ops(&r.ops, depth + 1);
            }
            SrcOp::RewriteOptional(o) => {
                self.line(
                    depth,
                    &format!("rewrite-optional [{}]", o.referenced.join(", ")),
                );
                self.ops(&o.ops, depth + 1);
            }
            SrcOp::RewriteClosure(c) => {
                self.line(
                    depth,
                    &format!("rewrite-closure [{}]", c.referenced.join(", ")),
                );
                self.ops(&c.ops, depth + 1);
            }
            SrcOp::RewriteTree(t) => {
                self.line(depth, "rewrite-tree");
                self.line(depth + 1, "root");
                self.ops(&t.root, depth + 2);
                if !t.children.is_empty() {
                    self.line(depth + 1, "children");
                    self.ops(&t.children, depth + 2);
                }
            }
            SrcOp::RewriteTokenRef {
                token, is_root, arg, ..
            } => {
                let root = if *is_root { " ^" } else { "" };
                let arg = arg.as_deref().map(|a| format!(" ({a})")).unwrap_or_default();
                self.line(depth, &format!("rewrite-token {token}{root}{arg}"));
            }
            SrcOp::RewriteRuleRef { rule, is_root, .. } => {
                let root = if *is_root { " ^" } else { "" };
                self.line(depth, &format!("rewrite-rule {rule}{root}"));
            }
        }
    }

    fn choice(&mut self, choice: &Choice, depth: usize) {
        let mut head = match choice.kind {
            ChoiceKind::Generic => "choice".to_string(),
            kind => format!("{kind} choice"),
        };
        if let Some(d) = choice.decision {
            head.push_str(&format!(" d{d}"));
        }
        if let Some(ebnf) = choice.ebnf {
            head.push_str(&format!(" {ebnf}"));
        }
        self.line(depth, &head);

        if !choice.preamble.is_empty() {
            self.line(depth + 1, "preamble");
            self.ops(&choice.preamble, depth + 2);
        }

        for (i, alt) in choice.alts.iter().enumerate() {
            self.line(depth + 1, &format!("alt {}", alt.alt_num));
            if let Some(test) = choice.alt_tests.get(i) {
                self.ops(test, depth + 2);
            }
            self.ops(&alt.ops, depth + 2);
        }
    }
}

fn labels_suffix(labels: &[String]) -> String {
    labels.iter().map(|l| format!(" @{l}")).collect()
}
