//! Rule functions and rule context descriptors.

use serde::Serialize;

use crate::ops::SrcOp;

/// One generated function per grammar rule.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleFunction {
    pub name: String,
    /// Position of the rule in declared order.
    pub index: usize,
    /// Generated context type name, assigned from target naming rules.
    pub ctx_type: String,
    pub args: Vec<AttributeDecl>,
    pub returns: Vec<AttributeDecl>,
    pub locals: Vec<AttributeDecl>,
    pub code: Vec<SrcOp>,
    pub postamble: Vec<SrcOp>,
    /// Absent when the context would carry no fields.
    pub rule_ctx: Option<StructDecl>,
}

impl RuleFunction {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        let name = name.into();
        Self {
            rule_ctx: Some(StructDecl::new(name.clone())),
            name,
            index,
            ctx_type: String::new(),
            args: Vec::new(),
            returns: Vec::new(),
            locals: Vec::new(),
            code: Vec::new(),
            postamble: Vec::new(),
        }
    }

    /// Declare a field on the rule context, creating the context if it was dropped.
    pub fn add_context_decl(&mut self, decl: Decl) {
        let name = self.ctx_type.clone();
        self.rule_ctx
            .get_or_insert_with(|| StructDecl::new(name))
            .add_decl(decl);
    }

    /// Drop the context descriptor when it has no fields.
    pub fn drop_empty_context(&mut self) {
        if self.rule_ctx.as_ref().is_some_and(StructDecl::is_empty) {
            self.rule_ctx = None;
        }
    }
}

/// A generated struct: name plus name-unique fields in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Decl>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field. A field with the same name is kept, not duplicated.
    pub fn add_decl(&mut self, decl: Decl) {
        if self.fields.iter().any(|d| d.name == decl.name) {
            return;
        }
        self.fields.push(decl);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Decl> {
        self.fields.iter().find(|d| d.name == name)
    }
}

/// Kind of a context field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// `x=ID`
    Token,
    /// `xs+=ID`
    TokenList,
    /// `r=rule`
    RuleContext,
    /// `rs+=rule`
    RuleContextList,
    /// Argument, return value, or local.
    Attribute,
}

/// A field declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: String,
    /// Declared type for attributes, context type for rule labels.
    pub type_name: Option<String>,
}

impl Decl {
    pub fn token(name: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::Token,
            name: name.into(),
            type_name: None,
        }
    }

    pub fn token_list(name: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::TokenList,
            name: name.into(),
            type_name: None,
        }
    }

    pub fn rule_context(name: impl Into<String>, ctx_type: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::RuleContext,
            name: name.into(),
            type_name: Some(ctx_type.into()),
        }
    }

    pub fn rule_context_list(name: impl Into<String>, ctx_type: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::RuleContextList,
            name: name.into(),
            type_name: Some(ctx_type.into()),
        }
    }

    pub fn attribute(attr: &AttributeDecl) -> Self {
        Self {
            kind: DeclKind::Attribute,
            name: attr.name.clone(),
            type_name: attr.type_name.clone(),
        }
    }
}

/// `type name` pair from a rule's argument, return, or locals declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeDecl {
    pub name: String,
    pub type_name: Option<String>,
}

impl AttributeDecl {
    pub fn new(name: impl Into<String>, type_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }

    /// Parse a comma separated attribute list such as `int x, String y`.
    ///
    /// The last word of each entry is the name; anything before it is the type.
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.rsplit_once(char::is_whitespace) {
                Some((ty, name)) => Self::new(name.trim(), Some(ty.trim().to_string())),
                None => Self::new(entry, None),
            })
            .collect()
    }
}
