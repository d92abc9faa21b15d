//! Alternative code blocks and choice constructs.

use serde::Serialize;

use crate::ops::SrcOp;

/// Operations realizing one grammar alternative.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CodeBlockForAlt {
    /// 1-based alternative number within its block.
    pub alt_num: usize,
    pub ops: Vec<SrcOp>,
}

impl CodeBlockForAlt {
    pub fn new(alt_num: usize) -> Self {
        Self {
            alt_num,
            ops: Vec::new(),
        }
    }

    /// An alternative that matches nothing.
    pub fn is_epsilon(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, SrcOp::Epsilon))
    }
}

/// Decision strategy a choice was built for. Supplied by grammar analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    /// Subrule block, strategy left to the renderer.
    Generic,
    /// EBNF block, strategy left to the renderer.
    Ebnf,
    Ll1,
    LlStar,
    EbnfLl1,
    EbnfLlStar,
}

impl ChoiceKind {
    pub const ALL: [ChoiceKind; 6] = [
        ChoiceKind::Generic,
        ChoiceKind::Ebnf,
        ChoiceKind::Ll1,
        ChoiceKind::LlStar,
        ChoiceKind::EbnfLl1,
        ChoiceKind::EbnfLlStar,
    ];

    pub fn is_ebnf(self) -> bool {
        matches!(self, Self::Ebnf | Self::EbnfLl1 | Self::EbnfLlStar)
    }

    /// LL(1) choices carry one precomputed lookahead test per alternative.
    pub fn is_ll1(self) -> bool {
        matches!(self, Self::Ll1 | Self::EbnfLl1)
    }
}

impl std::fmt::Display for ChoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Generic => "choice",
            Self::Ebnf => "ebnf",
            Self::Ll1 => "ll1",
            Self::LlStar => "ll*",
            Self::EbnfLl1 => "ebnf-ll1",
            Self::EbnfLlStar => "ebnf-ll*",
        };
        f.write_str(name)
    }
}

/// EBNF operator wrapping a subrule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EbnfKind {
    /// `(...)?`
    Optional,
    /// `(...)*`
    Closure,
    /// `(...)+`
    PositiveClosure,
}

impl std::fmt::Display for EbnfKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optional => f.write_str("?"),
            Self::Closure => f.write_str("*"),
            Self::PositiveClosure => f.write_str("+"),
        }
    }
}

/// A decision point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Choice {
    pub kind: ChoiceKind,
    pub decision: Option<usize>,
    pub ebnf: Option<EbnfKind>,
    pub alts: Vec<CodeBlockForAlt>,
    /// One lookahead test per alternative, for LL(1) kinds only.
    pub alt_tests: Vec<Vec<SrcOp>>,
    /// Operations emitted before the decision.
    pub preamble: Vec<SrcOp>,
}

impl Choice {
    pub fn new(kind: ChoiceKind, decision: Option<usize>, alts: Vec<CodeBlockForAlt>) -> Self {
        Self {
            kind,
            decision,
            ebnf: None,
            alts,
            alt_tests: Vec::new(),
            preamble: Vec::new(),
        }
    }

    pub fn with_ebnf(mut self, ebnf: Option<EbnfKind>) -> Self {
        self.ebnf = ebnf;
        self
    }

    pub fn with_tests(mut self, tests: Vec<Vec<SrcOp>>) -> Self {
        self.alt_tests = tests;
        self
    }
}
