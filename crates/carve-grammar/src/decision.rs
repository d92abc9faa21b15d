//! Decision classifications supplied by grammar analysis.
//!
//! Analysis is not performed here: callers state which strategy each decision
//! needs and, for LL(1), the lookahead set of every alternative.

use carve_model::ChoiceKind;

use crate::lookahead::LookaheadSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionStrategy {
    /// No classification beyond "this is a choice".
    Generic,
    /// One token of lookahead separates the alternatives.
    Ll1,
    /// Arbitrary lookahead.
    LlStar,
}

impl DecisionStrategy {
    /// Choice variant for a plain block or an EBNF block.
    pub fn choice_kind(self, ebnf: bool) -> ChoiceKind {
        match (self, ebnf) {
            (Self::Generic, false) => ChoiceKind::Generic,
            (Self::Generic, true) => ChoiceKind::Ebnf,
            (Self::Ll1, false) => ChoiceKind::Ll1,
            (Self::Ll1, true) => ChoiceKind::EbnfLl1,
            (Self::LlStar, false) => ChoiceKind::LlStar,
            (Self::LlStar, true) => ChoiceKind::EbnfLlStar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionInfo {
    pub strategy: DecisionStrategy,
    /// One set per alternative, in alternative order. LL(1) only.
    pub lookahead: Vec<LookaheadSet>,
}

impl DecisionInfo {
    pub fn generic() -> Self {
        Self {
            strategy: DecisionStrategy::Generic,
            lookahead: Vec::new(),
        }
    }

    pub fn ll1(lookahead: Vec<LookaheadSet>) -> Self {
        Self {
            strategy: DecisionStrategy::Ll1,
            lookahead,
        }
    }

    pub fn ll_star() -> Self {
        Self {
            strategy: DecisionStrategy::LlStar,
            lookahead: Vec::new(),
        }
    }
}
