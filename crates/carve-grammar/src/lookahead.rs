//! Lookahead token sets supplied by grammar analysis.

use crate::vocabulary::Vocabulary;

/// Sorted, duplicate-free set of token types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LookaheadSet {
    ttypes: Vec<i32>,
}

impl LookaheadSet {
    pub fn new(ttypes: impl IntoIterator<Item = i32>) -> Self {
        let mut ttypes: Vec<i32> = ttypes.into_iter().collect();
        ttypes.sort_unstable();
        ttypes.dedup();
        Self { ttypes }
    }

    /// Resolve display names against a vocabulary. `None` if any name is unknown.
    pub fn from_names(vocab: &Vocabulary, names: &[&str]) -> Option<Self> {
        let ttypes = names
            .iter()
            .map(|name| vocab.ttype(name))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(ttypes))
    }

    pub fn ttypes(&self) -> &[i32] {
        &self.ttypes
    }

    pub fn len(&self) -> usize {
        self.ttypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ttypes.is_empty()
    }

    /// Display names in type order. Unknown types render as their number.
    pub fn token_names(&self, vocab: &Vocabulary) -> Vec<String> {
        self.ttypes
            .iter()
            .map(|&t| {
                vocab
                    .display_name(t)
                    .map_or_else(|| t.to_string(), str::to_string)
            })
            .collect()
    }
}
