//! Traversal state for one construction job.
//!
//! Owned by the model factory and reached through the controller. Nothing here
//! outlives the job.

use carve_model::{RecognizerFile, RecognizerKind, RuleFunction};

use crate::Error;

/// The file under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInfo {
    pub file_name: String,
    pub kind: RecognizerKind,
}

/// The alternative whose elements are being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub rule: String,
    /// 1-based position within its block.
    pub alt_num: usize,
    /// Names referenced as `$name` from the alternative's actions.
    pub attribute_refs: Vec<String>,
}

impl Alternative {
    pub fn refers_to(&self, name: &str) -> bool {
        self.attribute_refs.iter().any(|r| r == name)
    }
}

/// A code block the walker has entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlockRef {
    /// Nesting depth; the outermost block is level 0.
    pub level: usize,
    /// Rewrite tree level at the time the block was entered.
    pub tree_level: usize,
    pub decision: Option<usize>,
}

#[derive(Debug, Default)]
pub struct TraversalContext {
    root: Option<RootInfo>,
    rules: Vec<RuleFunction>,
    current_alt: Option<Alternative>,
    blocks: Vec<CodeBlockRef>,
    tree_level: usize,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_root(&mut self, file: &RecognizerFile) {
        self.root = Some(RootInfo {
            file_name: file.file_name.clone(),
            kind: file.kind(),
        });
    }

    pub fn root(&self) -> Option<&RootInfo> {
        self.root.as_ref()
    }

    pub fn push_rule(&mut self, function: RuleFunction) {
        self.rules.push(function);
    }

    pub fn pop_rule(&mut self) -> Result<RuleFunction, Error> {
        self.rules.pop().ok_or(Error::RuleStackEmpty)
    }

    pub fn current_rule(&self) -> Option<&RuleFunction> {
        self.rules.last()
    }

    pub fn current_rule_mut(&mut self) -> Result<&mut RuleFunction, Error> {
        self.rules.last_mut().ok_or(Error::RuleStackEmpty)
    }

    pub fn rule_depth(&self) -> usize {
        self.rules.len()
    }

    pub fn set_current_alt(&mut self, alt: Option<Alternative>) {
        self.current_alt = alt;
    }

    pub fn current_alt(&self) -> Option<&Alternative> {
        self.current_alt.as_ref()
    }

    /// Replace the innermost block, or enter it if none is open.
    pub fn set_current_block(&mut self, block: CodeBlockRef) {
        match self.blocks.last_mut() {
            Some(top) => *top = block,
            None => self.blocks.push(block),
        }
    }

    pub fn current_block(&self) -> Option<&CodeBlockRef> {
        self.blocks.last()
    }

    pub fn push_block(&mut self, decision: Option<usize>) -> CodeBlockRef {
        let block = CodeBlockRef {
            level: self.blocks.len(),
            tree_level: self.tree_level,
            decision,
        };
        self.blocks.push(block);
        block
    }

    pub fn pop_block(&mut self) -> Option<CodeBlockRef> {
        self.blocks.pop()
    }

    /// Level of the innermost open block, 0 outside any block.
    pub fn code_block_level(&self) -> usize {
        self.current_block().map_or(0, |b| b.level)
    }

    pub fn tree_level(&self) -> usize {
        self.tree_level
    }

    pub fn enter_tree(&mut self) -> usize {
        self.tree_level += 1;
        self.tree_level
    }

    pub fn exit_tree(&mut self) -> usize {
        self.tree_level = self.tree_level.saturating_sub(1);
        self.tree_level
    }

    /// Clear per-rule state. The rule stack and root are kept.
    pub fn reset_rule_state(&mut self) {
        self.current_alt = None;
        self.blocks.clear();
        self.tree_level = 0;
    }
}
