//! Configuration for a construction job.

use std::sync::Arc;

use carve_grammar::Target;

#[derive(Clone, Debug)]
pub struct Config {
    /// Naming conventions of the language being generated. Required.
    pub(crate) target: Option<Arc<dyn Target>>,
    /// Check that extensions keep the role of every node they touch
    pub(crate) validate_extensions: bool,
    /// Register the automatic tree-building extension
    pub(crate) tree_building: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: None,
            validate_extensions: true,
            tree_building: false,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target language.
    pub fn target(mut self, target: impl Target + 'static) -> Self {
        self.target = Some(Arc::new(target));
        self
    }

    /// Set the target language from a shared handle.
    pub fn shared_target(mut self, target: Arc<dyn Target>) -> Self {
        self.target = Some(target);
        self
    }

    /// Set whether extension output is checked against the builder's node roles.
    pub fn validate_extensions(mut self, value: bool) -> Self {
        self.validate_extensions = value;
        self
    }

    /// Set whether output trees are built automatically.
    pub fn tree_building(mut self, value: bool) -> Self {
        self.tree_building = value;
        self
    }
}
