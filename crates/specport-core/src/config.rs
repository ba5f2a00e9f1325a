use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, TransformResult};

/// Nesting bound used when no options are given
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Conversion options threaded to every rule through the transformation
/// context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Follow rspec-rails conventions, e.g. `type:` metadata on describe blocks
    pub rails: bool,
    /// Translate mocha stubs and expectations to rspec-mocks
    pub mocha: bool,
    /// Reject class names written in module shorthand (`class A::BTest`)
    /// instead of flattening them
    pub strict_names: bool,
    /// Maximum nesting depth of the input tree
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            rails: false,
            mocha: false,
            strict_names: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rails(mut self, enabled: bool) -> Self {
        self.rails = enabled;
        self
    }

    pub fn mocha(mut self, enabled: bool) -> Self {
        self.mocha = enabled;
        self
    }

    pub fn strict_names(mut self, enabled: bool) -> Self {
        self.strict_names = enabled;
        self
    }

    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(options)
    }

    pub fn from_json(content: &str) -> TransformResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ConvertError::InvalidOptions(e.to_string()))
    }
}
