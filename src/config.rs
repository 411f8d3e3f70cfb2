//! Generation parameters.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```json
//! { "max_ops": 12, "select_limit": true, "seed": 7 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::Limits;
use crate::catalog::Catalog;
use crate::sampler::SelectionScope;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Soft node-count budget per subtask.
    pub max_ops: usize,
    /// Soft depth budget per subtask.
    pub max_depth: usize,
    /// Bind selection attributes only where an `Exist` requires one.
    pub select_limit: bool,
    /// Include `NotSame`, `Or` and `Xor`.
    pub extended_ops: bool,
    /// Switch attempts per episode.
    pub max_switch: usize,
    /// Probability that an attempt composes a switch.
    pub switch_threshold: f64,
    /// Episodes per batch.
    pub n_tasks: usize,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_ops: 20,
            max_depth: 10,
            select_limit: false,
            extended_ops: false,
            max_switch: 3,
            switch_threshold: 0.5,
            n_tasks: 1,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.as_ref().display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_ops == 0 {
            return Err(Error::ConfigError("max_ops must be at least 1".into()));
        }
        if self.max_depth == 0 {
            return Err(Error::ConfigError("max_depth must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.switch_threshold) {
            return Err(Error::ConfigError(format!(
                "switch_threshold must be within [0, 1], got {}",
                self.switch_threshold
            )));
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits::new(self.max_ops, self.max_depth)
    }

    /// Selection scope every subtask starts from.
    pub fn scope(&self) -> SelectionScope {
        if self.select_limit {
            SelectionScope::limited()
        } else {
            SelectionScope::new()
        }
    }

    /// The operator catalog this configuration asks for.
    pub fn catalog(&self) -> Result<Catalog> {
        if self.extended_ops {
            Catalog::extended()
        } else {
            Catalog::standard()
        }
    }
}
