//! # taskgraph: Random Operator Graphs for Compositional Cognitive Tasks
//!
//! Builds random, depth- and size-bounded DAGs of task operators (attribute
//! lookups, existence and comparison tests, conjunctions, selections) and
//! composes them under `Switch` nodes into larger task specifications with
//! globally consistent node ids.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog ──> sampler ──> builder ──(per subtask)──> compose ──> export
//!  (static)   (children)   (DAG, ids)               (switch)    (labels, adjacency)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskgraph::{Catalog, GeneratorConfig, OpKind, TaskGenerator};
//!
//! # fn example() -> taskgraph::Result<()> {
//! let catalog = Arc::new(Catalog::standard()?);
//! let mut generator = TaskGenerator::seeded(catalog, GeneratorConfig::default(), 42)?;
//!
//! let do_if = generator.subtask(OpKind::GetLoc)?;
//! let do_else = generator.random_subtask()?;
//! let condition = generator.boolean_subtask()?;
//! let task = generator.switch(&condition, &do_if, &do_else)?;
//!
//! let exported = taskgraph::serialize(&task);
//! println!("{}", exported.labels_document()?);
//! # Ok(())
//! # }
//! ```
//!
//! Rendering stimuli, computing answers and laying datasets out on disk are
//! left to the consumers of [`SerializedGraph`].

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod catalog;
pub mod sampler;
pub mod builder;
pub mod compose;
pub mod export;
pub mod config;
pub mod episode;
pub mod batch;
pub mod logger;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Attribute, GraphNode, NodeId, OpKind, OperatorGraph, TaskGraph};
pub use catalog::{Catalog, OpSpec};
pub use sampler::{Budget, SelectionScope, sample_children};
pub use builder::{Limits, build};
pub use compose::compose_switch;
pub use export::{SerializedGraph, serialize};
pub use config::GeneratorConfig;
pub use episode::Episode;
pub use batch::generate_batch;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Top-level generator handle
// ============================================================================

/// The primary entry point. Owns a random source and the next free node id,
/// so successive subtasks and compositions never collide.
pub struct TaskGenerator<R: Rng = StdRng> {
    catalog: Arc<Catalog>,
    config: GeneratorConfig,
    rng: R,
    next_id: NodeId,
}

impl TaskGenerator<StdRng> {
    /// Generator with a reproducible seed.
    pub fn seeded(catalog: Arc<Catalog>, config: GeneratorConfig, seed: u64) -> Result<Self> {
        Self::with_rng(catalog, config, StdRng::seed_from_u64(seed))
    }

    /// Generator built entirely from `config`: catalog choice and seed.
    /// Without a seed the random source is seeded from the OS.
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        let catalog = Arc::new(config.catalog()?);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(catalog, config, rng)
    }
}

impl<R: Rng> TaskGenerator<R> {
    pub fn with_rng(catalog: Arc<Catalog>, config: GeneratorConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            rng,
            next_id: NodeId(0),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Id the next generated node will receive.
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    /// Restart numbering, e.g. at the beginning of a new example.
    pub fn reset_ids(&mut self, start: NodeId) {
        self.next_id = start;
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Build a subtask rooted at `root`.
    pub fn subtask(&mut self, root: OpKind) -> Result<TaskGraph> {
        let task = build(
            &self.catalog,
            root,
            self.next_id,
            self.config.limits(),
            self.config.scope(),
            &mut self.rng,
        )?;
        self.advance(&task);
        Ok(task)
    }

    /// Build a subtask rooted at a random catalog root kind.
    pub fn random_subtask(&mut self) -> Result<TaskGraph> {
        let root = self.pick_root(false)?;
        self.subtask(root)
    }

    /// Build a subtask rooted at a random boolean kind, usable as a condition.
    pub fn boolean_subtask(&mut self) -> Result<TaskGraph> {
        let root = self.pick_root(true)?;
        self.subtask(root)
    }

    /// Compose a switch over already generated graphs.
    pub fn switch(
        &mut self,
        condition: &TaskGraph,
        do_if: &TaskGraph,
        do_else: &TaskGraph,
    ) -> Result<TaskGraph> {
        let task = compose_switch(condition, do_if, do_else)?;
        self.advance(&task);
        Ok(task)
    }

    fn pick_root(&mut self, boolean: bool) -> Result<OpKind> {
        let roots = if boolean {
            self.catalog.boolean_roots()
        } else {
            self.catalog.roots()
        };
        if roots.is_empty() {
            return Err(Error::CatalogError(format!(
                "catalog has no {}root kinds",
                if boolean { "boolean " } else { "" }
            )));
        }
        Ok(roots[self.rng.random_range(0..roots.len())])
    }

    fn advance(&mut self, task: &TaskGraph) {
        if task.next_id() > self.next_id {
            self.next_id = task.next_id();
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {0} cannot be generated, only composed")]
    NotGeneratable(OpKind),

    #[error("Id collision: node {0} appears in more than one operand")]
    IdCollision(NodeId),

    #[error("Empty operand: {0} graph has no root")]
    EmptyOperand(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
