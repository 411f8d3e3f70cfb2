//! Serialized form of a finished task graph.
//!
//! The task evaluator walks the graph bottom-up: attribute lookups first,
//! then the boolean, comparison and switch nodes that consume them. Export
//! therefore reverses every construction edge, so each id lists the nodes
//! that consume its result.
//!
//! ```text
//! TaskGraph ─ serialize() ─> SerializedGraph
//!                              ├─ labels:    {"0": "Exist", "1": "Select", ...}
//!                              └─ adjacency: {"0": [], "1": [0], ...}
//! ```
//!
//! Ids and labels pass through unchanged; only edge direction flips.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::model::{Attribute, NodeId, OpKind, TaskGraph};
use crate::Result;

/// Evaluator-facing form of a task graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedGraph {
    pub root: Option<NodeId>,
    /// id -> operator label
    pub labels: BTreeMap<NodeId, String>,
    /// id -> ids its reversed edges point to; every node has an entry
    pub adjacency: BTreeMap<NodeId, Vec<NodeId>>,
}

/// Export a task graph with edges reversed for bottom-up evaluation.
pub fn serialize(task: &TaskGraph) -> SerializedGraph {
    let reversed = task.graph.reversed();

    let labels = reversed
        .nodes()
        .map(|node| (node.id, node.kind.label().to_string()))
        .collect();
    let adjacency = reversed
        .ids()
        .map(|id| (id, reversed.children(id)))
        .collect();

    SerializedGraph {
        root: task.root,
        labels,
        adjacency,
    }
}

impl SerializedGraph {
    /// The id -> label document.
    pub fn labels_document(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.labels)?)
    }

    /// The id -> consumer ids document.
    pub fn adjacency_document(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.adjacency)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_labels(&self, writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.labels)?;
        writeln!(writer)?;
        Ok(())
    }

    pub fn write_adjacency(&self, writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.adjacency)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Operator kind for `id`, parsed back from its label. `None` if the id
    /// is not in the graph.
    pub fn kind(&self, id: NodeId) -> Option<OpKind> {
        self.labels.get(&id)?.parse().ok()
    }

    /// Attribute lookups present in the graph; what the stimulus renderer
    /// must instantiate on scene objects.
    pub fn attributes(&self) -> BTreeSet<Attribute> {
        self.labels
            .values()
            .filter_map(|label| label.parse::<OpKind>().ok())
            .filter_map(|kind| kind.attribute())
            .collect()
    }

    /// Nodes that depend on nothing, where bottom-up evaluation starts.
    /// In generated graphs these are the empty selections below each
    /// lookup, not the lookups themselves.
    pub fn leaves(&self) -> Vec<NodeId> {
        let depended_on: BTreeSet<NodeId> = self.adjacency.values().flatten().copied().collect();
        self.labels
            .keys()
            .filter(|id| !depended_on.contains(id))
            .copied()
            .collect()
    }
}
