//! # Operator Graph Model
//!
//! Plain data shared by every stage: sampler, builder, composer, exporter.
//! No randomness and no I/O live here.

pub mod node;
pub mod op;
pub mod graph;

pub use node::{GraphNode, NodeId};
pub use op::{Attribute, OpKind};
pub use graph::{OperatorGraph, TaskGraph};
