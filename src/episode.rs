//! Episodes: chains of switch compositions.
//!
//! Each of `max_switch` attempts composes a switch with probability
//! `switch_threshold`. The first switch combines two fresh subtasks; later
//! ones wrap the composite built so far as one branch, picked at random,
//! and a fresh subtask as the other. Conditions are always fresh
//! boolean-rooted subtasks, generated after both branches so the switch id
//! lands just past every id in use.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::model::TaskGraph;
use crate::{Result, TaskGenerator};

/// A generated episode and the number of switches it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub task: TaskGraph,
    pub switches: usize,
}

impl<R: Rng> TaskGenerator<R> {
    /// Generate one episode, continuing from the generator's current id.
    pub fn episode(&mut self) -> Result<Episode> {
        let attempts = self.config().max_switch;
        let threshold = self.config().switch_threshold;

        let mut current: Option<TaskGraph> = None;
        let mut switches = 0;

        for _ in 0..attempts {
            if self.rng_mut().random::<f64>() < threshold {
                let (do_if, do_else) = match current.take() {
                    Some(previous) => {
                        let fresh = self.random_subtask()?;
                        if self.rng_mut().random_bool(0.5) {
                            (previous, fresh)
                        } else {
                            (fresh, previous)
                        }
                    }
                    None => (self.random_subtask()?, self.random_subtask()?),
                };
                let condition = self.boolean_subtask()?;
                current = Some(self.switch(&condition, &do_if, &do_else)?);
                switches += 1;
            } else if current.is_none() {
                current = Some(self.random_subtask()?);
            }
        }

        let task = match current {
            Some(task) => task,
            None => self.random_subtask()?,
        };
        debug!(switches, nodes = task.graph.node_count(), "generated episode");
        Ok(Episode { task, switches })
    }
}
