//! # Branch Sampler
//!
//! Chooses the child kinds of a node. Three pieces of state drive it, all
//! passed by value:
//!
//! - [`Budget`]: current depth and node count against their soft limits.
//!   Once either is spent, generic draws switch from uniform to the
//!   catalog's fallback distribution, which favours short completions.
//! - [`SelectionScope`]: the attribute lookups still available to a
//!   selection node, and whether an `Exist` ancestor requires one to be bound.
//! - The random source.
//!
//! Pool exhaustion inside a selection never fails; the slot becomes `Nil`.

use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::catalog::{Catalog, OpSpec};
use crate::model::{Attribute, OpKind};
use crate::{Error, Result};

/// Probability that an optional selection slot stays empty.
pub const NONE_PROBABILITY: f64 = 0.8;

/// Sampled child kinds, one per slot. `Nil` marks an empty slot.
pub type Children = SmallVec<[OpKind; 4]>;

// ============================================================================
// Budget
// ============================================================================

/// Recursion budget for one node.
///
/// `depth` and `count` describe the node being expanded; the root sits at
/// depth 1 with count 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub depth: usize,
    pub count: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Budget {
    pub fn root(max_nodes: usize, max_depth: usize) -> Self {
        Self {
            depth: 1,
            count: 1,
            max_depth,
            max_nodes,
        }
    }

    /// True once expanding one more level or one more node would overrun a limit.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.depth + 1 > self.max_depth || self.count + 1 > self.max_nodes
    }

    /// Budget for a child one level down, carrying the parent's running count.
    #[inline]
    pub fn descend(self, count: usize) -> Self {
        Self {
            depth: self.depth + 1,
            count,
            ..self
        }
    }
}

// ============================================================================
// Selection scope
// ============================================================================

/// Attribute-binding state threaded down the recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionScope {
    pool: SmallVec<[Attribute; 4]>,
    mandatory: bool,
    optional: bool,
}

impl Default for SelectionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionScope {
    /// Full attribute pool, optional bindings allowed.
    pub fn new() -> Self {
        Self::with_pool(Attribute::ALL)
    }

    /// Full attribute pool; selections bind only when an `Exist` demands it.
    pub fn limited() -> Self {
        Self {
            optional: false,
            ..Self::new()
        }
    }

    pub fn with_pool(pool: impl IntoIterator<Item = Attribute>) -> Self {
        let mut attrs: SmallVec<[Attribute; 4]> = SmallVec::new();
        for attr in pool {
            if !attrs.contains(&attr) {
                attrs.push(attr);
            }
        }
        Self {
            pool: attrs,
            mandatory: false,
            optional: true,
        }
    }

    /// Same scope, but the next selection must bind an attribute.
    pub fn require_binding(self) -> Self {
        Self {
            mandatory: true,
            ..self
        }
    }

    /// Scope handed below a selection that bound at least one attribute.
    pub fn bound(&self) -> Self {
        Self {
            pool: SmallVec::new(),
            mandatory: false,
            optional: self.optional,
        }
    }

    pub fn pool(&self) -> &[Attribute] {
        &self.pool
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn allows_optional(&self) -> bool {
        self.optional
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Sample the child kinds for a node of `kind`.
///
/// The result always has exactly `arity` entries; empty optional slots are
/// `Nil`.
pub fn sample_children<R: Rng + ?Sized>(
    catalog: &Catalog,
    kind: OpKind,
    budget: Budget,
    scope: &SelectionScope,
    rng: &mut R,
) -> Result<Children> {
    let spec = catalog.get(kind)?;

    let children: Children = if spec.arity == 0 {
        Children::new()
    } else if kind == OpKind::Select {
        sample_selection(spec.arity, budget, scope, rng)
    } else if spec.same_children_kind {
        let child = sample_one(kind, spec, budget, rng)?;
        smallvec![child; spec.arity]
    } else {
        (0..spec.arity)
            .map(|_| sample_one(kind, spec, budget, rng))
            .collect::<Result<Children>>()?
    };

    trace!(%kind, ?children, exhausted = budget.is_exhausted(), "sampled children");
    Ok(children)
}

/// One draw from `spec.downstream`: uniform while budget remains, fallback
/// distribution once it is spent.
fn sample_one<R: Rng + ?Sized>(
    kind: OpKind,
    spec: &OpSpec,
    budget: Budget,
    rng: &mut R,
) -> Result<OpKind> {
    if spec.downstream.is_empty() {
        return Err(Error::NotGeneratable(kind));
    }

    if budget.is_exhausted() {
        let dist = WeightedIndex::new(spec.fallback.iter().copied())
            .map_err(|e| Error::CatalogError(format!("{kind}: {e}")))?;
        Ok(spec.downstream[rng.sample(&dist)])
    } else {
        Ok(spec.downstream[rng.random_range(0..spec.downstream.len())])
    }
}

fn sample_selection<R: Rng + ?Sized>(
    arity: usize,
    budget: Budget,
    scope: &SelectionScope,
    rng: &mut R,
) -> Children {
    let mut pool = scope.pool.clone();
    let mut slots = Children::with_capacity(arity);

    if scope.mandatory {
        if !pool.is_empty() {
            let forced = pool.remove(rng.random_range(0..pool.len()));
            slots.push(forced.lookup());
        }
    } else if budget.is_exhausted() {
        return smallvec![OpKind::Nil; arity];
    }

    while slots.len() < arity {
        let keep_empty = rng.random::<f64>() < NONE_PROBABILITY;
        if keep_empty || !scope.optional || pool.is_empty() {
            slots.push(OpKind::Nil);
        } else {
            let attr = pool.remove(rng.random_range(0..pool.len()));
            slots.push(attr.lookup());
        }
    }

    slots
}
