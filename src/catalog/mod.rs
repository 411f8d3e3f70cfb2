//! # Operator Catalog
//!
//! Static registry of operator kinds: arity, permissible child kinds, the
//! fallback sampling distribution used once a budget is spent, and whether
//! all children must share one kind.
//!
//! A `Catalog` is validated once when it is constructed and is never mutated
//! afterwards; share it as `Arc<Catalog>`.
//!
//! | Catalog | Constructor | Operators |
//! |---------|-------------|-----------|
//! | Standard | [`Catalog::standard`] | lookups, Exist, IsSame, And, Select, Switch |
//! | Extended | [`Catalog::extended`] | standard + NotSame, Or, Xor |

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{Attribute, OpKind};
use crate::{Error, Result};

// ============================================================================
// Operator entry
// ============================================================================

/// Catalog entry for a single operator kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpSpec {
    pub arity: usize,
    /// Permissible child kinds, in sampling order.
    pub downstream: SmallVec<[OpKind; 6]>,
    /// One weight per `downstream` entry; only consulted once a budget is spent.
    pub fallback: SmallVec<[f64; 6]>,
    pub same_children_kind: bool,
}

impl OpSpec {
    pub fn terminal() -> Self {
        Self {
            arity: 0,
            downstream: SmallVec::new(),
            fallback: SmallVec::new(),
            same_children_kind: false,
        }
    }

    pub fn new(
        arity: usize,
        downstream: impl IntoIterator<Item = OpKind>,
        fallback: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            arity,
            downstream: downstream.into_iter().collect(),
            fallback: fallback.into_iter().collect(),
            same_children_kind: false,
        }
    }

    /// Entry for a kind only the composer creates; it has no downstream.
    pub fn composite(arity: usize) -> Self {
        Self {
            arity,
            ..Self::terminal()
        }
    }

    pub fn with_same_children_kind(mut self) -> Self {
        self.same_children_kind = true;
        self
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable, validated operator registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    specs: HashMap<OpKind, OpSpec>,
    roots: Vec<OpKind>,
    boolean_roots: Vec<OpKind>,
}

const LOOKUPS: [OpKind; 4] = [
    OpKind::GetCategory,
    OpKind::GetLoc,
    OpKind::GetViewAngle,
    OpKind::GetObject,
];

impl Catalog {
    /// Build and validate a catalog from explicit entries.
    pub fn from_specs(
        specs: impl IntoIterator<Item = (OpKind, OpSpec)>,
        roots: Vec<OpKind>,
        boolean_roots: Vec<OpKind>,
    ) -> Result<Self> {
        let mut map = HashMap::new();
        for (kind, spec) in specs {
            if map.insert(kind, spec).is_some() {
                return Err(Error::CatalogError(format!("duplicate entry for {kind}")));
            }
        }
        let catalog = Self {
            specs: map,
            roots,
            boolean_roots,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The core operator set.
    pub fn standard() -> Result<Self> {
        let mut specs = Self::shared_entries();
        specs.push((
            OpKind::And,
            OpSpec::new(
                2,
                [OpKind::Exist, OpKind::IsSame, OpKind::And],
                [0.5, 0.5, 0.0],
            ),
        ));
        Self::from_specs(
            specs,
            vec![
                OpKind::GetCategory,
                OpKind::GetLoc,
                OpKind::GetViewAngle,
                OpKind::GetObject,
                OpKind::Exist,
                OpKind::IsSame,
                OpKind::And,
            ],
            vec![OpKind::Exist, OpKind::IsSame, OpKind::And],
        )
    }

    /// Standard operators plus `NotSame`, `Or` and `Xor`.
    pub fn extended() -> Result<Self> {
        const BOOLEAN: [OpKind; 6] = [
            OpKind::Exist,
            OpKind::IsSame,
            OpKind::NotSame,
            OpKind::And,
            OpKind::Or,
            OpKind::Xor,
        ];
        const THIRD: f64 = 1.0 / 3.0;

        let mut specs = Self::shared_entries();
        specs.push((
            OpKind::NotSame,
            OpSpec::new(2, LOOKUPS, [0.25; 4]).with_same_children_kind(),
        ));
        for combinator in [OpKind::And, OpKind::Or, OpKind::Xor] {
            specs.push((
                combinator,
                OpSpec::new(2, BOOLEAN, [THIRD, THIRD, THIRD, 0.0, 0.0, 0.0]),
            ));
        }

        let mut roots = LOOKUPS.to_vec();
        roots.extend(BOOLEAN);
        Self::from_specs(specs, roots, BOOLEAN.to_vec())
    }

    /// Entries common to every built-in catalog.
    fn shared_entries() -> Vec<(OpKind, OpSpec)> {
        let mut specs: Vec<(OpKind, OpSpec)> = LOOKUPS
            .iter()
            .map(|&lookup| (lookup, OpSpec::new(1, [OpKind::Select], [1.0])))
            .collect();
        specs.push((OpKind::Exist, OpSpec::new(1, [OpKind::Select], [1.0])));
        specs.push((
            OpKind::IsSame,
            OpSpec::new(2, LOOKUPS, [0.25; 4]).with_same_children_kind(),
        ));
        specs.push((
            OpKind::Select,
            OpSpec::new(
                4,
                LOOKUPS.into_iter().chain([OpKind::Nil]),
                [0.0, 0.0, 0.0, 0.0, 1.0],
            ),
        ));
        specs.push((OpKind::Switch, OpSpec::composite(3)));
        specs.push((OpKind::Nil, OpSpec::terminal()));
        specs
    }

    /// Check the catalog is closed and its distributions are usable.
    fn validate(&self) -> Result<()> {
        let mut kinds: Vec<&OpKind> = self.specs.keys().collect();
        kinds.sort();

        for kind in kinds {
            let spec = &self.specs[kind];

            if spec.downstream.len() != spec.fallback.len() {
                return Err(Error::CatalogError(format!(
                    "{kind}: {} downstream kinds but {} fallback weights",
                    spec.downstream.len(),
                    spec.fallback.len()
                )));
            }
            for child in &spec.downstream {
                if !self.specs.contains_key(child) {
                    return Err(Error::CatalogError(format!(
                        "{kind}: downstream kind {child} has no catalog entry"
                    )));
                }
            }
            if spec.fallback.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(Error::CatalogError(format!(
                    "{kind}: fallback weights must be finite and non-negative"
                )));
            }
            if !spec.downstream.is_empty() && spec.fallback.iter().sum::<f64>() <= 0.0 {
                return Err(Error::CatalogError(format!(
                    "{kind}: fallback weights sum to zero"
                )));
            }
            if kind.is_generatable() && spec.arity > 0 && spec.downstream.is_empty() {
                return Err(Error::CatalogError(format!(
                    "{kind}: arity {} but no downstream kinds",
                    spec.arity
                )));
            }
            if kind.is_nil() && spec.arity != 0 {
                return Err(Error::CatalogError(format!(
                    "{kind} must have arity 0, got {}",
                    spec.arity
                )));
            }
            if *kind == OpKind::Select && spec.arity > Attribute::ALL.len() {
                return Err(Error::CatalogError(format!(
                    "{kind}: arity {} exceeds the number of attributes",
                    spec.arity
                )));
            }
            // selections bind from the full attribute pool, whatever `downstream` says
            if *kind == OpKind::Select && spec.arity > 0 {
                if let Some(missing) = Attribute::ALL
                    .iter()
                    .map(|attr| attr.lookup())
                    .find(|lookup| !self.specs.contains_key(lookup))
                {
                    return Err(Error::CatalogError(format!(
                        "{kind}: can bind {missing}, which has no catalog entry"
                    )));
                }
            }
        }

        for root in self.roots.iter().chain(&self.boolean_roots) {
            if !self.specs.contains_key(root) {
                return Err(Error::CatalogError(format!(
                    "root kind {root} has no catalog entry"
                )));
            }
            if !root.is_generatable() {
                return Err(Error::CatalogError(format!(
                    "root kind {root} cannot be generated"
                )));
            }
        }
        if let Some(kind) = self.boolean_roots.iter().find(|k| !k.is_boolean()) {
            return Err(Error::CatalogError(format!(
                "boolean root kind {kind} does not produce a boolean"
            )));
        }

        Ok(())
    }

    /// Look up an operator entry.
    pub fn get(&self, kind: OpKind) -> Result<&OpSpec> {
        self.specs
            .get(&kind)
            .ok_or_else(|| Error::CatalogError(format!("no catalog entry for {kind}")))
    }

    pub fn contains(&self, kind: OpKind) -> bool {
        self.specs.contains_key(&kind)
    }

    /// Kinds a subtask may be rooted at.
    pub fn roots(&self) -> &[OpKind] {
        &self.roots
    }

    /// Kinds a switch condition may be rooted at.
    pub fn boolean_roots(&self) -> &[OpKind] {
        &self.boolean_roots
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
