//! [`SourceSet`]: an immutable, unordered, hashable bundle of bindings that
//! were jointly required (a conjunction) to produce another binding.
//!
//! The same shape - a frozen set of `BindingId`s - is reused by the solver
//! as its goal set, since a "goal" is just "a binding we are trying to
//! prove reachable" and goal sets need exactly the same value semantics
//! (hash/equality by content, deterministic iteration order).

use crate::ids::BindingId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceSet(Vec<BindingId>);

impl SourceSet {
    pub fn empty() -> Self {
        SourceSet(Vec::new())
    }

    /// Freezes a collection of bindings into canonical (sorted, deduped)
    /// form. Canonicalizing on construction is what gives two source sets
    /// built from the same bindings, in any order, equal hash/equality -
    /// the "interned implicitly by set semantics" behavior the data model
    /// calls for.
    pub fn new(bindings: impl IntoIterator<Item = BindingId>) -> Self {
        let mut items: Vec<BindingId> = bindings.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        SourceSet(items)
    }

    pub fn singleton(binding: BindingId) -> Self {
        SourceSet(vec![binding])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, binding: BindingId) -> bool {
        self.0.binary_search(&binding).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = BindingId> + '_ {
        self.0.iter().copied()
    }

    /// Returns a new set containing every binding in `self` or `other`.
    pub fn union(&self, other: &SourceSet) -> SourceSet {
        SourceSet::new(self.0.iter().copied().chain(other.0.iter().copied()))
    }

    /// Returns a new set with `binding` inserted.
    pub fn with(&self, binding: BindingId) -> SourceSet {
        SourceSet::new(self.0.iter().copied().chain(std::iter::once(binding)))
    }

    /// Returns a new set with `binding` removed, if present.
    pub fn without(&self, binding: BindingId) -> SourceSet {
        SourceSet(self.0.iter().copied().filter(|b| *b != binding).collect())
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{b}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<BindingId> for SourceSet {
    fn from_iter<T: IntoIterator<Item = BindingId>>(iter: T) -> Self {
        SourceSet::new(iter)
    }
}
