use std::collections::BTreeSet;

use itertools::Itertools;

/// Hash map with the fast, non-cryptographic hasher from `fxhash`.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// One-to-one correspondence between `L` and `R`, ordered on both sides.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A partition of elements of type `I` into disjoint, non-empty classes.
///
/// Classes are stored in a normal form: each class is sorted, and the classes are ordered by
/// their smallest element. Two partitions are therefore equal exactly when they group the
/// same elements together, no matter in which order the classes were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<I: Ord> {
    classes: Vec<BTreeSet<I>>,
}

impl<I: Ord> Partition<I> {
    /// Builds a partition from an iterator that yields the classes. Empty classes are dropped.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        let mut classes: Vec<BTreeSet<I>> = iter
            .into_iter()
            .map(|class| class.into_iter().collect::<BTreeSet<_>>())
            .filter(|class| !class.is_empty())
            .collect();
        classes.sort_unstable_by(|left, right| left.first().cmp(&right.first()));
        Self { classes }
    }

    /// Returns the number of classes.
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// Iterates over the classes, ordered by their smallest element.
    pub fn classes(&self) -> impl Iterator<Item = &BTreeSet<I>> + '_ {
        self.classes.iter()
    }

    /// Returns the position of the class that contains `element`, if any.
    pub fn class_of(&self, element: &I) -> Option<usize> {
        self.classes.iter().position(|class| class.contains(element))
    }

    /// Returns `true` if `left` and `right` are in the same class.
    pub fn related(&self, left: &I, right: &I) -> bool {
        matches!((self.class_of(left), self.class_of(right)), (Some(l), Some(r)) if l == r)
    }
}

impl<I: Ord + std::fmt::Display> std::fmt::Display for Partition<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.classes()
                .map(|class| format!("{{{}}}", class.iter().join(", ")))
                .join(" ")
        )
    }
}
