//! Dependency ordering.
//!
//! Orders a list of items so that every item comes after everything it
//! (transitively) reads. Used to emit attribute initializers in an order where
//! no initializer refers to a field that has not been initialized yet.

use std::{collections::HashSet, hash::Hash};

/// Result of [`dependency_order_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOrder<T> {
    /// Every item appears after all of its dependencies
    Ordered(Vec<T>),

    /// The dependency relation has a cycle. Holds the items that could not be
    /// placed (those on a cycle and those depending on one), in input order.
    Unorderable(Vec<T>),
}

impl<T: Clone> DependencyOrder<T> {
    pub fn is_orderable(&self) -> bool {
        matches!(self, DependencyOrder::Ordered(_))
    }

    /// The ordered items, or `original` when no order exists.
    pub fn or_original(self, original: &[T]) -> Vec<T> {
        match self {
            DependencyOrder::Ordered(items) => items,
            DependencyOrder::Unorderable(_) => original.to_vec(),
        }
    }
}

/// Computes a stable dependency order of `items`.
///
/// `dependencies_of(item)` yields the items that `item` reads; anything not in
/// `items` is ignored. Among items whose dependencies are satisfied, the one
/// earliest in `items` is placed first, so independent items keep their
/// relative order. A cycle, including an item reading itself, makes the whole
/// set [`DependencyOrder::Unorderable`]; cycles are reported, never broken.
///
/// The result is a permutation of `items`: repeated items are placed once per
/// occurrence.
///
/// # Examples
///
/// ```
/// use formgen::dependency::{dependency_order_of, DependencyOrder};
///
/// // "total" reads "price" and "tax"; "tax" reads "price".
/// let deps = |item: &&str| match *item {
///     "total" => vec!["price", "tax"],
///     "tax" => vec!["price"],
///     _ => vec![],
/// };
/// let order = dependency_order_of(&["total", "tax", "price"], deps);
/// assert_eq!(order, DependencyOrder::Ordered(vec!["price", "tax", "total"]));
/// ```
pub fn dependency_order_of<T, F, I>(items: &[T], mut dependencies_of: F) -> DependencyOrder<T>
where
    T: Clone + Eq + Hash,
    F: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    let members: HashSet<&T> = items.iter().collect();
    let dependencies: Vec<Vec<T>> = items
        .iter()
        .map(|item| {
            dependencies_of(item)
                .into_iter()
                .filter(|dependency| members.contains(dependency))
                .collect()
        })
        .collect();

    // Placement is tracked per position so repeated items are all emitted; a
    // dependency is satisfied once any copy of it is placed.
    let mut done = vec![false; items.len()];
    let mut placed: HashSet<&T> = HashSet::with_capacity(items.len());
    let mut ordered = Vec::with_capacity(items.len());

    while ordered.len() < items.len() {
        let next = (0..items.len()).find(|&index| {
            !done[index]
                && dependencies[index]
                    .iter()
                    .all(|dependency| placed.contains(dependency))
        });
        match next {
            Some(index) => {
                done[index] = true;
                placed.insert(&items[index]);
                ordered.push(items[index].clone());
            }
            None => {
                let stuck: Vec<T> = items
                    .iter()
                    .zip(&done)
                    .filter(|(_, done)| !**done)
                    .map(|(item, _)| item.clone())
                    .collect();
                tracing::warn!(stuck = stuck.len(), "dependency relation is cyclic");
                return DependencyOrder::Unorderable(stuck);
            }
        }
    }

    tracing::debug!(items = ordered.len(), "dependency order computed");
    DependencyOrder::Ordered(ordered)
}
