//! Partial reordering of stored collections.
//!
//! A client usually submits an ordering for only the items it currently
//! displays (for example after a search filter). The stored collection may
//! be larger. Reordering therefore never rebuilds the collection from the
//! submitted IDs: it rewrites the `order` field of the submitted items in
//! place and leaves everything else alone, so the item count and identity
//! set are preserved by construction.

use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Ordered items
// ---------------------------------------------------------------------------

/// An item in a collection whose presentation position is an `order` field.
pub trait Ordered {
    /// Identifier, unique within the containing collection.
    fn id(&self) -> &str;

    /// Current presentation hint.
    fn order(&self) -> i64;

    fn set_order(&mut self, order: i64);
}

/// Counters describing what a reorder request touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderSummary {
    /// Stored items that received a new `order`.
    pub reordered: usize,
    /// Requested IDs that matched no stored item.
    pub ignored: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Apply a client ordering of a subset of `items`.
///
/// - Each item whose ID appears in `ids` gets `order` = its zero-based index
///   in `ids`. If an ID is repeated, its last position wins.
/// - Items absent from `ids` keep their previous `order`.
/// - IDs that match nothing are ignored.
///
/// The slice is never resized, so no item can be lost.
pub fn apply_partial_order<T: Ordered>(items: &mut [T], ids: &[String]) -> ReorderSummary {
    let targets: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(position, id)| (id.as_str(), position))
        .collect();

    let ignored = {
        let stored: HashSet<&str> = items.iter().map(|item| item.id()).collect();
        targets.keys().filter(|id| !stored.contains(*id)).count()
    };

    let mut reordered = 0;
    for item in items.iter_mut() {
        let position = targets.get(item.id()).copied();
        if let Some(position) = position {
            item.set_order(position as i64);
            reordered += 1;
        }
    }

    ReorderSummary { reordered, ignored }
}

/// Stable sort by `order`; equal values keep their stored relative position.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
}

/// The `order` a newly appended item should receive: one past the current
/// maximum, or `0` for an empty collection.
pub fn next_order<T: Ordered>(items: &[T]) -> i64 {
    items
        .iter()
        .map(|item| item.order())
        .max()
        .map_or(0, |max| max + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
