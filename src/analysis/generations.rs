//! Generation and marriage counts for the store summary line.
//!
//! Unlike the tree builder these read the whole store, not one root's
//! neighbourhood. Depth is counted from every person without parents, with a
//! store-wide visited set so shared descendants are counted once and cyclic
//! parent data cannot loop.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::family::{Person, PersonId, PersonStore};

/// Number of generations in the store.
///
/// The deepest parent→child chain reachable from any root (a person without
/// parents), counting the root as generation 1. Returns 0 for an empty store
/// and at least 1 otherwise, even when every person has parents.
pub fn count_generations(store: &PersonStore) -> usize {
    if store.is_empty() {
        return 0;
    }

    let mut visited = HashSet::new();
    let mut max_depth = 0;
    for root in store.iter().filter(|p| p.is_root()) {
        max_depth = max_depth.max(walk_depth(store, root, &mut visited));
    }
    max_depth.max(1)
}

/// Depth-first walk below `root`, pre-order like the tree builder, on an
/// explicit stack so long imported chains cannot exhaust the call stack.
fn walk_depth(store: &PersonStore, root: &Person, visited: &mut HashSet<PersonId>) -> usize {
    let mut max_depth = 0;
    let mut stack: Vec<(&Person, usize)> = vec![(root, 1)];

    while let Some((person, depth)) = stack.pop() {
        if !visited.insert(person.id) {
            continue;
        }
        max_depth = max_depth.max(depth);

        let children: Vec<&Person> = store.children_of(person.id).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    max_depth
}

/// Number of marriages: people with a spouse pointer, halved and floored.
///
/// Spouse pointers are not required to be mutual, so a one-sided pointer
/// counts as half a marriage.
pub fn count_marriages(store: &PersonStore) -> usize {
    store.iter().filter(|p| p.spouse_id.is_some()).count() / 2
}

/// Summary shown next to the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub people: usize,
    pub generations: usize,
    pub marriages: usize,
}

impl TreeStats {
    pub fn collect(store: &PersonStore) -> Self {
        Self {
            people: store.len(),
            generations: count_generations(store),
            marriages: count_marriages(store),
        }
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} people, {} generations, {} marriages",
            self.people, self.generations, self.marriages
        )
    }
}
