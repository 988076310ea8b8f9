//! Generation tree construction from the family store.
//!
//! Walks the store from a root person and produces a hierarchical
//! [`TreeNode`]: children below, parents above, a spouse beside each node.
//!
//! # Cycle safety
//!
//! A single visited-id set is shared by the whole traversal. A person is
//! marked the moment it becomes a node, including when it is attached as
//! someone's spouse, and a marked person is never entered again. That bounds
//! the traversal by the store size no matter how tangled the relationship
//! data is (spouse-of-spouse loops, shared ancestors, parent cycles from
//! imported files), and keeps every person to at most one node.
//!
//! # Generation window
//!
//! Nodes exist only for generations in `-(max_generations - 1) ..=
//! max_generations - 1`. The window applies in every direction and every
//! mode, so ancestors are bounded exactly like descendants.
//!
//! # Recursion depth
//!
//! The builder and the layout engine recurse once per tree level. In
//! `ancestors` and `descendants` mode that is at most `max_generations`
//! frames. `full` mode can zigzag (child, its other parent, that parent's
//! child...) so depth is bounded only by the people reached, which is fine
//! for hand-edited families but not for arbitrarily large imports.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::family::{Person, PersonId, PersonStore};

/// Direction of the traversal from the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    /// Parents, grandparents, ... of the root.
    Ancestors,
    /// Children, grandchildren, ... of the root and its spouse.
    #[default]
    Descendants,
    /// Both directions from every node.
    Full,
}

impl TreeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TreeMode::Ancestors => "ancestors",
            TreeMode::Descendants => "descendants",
            TreeMode::Full => "full",
        }
    }

    #[inline]
    pub fn includes_descendants(self) -> bool {
        matches!(self, TreeMode::Descendants | TreeMode::Full)
    }

    #[inline]
    pub fn includes_ancestors(self) -> bool {
        matches!(self, TreeMode::Ancestors | TreeMode::Full)
    }
}

impl FromStr for TreeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ancestors" => Ok(TreeMode::Ancestors),
            "descendants" => Ok(TreeMode::Descendants),
            "full" => Ok(TreeMode::Full),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// A person placed in the generation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub person: Person,
    /// Offset from the root: 0 = root, +1 = child, -1 = parent.
    pub generation: i32,
    pub children: Vec<TreeNode>,
    pub parents: Vec<TreeNode>,
    /// Spouse shown beside this node. Never expanded further.
    pub spouse: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(person: Person, generation: i32) -> Self {
        Self {
            person,
            generation,
            children: Vec::new(),
            parents: Vec::new(),
            spouse: None,
        }
    }

    #[inline]
    pub fn id(&self) -> PersonId {
        self.person.id
    }

    /// Number of nodes in this subtree, spouses included.
    pub fn len(&self) -> usize {
        1 + self.spouse.as_ref().map_or(0, |s| s.len())
            + self.children.iter().map(TreeNode::len).sum::<usize>()
            + self.parents.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Person ids in placement order: node, spouse, children, parents.
    pub fn person_ids(&self) -> Vec<PersonId> {
        let mut ids = Vec::with_capacity(self.len());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<PersonId>) {
        ids.push(self.id());
        if let Some(spouse) = &self.spouse {
            spouse.collect_ids(ids);
        }
        for child in &self.children {
            child.collect_ids(ids);
        }
        for parent in &self.parents {
            parent.collect_ids(ids);
        }
    }
}

/// Builds generation trees from a store.
pub struct TreeBuilder<'a> {
    store: &'a PersonStore,
    mode: TreeMode,
    max_generations: u32,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder. `max_generations` counts the root's generation, so
    /// 1 yields the root (and spouse) only.
    pub fn new(store: &'a PersonStore, mode: TreeMode, max_generations: u32) -> Result<Self> {
        if max_generations == 0 {
            return Err(Error::InvalidGenerationBound(max_generations));
        }
        Ok(Self {
            store,
            mode,
            max_generations,
        })
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    /// Build the tree rooted at `root`. Returns `None` if the root is not in
    /// the store.
    pub fn build(&self, root: PersonId) -> Option<TreeNode> {
        let Some(person) = self.store.find_by_id(root) else {
            tracing::debug!(%root, "root not in store");
            return None;
        };

        let mut visited = HashSet::new();
        let tree = self.build_node(person, 0, &mut visited);

        tracing::debug!(
            %root,
            mode = self.mode.as_str(),
            max_generations = self.max_generations,
            nodes = visited.len(),
            "family tree built"
        );
        tree
    }

    #[inline]
    fn in_window(&self, generation: i32) -> bool {
        generation.unsigned_abs() < self.max_generations
    }

    fn build_node(
        &self,
        person: &Person,
        generation: i32,
        visited: &mut HashSet<PersonId>,
    ) -> Option<TreeNode> {
        if !self.in_window(generation) {
            return None;
        }
        // Cycle and duplicate guard: mark at first sight
        if !visited.insert(person.id) {
            tracing::trace!(id = %person.id, generation, "pruned revisit");
            return None;
        }

        let mut node = TreeNode::leaf(person.clone(), generation);

        if let Some(spouse) = person.spouse_id.and_then(|sid| self.store.find_by_id(sid)) {
            if visited.insert(spouse.id) {
                node.spouse = Some(Box::new(TreeNode::leaf(spouse.clone(), generation)));
            }
        }

        if self.mode.includes_descendants() {
            let spouse_id = node.spouse.as_ref().map(|s| s.id());
            node.children = self
                .store
                .children_of_couple(person.id, spouse_id)
                .filter_map(|child| self.build_node(child, generation + 1, visited))
                .collect();
        }

        if self.mode.includes_ancestors() {
            node.parents = person
                .parent_ids
                .iter()
                .filter_map(|&pid| self.store.find_by_id(pid))
                .filter_map(|parent| self.build_node(parent, generation - 1, visited))
                .collect();
        }

        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::PersonDraft;
    use pretty_assertions::assert_eq;

    fn person(id: u64, parents: &[u64], spouse: Option<u64>) -> Person {
        Person {
            parent_ids: parents.iter().copied().map(PersonId).collect(),
            spouse_id: spouse.map(PersonId),
            ..Person::from_draft(PersonId(id), PersonDraft::named(format!("P{id}")))
        }
    }

    fn store_of(people: Vec<Person>) -> PersonStore {
        let mut store = PersonStore::new();
        store.replace_all(people).unwrap();
        store
    }

    fn raw_ids(tree: &TreeNode) -> Vec<u64> {
        tree.person_ids().into_iter().map(PersonId::raw).collect()
    }

    /// Root 1 with children 2, 3; each child has two children.
    fn three_generations() -> PersonStore {
        store_of(vec![
            person(1, &[], None),
            person(2, &[1], None),
            person(3, &[1], None),
            person(4, &[2], None),
            person(5, &[2], None),
            person(6, &[3], None),
            person(7, &[3], None),
        ])
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("ancestors".parse::<TreeMode>().unwrap(), TreeMode::Ancestors);
        assert_eq!(" Full ".parse::<TreeMode>().unwrap(), TreeMode::Full);
        assert_eq!(TreeMode::Descendants.as_str(), "descendants");
        assert!(matches!(
            "cousins".parse::<TreeMode>(),
            Err(Error::InvalidMode(m)) if m == "cousins"
        ));
    }

    #[test]
    fn test_zero_generation_bound_rejected() {
        let store = PersonStore::new();
        assert!(matches!(
            TreeBuilder::new(&store, TreeMode::Full, 0),
            Err(Error::InvalidGenerationBound(0))
        ));
    }

    #[test]
    fn test_missing_root() {
        let store = three_generations();
        let builder = TreeBuilder::new(&store, TreeMode::Full, 3).unwrap();
        assert!(builder.build(PersonId(42)).is_none());
    }

    #[test]
    fn test_lone_person() {
        let store = store_of(vec![person(1, &[], None)]);
        let tree = TreeBuilder::new(&store, TreeMode::Full, 5)
            .unwrap()
            .build(PersonId(1))
            .unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.generation, 0);
        assert!(tree.children.is_empty());
        assert!(tree.parents.is_empty());
        assert!(tree.spouse.is_none());
    }

    #[test]
    fn test_descendants_within_bound() {
        let store = three_generations();

        let tree = TreeBuilder::new(&store, TreeMode::Descendants, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2, 4, 5, 3, 6, 7]);
        assert_eq!(tree.children[1].children[0].generation, 2);

        let tree = TreeBuilder::new(&store, TreeMode::Descendants, 2)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2, 3]);

        let tree = TreeBuilder::new(&store, TreeMode::Descendants, 1)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1]);
    }

    #[test]
    fn test_spouse_attached_and_children_of_either_partner() {
        // 1 married to 2; 3 is a child of 1 only, 4 of 2 only
        let store = store_of(vec![
            person(1, &[], Some(2)),
            person(2, &[], Some(1)),
            person(3, &[1], None),
            person(4, &[2], None),
        ]);
        let tree = TreeBuilder::new(&store, TreeMode::Descendants, 2)
            .unwrap()
            .build(PersonId(1))
            .unwrap();

        let spouse = tree.spouse.as_ref().unwrap();
        assert_eq!(spouse.id(), PersonId(2));
        assert_eq!(spouse.generation, 0);
        assert!(spouse.children.is_empty());
        assert_eq!(raw_ids(&tree), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_shared_child_placed_once() {
        let store = PersonStore::sample();
        let tree = TreeBuilder::new(&store, TreeMode::Descendants, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();

        // Pedro (3) brings his wife Carmen (5); their children appear once
        assert_eq!(raw_ids(&tree), vec![1, 2, 3, 5, 6, 7, 4]);
    }

    #[test]
    fn test_asymmetric_spouse_pointer() {
        // 1 points at 2, 2 points at 3
        let store = store_of(vec![
            person(1, &[], Some(2)),
            person(2, &[], Some(3)),
            person(3, &[], None),
        ]);
        let tree = TreeBuilder::new(&store, TreeMode::Full, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2]);
    }

    #[test]
    fn test_dangling_references_ignored() {
        let store = store_of(vec![person(1, &[77], Some(88)), person(2, &[1], None)]);
        let tree = TreeBuilder::new(&store, TreeMode::Full, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2]);
        assert!(tree.spouse.is_none());
    }

    #[test]
    fn test_parent_cycle_terminates() {
        // 1 is parent of 2 and 2 is parent of 1
        let store = store_of(vec![person(1, &[2], None), person(2, &[1], None)]);

        for mode in [TreeMode::Ancestors, TreeMode::Descendants, TreeMode::Full] {
            let tree = TreeBuilder::new(&store, mode, 50)
                .unwrap()
                .build(PersonId(1))
                .unwrap();
            assert!(tree.len() <= store.len(), "{mode:?} visited too many nodes");
        }
    }

    #[test]
    fn test_self_loops_terminate() {
        let store = store_of(vec![person(1, &[1], Some(1))]);
        let tree = TreeBuilder::new(&store, TreeMode::Full, 10)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_ancestors_bounded_like_descendants() {
        // 4 -> 3 -> 2 -> 1 (each the parent of the next)
        let store = store_of(vec![
            person(1, &[2], None),
            person(2, &[3], None),
            person(3, &[4], None),
            person(4, &[], None),
        ]);

        let tree = TreeBuilder::new(&store, TreeMode::Ancestors, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2, 3]);
        assert_eq!(tree.parents[0].parents[0].generation, -2);

        let tree = TreeBuilder::new(&store, TreeMode::Ancestors, 10)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(raw_ids(&tree), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ancestors_mode_skips_children() {
        let store = PersonStore::sample();
        let tree = TreeBuilder::new(&store, TreeMode::Ancestors, 3)
            .unwrap()
            .build(PersonId(3))
            .unwrap();

        // Pedro, his wife, then his parents; no children
        assert_eq!(raw_ids(&tree), vec![3, 5, 1, 2]);
        assert!(tree.children.is_empty());
        assert_eq!(tree.parents[0].generation, -1);
        assert_eq!(tree.parents[0].spouse.as_ref().map(|s| s.id()), Some(PersonId(2)));
    }

    #[test]
    fn test_long_chain_stops_at_bound() {
        let people = (1..=10_000u64)
            .map(|id| {
                let parents: Vec<u64> = if id == 1 { vec![] } else { vec![id - 1] };
                person(id, &parents, None)
            })
            .collect();
        let store = store_of(people);

        let down = TreeBuilder::new(&store, TreeMode::Descendants, 3)
            .unwrap()
            .build(PersonId(1))
            .unwrap();
        assert_eq!(down.person_ids(), vec![PersonId(1), PersonId(2), PersonId(3)]);

        let up = TreeBuilder::new(&store, TreeMode::Ancestors, 3)
            .unwrap()
            .build(PersonId(10_000))
            .unwrap();
        assert_eq!(up.len(), 3);
    }

    #[test]
    fn test_full_mode_reaches_siblings_through_parents() {
        let store = PersonStore::sample();
        let tree = TreeBuilder::new(&store, TreeMode::Full, 3)
            .unwrap()
            .build(PersonId(6))
            .unwrap();

        // Luis -> sister Sofía is reached via parent Pedro's children;
        // grandparents and aunt Ana via Pedro's parents
        let mut ids = raw_ids(&tree);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_no_duplicate_ids_across_modes_and_bounds() {
        let store = PersonStore::sample();
        for root in store.iter().map(|p| p.id) {
            for mode in [TreeMode::Ancestors, TreeMode::Descendants, TreeMode::Full] {
                for bound in 1..=5 {
                    let tree = TreeBuilder::new(&store, mode, bound)
                        .unwrap()
                        .build(root)
                        .unwrap();
                    let ids = tree.person_ids();
                    let unique: HashSet<_> = ids.iter().collect();
                    assert_eq!(unique.len(), ids.len(), "{root} {mode:?} bound {bound}");
                    assert!(ids.len() <= store.len());
                }
            }
        }
    }
}
