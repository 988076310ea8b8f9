//! PersonStore - the in-memory family collection.
//!
//! The store owns every person record in insertion order, maps stable
//! PersonIds to their slot, and hands out fresh ids from a counter that never
//! moves backwards. Relationship queries are pure reads over the records;
//! mutations validate the record invariants before touching anything.

use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::person::{Gender, Person, PersonDraft, PersonId};
use crate::error::{Error, Result};

/// Plausibility limits applied when a person is added or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Earliest accepted birth or death year.
    pub min_year: i32,
    /// Latest accepted birth or death year.
    pub max_year: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_year: 1800,
            max_year: 2025,
        }
    }
}

/// The family collection.
///
/// This struct manages:
/// - Person records in insertion order
/// - ID mapping between stable PersonIds and record slots
/// - Id assignment (monotonic, never reused)
/// - Mutation-time validation of names, years and relationships
#[derive(Debug, Clone)]
pub struct PersonStore {
    /// Records in insertion order.
    people: Vec<Person>,

    /// Map from stable PersonId to its slot in `people`
    id_to_slot: HashMap<PersonId, usize>,

    /// Next person ID to assign
    next_id: u64,

    /// Limits checked by `add` and `update`
    validation: ValidationConfig,
}

impl PersonStore {
    /// Create a new empty store with default validation limits.
    pub fn new() -> Self {
        Self::with_validation(ValidationConfig::default())
    }

    /// Create an empty store with custom validation limits.
    pub fn with_validation(validation: ValidationConfig) -> Self {
        Self {
            people: Vec::new(),
            id_to_slot: HashMap::new(),
            next_id: 1,
            validation,
        }
    }

    /// The demonstration family: two founders, their two children, one
    /// in-law and two grandchildren.
    pub fn sample() -> Self {
        let mut store = Self::new();
        let people = sample_people();
        // Fixed ids, no duplicates.
        if let Err(err) = store.replace_all(people) {
            tracing::warn!(%err, "sample data rejected");
        }
        store
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of people in the store.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// All records in insertion order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.id_to_slot.contains_key(&id)
    }

    /// Look up a person by id.
    pub fn find_by_id(&self, id: PersonId) -> Option<&Person> {
        self.id_to_slot.get(&id).map(|&slot| &self.people[slot])
    }

    /// Every person listing `id` among their parents, in insertion order.
    pub fn children_of(&self, id: PersonId) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(move |p| p.has_parent(id))
    }

    /// Every person listing either member of a couple among their parents.
    ///
    /// A child of both partners is yielded once.
    pub fn children_of_couple(
        &self,
        id: PersonId,
        spouse: Option<PersonId>,
    ) -> impl Iterator<Item = &Person> {
        self.people
            .iter()
            .filter(move |p| p.has_parent(id) || spouse.is_some_and(|s| p.has_parent(s)))
    }

    /// Resolved parents of `id`. Dangling parent ids are skipped.
    pub fn parents_of(&self, id: PersonId) -> Vec<&Person> {
        self.find_by_id(id)
            .map(|person| {
                person
                    .parent_ids
                    .iter()
                    .filter_map(|&pid| self.find_by_id(pid))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The person `id` points at as spouse, if it resolves.
    pub fn spouse_of(&self, id: PersonId) -> Option<&Person> {
        self.find_by_id(id)
            .and_then(|person| person.spouse_id)
            .and_then(|sid| self.find_by_id(sid))
    }

    /// Case-insensitive name search. An empty term matches everyone.
    pub fn search(&self, term: &str) -> Vec<&Person> {
        let needle = term.trim().to_lowercase();
        self.people
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Root used when the caller does not pick one: the first person without
    /// parents, else the first person.
    pub fn default_root(&self) -> Option<&Person> {
        self.people
            .iter()
            .find(|p| p.is_root())
            .or_else(|| self.people.first())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Validate and insert a new person. Returns the assigned id.
    ///
    /// Fails with [`Error::IdSpaceExhausted`] once the counter passes
    /// [`PersonId::MAX`], e.g. after importing an archive with huge ids.
    pub fn add(&mut self, draft: PersonDraft) -> Result<PersonId> {
        if self.next_id > PersonId::MAX.raw() {
            return Err(Error::IdSpaceExhausted);
        }
        let id = PersonId(self.next_id);
        let draft = self.validate(id, draft)?;

        self.next_id += 1;
        self.id_to_slot.insert(id, self.people.len());
        self.people.push(Person::from_draft(id, draft));

        tracing::debug!(%id, "person added");
        Ok(id)
    }

    /// Validate and replace every field of an existing person.
    pub fn update(&mut self, id: PersonId, draft: PersonDraft) -> Result<()> {
        let slot = *self.id_to_slot.get(&id).ok_or(Error::PersonNotFound(id))?;
        let draft = self.validate(id, draft)?;

        self.people[slot] = Person::from_draft(id, draft);

        tracing::debug!(%id, "person updated");
        Ok(())
    }

    /// Remove a person and every reference to them.
    ///
    /// The id is dropped from all `parentIds` lists and any `spouseId`
    /// pointing at it is cleared.
    pub fn delete(&mut self, id: PersonId) -> Result<Person> {
        let slot = self.id_to_slot.remove(&id).ok_or(Error::PersonNotFound(id))?;
        let removed = self.people.remove(slot);

        // Slots after the removed one shift down by one
        for later in &self.people[slot..] {
            if let Some(s) = self.id_to_slot.get_mut(&later.id) {
                *s -= 1;
            }
        }

        for person in &mut self.people {
            person.parent_ids.retain(|&pid| pid != id);
            if person.spouse_id == Some(id) {
                person.spouse_id = None;
            }
        }

        tracing::debug!(%id, remaining = self.people.len(), "person deleted");
        Ok(removed)
    }

    /// Replace the whole collection, e.g. from an import or the sample data.
    ///
    /// Records are trusted as-is apart from id uniqueness; malformed
    /// relationships are left for the tree builder to prune. On error the
    /// store is left untouched.
    pub fn replace_all(&mut self, people: Vec<Person>) -> Result<()> {
        let mut id_to_slot = HashMap::with_capacity(people.len());
        for (slot, person) in people.iter().enumerate() {
            if id_to_slot.insert(person.id, slot).is_some() {
                return Err(Error::DuplicateId(person.id));
            }
        }

        // Skip past every id in use or referenced, so a dangling reference
        // never adopts a newly added person.
        let highest = people
            .iter()
            .flat_map(|p| {
                std::iter::once(p.id)
                    .chain(p.parent_ids.iter().copied())
                    .chain(p.spouse_id)
            })
            .map(PersonId::raw)
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest.saturating_add(1));

        self.people = people;
        self.id_to_slot = id_to_slot;

        tracing::debug!(count = self.people.len(), "people replaced");
        Ok(())
    }

    /// Remove every person. Ids handed out so far stay retired.
    pub fn clear(&mut self) {
        self.people.clear();
        self.id_to_slot.clear();
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check a draft destined for `id` and return it with duplicate parent
    /// ids collapsed.
    fn validate(&self, id: PersonId, mut draft: PersonDraft) -> Result<PersonDraft> {
        if draft.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        if let (Some(birth), Some(death)) = (draft.birth_year, draft.death_year) {
            if birth > death {
                return Err(Error::DeathBeforeBirth { birth, death });
            }
        }
        self.check_year("birth", draft.birth_year)?;
        self.check_year("death", draft.death_year)?;

        let mut seen = HashSet::new();
        draft.parent_ids.retain(|pid| seen.insert(*pid));
        if draft.parent_ids.len() > 2 {
            return Err(Error::TooManyParents(draft.parent_ids.len()));
        }
        if draft.parent_ids.contains(&id) {
            return Err(Error::SelfParent);
        }
        if draft.spouse_id == Some(id) {
            return Err(Error::SelfSpouse);
        }
        for &pid in draft.parent_ids.iter().chain(draft.spouse_id.iter()) {
            if !self.contains(pid) {
                return Err(Error::PersonNotFound(pid));
            }
        }

        self.check_ancestry(id, &draft.parent_ids)?;
        Ok(draft)
    }

    fn check_year(&self, field: &'static str, year: Option<i32>) -> Result<()> {
        let ValidationConfig { min_year, max_year } = self.validation;
        match year {
            Some(year) if year < min_year || year > max_year => Err(Error::YearOutOfRange {
                field,
                year,
                min: min_year,
                max: max_year,
            }),
            _ => Ok(()),
        }
    }

    /// Reject parents that are already descendants of `child`.
    ///
    /// Builds the parent→child kinship graph without `child`'s current parent
    /// edges; a proposed parent reachable from `child` would close a loop.
    fn check_ancestry(&self, child: PersonId, parents: &[PersonId]) -> Result<()> {
        if parents.is_empty() {
            return Ok(());
        }

        let (graph, index_of) = self.kinship_graph(child);
        let Some(&child_index) = index_of.get(&child) else {
            // A brand-new person has no descendants yet
            return Ok(());
        };

        for &parent in parents {
            if let Some(&parent_index) = index_of.get(&parent) {
                if has_path_connecting(&graph, child_index, parent_index, None) {
                    return Err(Error::AncestorCycle { child, parent });
                }
            }
        }
        Ok(())
    }

    /// Parent→child graph over the store, leaving out `skip_parents_of`'s own
    /// parent edges.
    fn kinship_graph(
        &self,
        skip_parents_of: PersonId,
    ) -> (StableGraph<PersonId, (), Directed>, HashMap<PersonId, NodeIndex>) {
        let mut graph = StableGraph::with_capacity(self.people.len(), self.people.len() * 2);
        let mut index_of = HashMap::with_capacity(self.people.len());

        for person in &self.people {
            index_of.insert(person.id, graph.add_node(person.id));
        }
        for person in &self.people {
            if person.id == skip_parents_of {
                continue;
            }
            let child_index = index_of[&person.id];
            for pid in &person.parent_ids {
                if let Some(&parent_index) = index_of.get(pid) {
                    graph.add_edge(parent_index, child_index, ());
                }
            }
        }

        (graph, index_of)
    }
}

impl Default for PersonStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_people() -> Vec<Person> {
    let person = |id: u64, name: &str, gender: Gender, birth: i32, death: Option<i32>| Person {
        id: PersonId(id),
        name: name.to_string(),
        gender,
        birth_year: Some(birth),
        death_year: death,
        photo: String::new(),
        notes: String::new(),
        parent_ids: Vec::new(),
        spouse_id: None,
    };
    let founders = vec![PersonId(1), PersonId(2)];
    let parents = vec![PersonId(3), PersonId(5)];

    vec![
        Person {
            notes: "Founder of the family".into(),
            spouse_id: Some(PersonId(2)),
            ..person(1, "Juan García", Gender::Male, 1920, Some(1995))
        },
        Person {
            spouse_id: Some(PersonId(1)),
            ..person(2, "María López", Gender::Female, 1925, Some(2000))
        },
        Person {
            notes: "Eldest son".into(),
            parent_ids: founders.clone(),
            spouse_id: Some(PersonId(5)),
            ..person(3, "Pedro García López", Gender::Male, 1950, None)
        },
        Person {
            parent_ids: founders,
            ..person(4, "Ana García López", Gender::Female, 1955, None)
        },
        Person {
            spouse_id: Some(PersonId(3)),
            ..person(5, "Carmen Rodríguez", Gender::Female, 1952, None)
        },
        Person {
            notes: "Grandson".into(),
            parent_ids: parents.clone(),
            ..person(6, "Luis García Rodríguez", Gender::Male, 1980, None)
        },
        Person {
            notes: "Granddaughter".into(),
            parent_ids: parents,
            ..person(7, "Sofía García Rodríguez", Gender::Female, 1985, None)
        },
    ]
}
