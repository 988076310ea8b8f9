//! Person record and related types.
//!
//! A person is a vertex in the family graph. Each person has:
//! - A stable unique identifier (never reused after deletion)
//! - Display fields (name, gender, lifespan, photo, notes)
//! - Up to two parent ids and an optional spouse id

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable person identifier.
///
/// Serialized as a plain JSON number so archives stay readable by the
/// browser front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl PersonId {
    /// Largest id handed out: ids cross to JavaScript as numbers, which are
    /// exact only up to `Number.MAX_SAFE_INTEGER`.
    pub const MAX: PersonId = PersonId((1 << 53) - 1);

    /// Create a new PersonId from a raw u64.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person({})", self.0)
    }
}

impl From<u64> for PersonId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<PersonId> for u64 {
    #[inline]
    fn from(id: PersonId) -> Self {
        id.0
    }
}

/// Gender of a person. Only drives color-coding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl Gender {
    /// Fill color of this person's box in the rendered tree.
    pub fn color(self) -> &'static str {
        match self {
            Gender::Male => "#6BA3D8",
            Gender::Female => "#E991C5",
            Gender::Unspecified => "#A0D995",
        }
    }
}

/// Editable fields of a person, without the id.
///
/// This is what the form collaborator submits for `add` and `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonDraft {
    pub name: String,
    pub gender: Gender,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub photo: String,
    pub notes: String,
    pub parent_ids: Vec<PersonId>,
    pub spouse_id: Option<PersonId>,
}

impl PersonDraft {
    /// Start a draft with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_years(mut self, birth: Option<i32>, death: Option<i32>) -> Self {
        self.birth_year = birth;
        self.death_year = death;
        self
    }

    pub fn with_parents(mut self, parents: impl IntoIterator<Item = PersonId>) -> Self {
        self.parent_ids = parents.into_iter().collect();
        self
    }

    pub fn with_spouse(mut self, spouse: PersonId) -> Self {
        self.spouse_id = Some(spouse);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// A person record as stored and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub parent_ids: Vec<PersonId>,
    #[serde(default)]
    pub spouse_id: Option<PersonId>,
}

impl Person {
    /// Build a person from a draft under the given id.
    pub fn from_draft(id: PersonId, draft: PersonDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            gender: draft.gender,
            birth_year: draft.birth_year,
            death_year: draft.death_year,
            photo: draft.photo.trim().to_string(),
            notes: draft.notes.trim().to_string(),
            parent_ids: draft.parent_ids,
            spouse_id: draft.spouse_id,
        }
    }

    /// Whether `id` is listed among this person's parents.
    #[inline]
    pub fn has_parent(&self, id: PersonId) -> bool {
        self.parent_ids.contains(&id)
    }

    /// Whether this person has no recorded parents.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Human-readable lifespan, e.g. `1920 - 1995` or `1950 - present`.
    pub fn lifespan_label(&self) -> String {
        match (self.birth_year, self.death_year) {
            (Some(birth), Some(death)) => format!("{birth} - {death}"),
            (Some(birth), None) => format!("{birth} - present"),
            (None, Some(death)) => format!("died {death}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_person_id() {
        let id = PersonId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Person(42)");
    }

    #[test]
    fn test_person_id_conversion() {
        let id: PersonId = 123.into();
        let raw: u64 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_gender_colors() {
        assert_eq!(Gender::Male.color(), "#6BA3D8");
        assert_eq!(Gender::Female.color(), "#E991C5");
        assert_eq!(Gender::default().color(), "#A0D995");
    }

    #[test]
    fn test_lifespan_label() {
        let mut person = Person::from_draft(PersonId(1), PersonDraft::named("Ana"));
        assert_eq!(person.lifespan_label(), "");

        person.birth_year = Some(1950);
        assert_eq!(person.lifespan_label(), "1950 - present");

        person.death_year = Some(2001);
        assert_eq!(person.lifespan_label(), "1950 - 2001");

        person.birth_year = None;
        assert_eq!(person.lifespan_label(), "died 2001");
    }

    #[test]
    fn test_from_draft_trims_text() {
        let draft = PersonDraft::named("  Luis  ").with_notes(" grandson ");
        let person = Person::from_draft(PersonId(3), draft);
        assert_eq!(person.name, "Luis");
        assert_eq!(person.notes, "grandson");
        assert!(person.is_root());
    }

    #[test]
    fn test_person_json_shape() {
        let person = Person::from_draft(
            PersonId(6),
            PersonDraft::named("Luis")
                .with_gender(Gender::Male)
                .with_years(Some(1980), None)
                .with_parents([PersonId(3), PersonId(5)]),
        );
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 6,
                "name": "Luis",
                "gender": "male",
                "birthYear": 1980,
                "deathYear": null,
                "photo": "",
                "notes": "",
                "parentIds": [3, 5],
                "spouseId": null
            })
        );
    }

    #[test]
    fn test_person_lenient_deserialize() {
        let person: Person = serde_json::from_str(r#"{"id": 9, "name": "Eva"}"#).unwrap();
        assert_eq!(person.gender, Gender::Unspecified);
        assert!(person.parent_ids.is_empty());
        assert_eq!(person.spouse_id, None);
    }
}
